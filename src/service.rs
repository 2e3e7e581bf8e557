use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row};
use thiserror::Error;
use time::OffsetDateTime;

use crate::search::{NoteStore, SearchEngine, SearchHit};
use crate::{Database, NewNote, Note, NoteBuilder, NoteId, SearchFeedback, UserId};

const NOTE_COLUMNS: &str = "id, title, content, category, owner_id, created_at, updated_at";

/// Feedback submissions the service refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    /// The query or the feedback text was blank.
    #[error("Feedback query and text cannot be empty")]
    InvalidInput,

    /// The user already left feedback for this query.
    #[error("Feedback already submitted for query '{query}'")]
    AlreadySubmitted { query: String },
}

/// Service layer providing note and feedback operations.
///
/// NoteService owns a Database instance and is UI-independent; the CLI is one
/// front end over it.
///
/// # Examples
///
/// ```
/// use notesearch::{Database, NewNote, NoteService, UserId};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let service = NoteService::new(db);
///
/// let note = service.create_note(&NewNote::new("Groceries", "Eggs and milk", UserId::new(1)))?;
/// assert!(note.id().get() > 0);
/// # Ok(())
/// # }
/// ```
pub struct NoteService {
    db: Database,
}

impl NoteService {
    /// Creates a new NoteService with the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or advanced operations that need direct database access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates a new note.
    ///
    /// Stores the note with the current Unix timestamp for both `created_at`
    /// and `updated_at` and returns it with its assigned `NoteId`.
    ///
    /// # Errors
    ///
    /// Returns an error if the title or content is blank, or the insert fails.
    pub fn create_note(&self, new_note: &NewNote) -> Result<Note> {
        new_note.validate()?;

        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        conn.execute(
            "INSERT INTO notes (title, content, category, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            (
                &new_note.title,
                &new_note.content,
                &new_note.category,
                new_note.owner_id.get(),
                now,
            ),
        )?;

        let id = NoteId::new(conn.last_insert_rowid());
        tracing::debug!(%id, "created note");

        let created = OffsetDateTime::from_unix_timestamp(now)?;
        Ok(NoteBuilder::new()
            .id(id)
            .title(&new_note.title)
            .content(&new_note.content)
            .category(&new_note.category)
            .owner_id(new_note.owner_id)
            .created_at(created)
            .updated_at(created)
            .build())
    }

    /// Retrieves a note by its ID.
    ///
    /// Returns `None` if no note exists with the given ID. This is not
    /// considered an error condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesearch::{Database, NewNote, NoteId, NoteService, UserId};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    /// assert_eq!(service.get_note(NoteId::new(999))?, None);
    ///
    /// let created = service.create_note(&NewNote::new("Title", "Body", UserId::new(1)))?;
    /// let fetched = service.get_note(created.id())?.expect("note should exist");
    /// assert_eq!(fetched.content(), "Body");
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let conn = self.db.connection();
        let raw = conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                [id.get()],
                RawNote::from_row,
            )
            .optional()?;

        raw.map(RawNote::into_note).transpose()
    }

    /// Returns the content of a note for preview, or `None` if it does not exist.
    pub fn note_preview(&self, id: NoteId) -> Result<Option<String>> {
        Ok(self.get_note(id)?.map(|note| note.content().to_string()))
    }

    /// Deletes a note by its ID.
    ///
    /// Deleting a note that does not exist succeeds.
    pub fn delete_note(&self, id: NoteId) -> Result<()> {
        let conn = self.db.connection();
        conn.execute("DELETE FROM notes WHERE id = ?1", [id.get()])?;
        Ok(())
    }

    /// Lists notes with optional filtering, ordering and limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesearch::{Database, ListNotesOptions, NewNote, NoteService, UserId};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    /// service.create_note(&NewNote::new("A", "first", UserId::new(1)).with_category("work"))?;
    /// service.create_note(&NewNote::new("B", "second", UserId::new(1)))?;
    ///
    /// let work = service.list_notes(ListNotesOptions {
    ///     category: Some("work".to_string()),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(work.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn list_notes(&self, options: ListNotesOptions) -> Result<Vec<Note>> {
        let conn = self.db.connection();

        let mut clauses = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(category) = options.category {
            clauses.push("category = ? COLLATE NOCASE");
            params.push(Box::new(category));
        }
        if let Some(owner) = options.owner {
            clauses.push("owner_id = ?");
            params.push(Box::new(owner.get()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let order_clause = match options.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let limit_clause = options
            .limit
            .map(|limit| format!(" LIMIT {limit}"))
            .unwrap_or_default();

        let query = format!(
            "SELECT {NOTE_COLUMNS} FROM notes{where_clause} ORDER BY created_at {order_clause}, id {order_clause}{limit_clause}"
        );

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            RawNote::from_row,
        )?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?.into_note()?);
        }
        Ok(notes)
    }

    /// Runs `query` against every stored note.
    ///
    /// A blank query returns no results without touching the database.
    pub fn search_notes(&self, engine: &SearchEngine, query: &str) -> Result<Vec<SearchHit>> {
        engine.search_store(self, query)
    }

    /// Records feedback for a query, replacing any earlier feedback by the same user.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` for a blank query or text, or an
    /// error if the write fails.
    pub fn upsert_feedback(
        &self,
        user: UserId,
        query: &str,
        feedback: &str,
    ) -> Result<SearchFeedback> {
        validate_feedback(query, feedback)?;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.db.connection().execute(
            "INSERT INTO search_feedback (user_id, query, feedback, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT (user_id, query)
             DO UPDATE SET feedback = excluded.feedback, updated_at = excluded.updated_at",
            (user.get(), query, feedback, now),
        )?;

        self.get_feedback(user, query)?
            .context("Feedback missing after upsert")
    }

    /// Records feedback for a query exactly once per user.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` for a blank query or text and
    /// `FeedbackError::AlreadySubmitted` if the user already left feedback for
    /// this query.
    pub fn submit_feedback(
        &self,
        user: UserId,
        query: &str,
        feedback: &str,
    ) -> Result<SearchFeedback> {
        validate_feedback(query, feedback)?;

        if self.get_feedback(user, query)?.is_some() {
            return Err(FeedbackError::AlreadySubmitted {
                query: query.to_string(),
            }
            .into());
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.db.connection().execute(
            "INSERT INTO search_feedback (user_id, query, feedback, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            (user.get(), query, feedback, now),
        )?;

        self.get_feedback(user, query)?
            .context("Feedback missing after insert")
    }

    /// Returns the feedback `user` left for `query`, if any.
    pub fn get_feedback(&self, user: UserId, query: &str) -> Result<Option<SearchFeedback>> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT feedback, created_at, updated_at FROM search_feedback
                 WHERE user_id = ?1 AND query = ?2",
                (user.get(), query),
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(feedback, created_at, updated_at)| {
            Ok(SearchFeedback::new(
                user,
                query,
                feedback,
                OffsetDateTime::from_unix_timestamp(created_at)?,
                OffsetDateTime::from_unix_timestamp(updated_at)?,
            ))
        })
        .transpose()
    }
}

impl NoteStore for NoteService {
    fn list_all_notes(&self) -> Result<Vec<Note>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id"))?;
        let rows = stmt.query_map([], RawNote::from_row)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?.into_note()?);
        }
        Ok(notes)
    }

    fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        NoteService::get_note(self, id)
    }
}

fn validate_feedback(query: &str, feedback: &str) -> Result<(), FeedbackError> {
    if query.trim().is_empty() || feedback.trim().is_empty() {
        return Err(FeedbackError::InvalidInput);
    }
    Ok(())
}

/// Column values of one `notes` row before timestamp conversion.
struct RawNote {
    id: i64,
    title: String,
    content: String,
    category: String,
    owner_id: i64,
    created_at: i64,
    updated_at: i64,
}

impl RawNote {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            category: row.get(3)?,
            owner_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_note(self) -> Result<Note> {
        Ok(NoteBuilder::new()
            .id(NoteId::new(self.id))
            .title(self.title)
            .content(self.content)
            .category(self.category)
            .owner_id(UserId::new(self.owner_id))
            .created_at(OffsetDateTime::from_unix_timestamp(self.created_at)?)
            .updated_at(OffsetDateTime::from_unix_timestamp(self.updated_at)?)
            .build())
    }
}

/// Sort order for listing notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest notes first (ascending by creation time)
    Ascending,
    /// Newest notes first (descending by creation time)
    #[default]
    Descending,
}

/// Options for listing notes.
///
/// All fields are optional with sensible defaults.
///
/// # Examples
///
/// ```
/// use notesearch::ListNotesOptions;
///
/// // Use defaults (no limit, no filtering, newest first)
/// let options = ListNotesOptions::default();
///
/// // Limit to 10 most recent notes
/// let options = ListNotesOptions {
///     limit: Some(10),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListNotesOptions {
    /// Maximum number of notes to return. None means no limit.
    pub limit: Option<usize>,

    /// Only notes in this category (case-insensitive).
    pub category: Option<String>,

    /// Only notes owned by this user.
    pub owner: Option<UserId>,

    /// Sort order for notes. Defaults to Descending (newest first).
    pub order: SortOrder,
}

#[cfg(test)]
#[path = "service/tests.rs"]
mod tests;
