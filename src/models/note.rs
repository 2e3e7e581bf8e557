use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{NoteId, UserId};

/// Category assigned when a note is created without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A stored note.
///
/// Notes are read-only snapshots as far as search is concerned. Scores and
/// highlighted markup are computed per request and carried alongside the note
/// (see `SearchHit`), never written back onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    title: String,
    content: String,
    category: String,
    owner_id: UserId,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Note {
    /// Returns the note ID.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the note title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the note category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the owning user.
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns the last update timestamp.
    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Title and content joined by a single space, the text that search indexes.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use notesearch::{NoteBuilder, NoteId};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new(1))
///     .title("Groceries")
///     .content("Eggs, milk")
///     .build();
///
/// assert_eq!(note.id().get(), 1);
/// assert_eq!(note.category(), "general");
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    owner_id: Option<UserId>,
    created_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the note title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the note content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the owning user.
    pub fn owner_id(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the updated timestamp.
    pub fn updated_at(mut self, updated_at: OffsetDateTime) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the `Note`, using defaults for optional fields.
    ///
    /// # Panics
    ///
    /// Panics if `id`, `title` or `content` have not been set.
    pub fn build(self) -> Note {
        let now = OffsetDateTime::now_utc();
        Note {
            id: self.id.expect("id is required"),
            title: self.title.expect("title is required"),
            content: self.content.expect("content is required"),
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            owner_id: self.owner_id.unwrap_or(UserId::new(1)),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

/// Input for creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub category: String,
    pub owner_id: UserId,
}

impl NewNote {
    /// Creates a note draft in the default category.
    pub fn new(title: impl Into<String>, content: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: DEFAULT_CATEGORY.to_string(),
            owner_id,
        }
    }

    /// Sets the category, falling back to the default for blank input.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.trim().to_string()
        };
        self
    }

    /// Checks that title and content carry text.
    ///
    /// # Errors
    ///
    /// Returns an error naming the empty field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title.trim().is_empty() {
            anyhow::bail!("Note title cannot be empty");
        }
        if self.content.trim().is_empty() {
            anyhow::bail!("Note content cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_defaults() {
        let note = NoteBuilder::new()
            .id(NoteId::new(1))
            .title("Title")
            .content("Body")
            .build();

        assert_eq!(note.category(), DEFAULT_CATEGORY);
        assert_eq!(note.owner_id(), UserId::new(1));
        assert_eq!(note.searchable_text(), "Title Body");
    }

    #[test]
    fn builder_allows_setting_all_fields() {
        let now = OffsetDateTime::now_utc();
        let note = NoteBuilder::new()
            .id(NoteId::new(42))
            .title("Dog Training")
            .content("Basic obedience tips")
            .category("pets")
            .owner_id(UserId::new(9))
            .created_at(now)
            .updated_at(now)
            .build();

        assert_eq!(note.id(), NoteId::new(42));
        assert_eq!(note.title(), "Dog Training");
        assert_eq!(note.category(), "pets");
        assert_eq!(note.owner_id(), UserId::new(9));
        assert_eq!(note.created_at(), now);
        assert_eq!(note.updated_at(), now);
    }

    #[test]
    fn note_serialization_roundtrip() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let note = NoteBuilder::new()
            .id(NoteId::new(1))
            .title("t")
            .content("c")
            .created_at(now)
            .updated_at(now)
            .build();

        let json = serde_json::to_string(&note).unwrap();
        let deserialized: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(note, deserialized);
    }

    #[test]
    fn new_note_validation_rejects_blank_fields() {
        let blank_title = NewNote::new("  ", "body", UserId::new(1));
        let err = blank_title.validate().unwrap_err();
        assert!(err.to_string().contains("title cannot be empty"));

        let blank_content = NewNote::new("title", "\n\t", UserId::new(1));
        let err = blank_content.validate().unwrap_err();
        assert!(err.to_string().contains("content cannot be empty"));

        assert!(NewNote::new("a", "b", UserId::new(1)).validate().is_ok());
    }

    #[test]
    fn blank_category_falls_back_to_default() {
        let draft = NewNote::new("a", "b", UserId::new(1)).with_category("   ");
        assert_eq!(draft.category, DEFAULT_CATEGORY);

        let draft = NewNote::new("a", "b", UserId::new(1)).with_category(" work ");
        assert_eq!(draft.category, "work");
    }
}
