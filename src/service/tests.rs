use std::sync::Arc;

use super::*;
use crate::search::Thesaurus;

fn service() -> NoteService {
    let db = Database::in_memory().expect("failed to create in-memory database");
    NoteService::new(db)
}

fn add(service: &NoteService, title: &str, content: &str) -> Note {
    service
        .create_note(&NewNote::new(title, content, UserId::new(1)))
        .expect("failed to create note")
}

#[test]
fn note_service_construction_with_in_memory_database() {
    let service = service();
    let conn = service.database().connection();

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('notes', 'search_feedback')",
            [],
            |row| row.get(0),
        )
        .expect("failed to query schema");

    assert_eq!(count, 2, "expected notes and search_feedback tables");
}

#[test]
fn list_notes_options_default_implementation() {
    let options = ListNotesOptions::default();

    assert_eq!(options.limit, None);
    assert_eq!(options.category, None);
    assert_eq!(options.owner, None);
    assert_eq!(options.order, SortOrder::Descending);

    let with_limit = ListNotesOptions {
        limit: Some(10),
        ..Default::default()
    };
    assert_eq!(with_limit.limit, Some(10));
    assert_eq!(with_limit.category, None);
}

// --- Notes ---

#[test]
fn create_note_returns_note_with_valid_id_and_timestamps() {
    let service = service();
    let note = service
        .create_note(&NewNote::new("Groceries", "Eggs", UserId::new(7)).with_category("home"))
        .expect("failed to create note");

    assert!(note.id().get() > 0, "note ID should be positive");
    assert_eq!(note.title(), "Groceries");
    assert_eq!(note.content(), "Eggs");
    assert_eq!(note.category(), "home");
    assert_eq!(note.owner_id(), UserId::new(7));
    assert_eq!(note.created_at(), note.updated_at());
}

#[test]
fn create_note_rejects_blank_fields() {
    let service = service();

    let err = service
        .create_note(&NewNote::new("  ", "body", UserId::new(1)))
        .unwrap_err();
    assert!(err.to_string().contains("cannot be empty"));

    let err = service
        .create_note(&NewNote::new("title", "\n\t", UserId::new(1)))
        .unwrap_err();
    assert!(err.to_string().contains("cannot be empty"));

    assert!(service.list_all_notes().unwrap().is_empty());
}

#[test]
fn get_note_round_trips_stored_fields() {
    let service = service();
    let created = add(&service, "Title", "Body text");

    let fetched = service
        .get_note(created.id())
        .expect("failed to get note")
        .expect("note should exist");

    assert_eq!(fetched, created);
}

#[test]
fn get_note_returns_none_for_missing_id() {
    let service = service();
    assert_eq!(service.get_note(NoteId::new(42)).unwrap(), None);
}

#[test]
fn delete_note_removes_note_and_is_idempotent() {
    let service = service();
    let note = add(&service, "Temp", "Remove me");

    service.delete_note(note.id()).expect("first delete");
    assert_eq!(service.get_note(note.id()).unwrap(), None);

    service.delete_note(note.id()).expect("second delete");
    service.delete_note(NoteId::new(999)).expect("missing delete");
}

#[test]
fn note_preview_returns_content() {
    let service = service();
    let note = add(&service, "Recipe", "Mix flour and water");

    assert_eq!(
        service.note_preview(note.id()).unwrap().as_deref(),
        Some("Mix flour and water")
    );
    assert_eq!(service.note_preview(NoteId::new(999)).unwrap(), None);
}

#[test]
fn list_notes_orders_newest_first_by_default() {
    let service = service();
    let first = add(&service, "One", "first");
    let second = add(&service, "Two", "second");

    let notes = service.list_notes(ListNotesOptions::default()).unwrap();
    let ids: Vec<NoteId> = notes.iter().map(Note::id).collect();
    assert_eq!(ids, vec![second.id(), first.id()]);

    let notes = service
        .list_notes(ListNotesOptions {
            order: SortOrder::Ascending,
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<NoteId> = notes.iter().map(Note::id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);
}

#[test]
fn list_notes_applies_limit_category_and_owner() {
    let service = service();
    service
        .create_note(&NewNote::new("A", "a", UserId::new(1)).with_category("Work"))
        .unwrap();
    service
        .create_note(&NewNote::new("B", "b", UserId::new(2)).with_category("work"))
        .unwrap();
    service
        .create_note(&NewNote::new("C", "c", UserId::new(1)))
        .unwrap();

    let limited = service
        .list_notes(ListNotesOptions {
            limit: Some(2),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 2);

    let work = service
        .list_notes(ListNotesOptions {
            category: Some("WORK".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(work.len(), 2);

    let mine = service
        .list_notes(ListNotesOptions {
            category: Some("work".to_string()),
            owner: Some(UserId::new(1)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title(), "A");
}

#[test]
fn note_store_lists_in_insertion_order() {
    let service = service();
    let a = add(&service, "A", "first");
    let b = add(&service, "B", "second");

    let ids: Vec<NoteId> = service
        .list_all_notes()
        .unwrap()
        .iter()
        .map(Note::id)
        .collect();
    assert_eq!(ids, vec![a.id(), b.id()]);

    let via_trait = NoteStore::get_note(&service, a.id()).unwrap();
    assert_eq!(via_trait.map(|n| n.id()), Some(a.id()));
}

// --- Search ---

#[test]
fn search_notes_ranks_stored_notes() {
    let service = service();
    let engine = SearchEngine::new(Arc::new(Thesaurus::bundled()));
    add(&service, "Shopping", "Buy bread and milk");
    let dog = add(&service, "Dog Training", "Basic obedience tips for dogs");

    let hits = service.search_notes(&engine, "dog").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].note.id(), dog.id());
    assert!(hits[0].similarity_score > 0.0);
}

#[test]
fn search_notes_with_blank_query_returns_nothing() {
    let service = service();
    let engine = SearchEngine::new(Arc::new(Thesaurus::bundled()));
    add(&service, "Dog", "walk");

    assert!(service.search_notes(&engine, "  ").unwrap().is_empty());
}

// --- Feedback ---

#[test]
fn upsert_feedback_replaces_earlier_text() {
    let service = service();
    let user = UserId::new(3);

    let first = service.upsert_feedback(user, "dog", "not helpful").unwrap();
    assert_eq!(first.feedback(), "not helpful");

    let second = service.upsert_feedback(user, "dog", "great results").unwrap();
    assert_eq!(second.feedback(), "great results");
    assert_eq!(second.created_at(), first.created_at());

    let count: i64 = service
        .database()
        .connection()
        .query_row("SELECT COUNT(*) FROM search_feedback", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn feedback_is_kept_per_user_and_query() {
    let service = service();
    service.upsert_feedback(UserId::new(1), "dog", "a").unwrap();
    service.upsert_feedback(UserId::new(2), "dog", "b").unwrap();
    service.upsert_feedback(UserId::new(1), "cat", "c").unwrap();

    let fb = service.get_feedback(UserId::new(2), "dog").unwrap().unwrap();
    assert_eq!(fb.feedback(), "b");
    assert_eq!(fb.user_id(), UserId::new(2));
    assert_eq!(fb.query(), "dog");
    assert_eq!(service.get_feedback(UserId::new(2), "cat").unwrap(), None);
}

#[test]
fn submit_feedback_rejects_duplicates() {
    let service = service();
    let user = UserId::new(1);

    service.submit_feedback(user, "recipes", "useful").unwrap();
    let err = service
        .submit_feedback(user, "recipes", "again")
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<FeedbackError>(),
        Some(&FeedbackError::AlreadySubmitted {
            query: "recipes".to_string()
        })
    );
    let kept = service.get_feedback(user, "recipes").unwrap().unwrap();
    assert_eq!(kept.feedback(), "useful");
}

#[test]
fn feedback_rejects_blank_input() {
    let service = service();
    let user = UserId::new(1);

    for (query, text) in [("", "text"), ("query", "  "), (" ", "")] {
        let err = service.submit_feedback(user, query, text).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FeedbackError>(),
            Some(&FeedbackError::InvalidInput)
        );

        let err = service.upsert_feedback(user, query, text).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FeedbackError>(),
            Some(&FeedbackError::InvalidInput)
        );
    }
}
