pub mod config;
pub mod db;
pub mod models;
pub mod search;
pub mod service;
pub mod utils;

pub use db::Database;
pub use models::{NewNote, Note, NoteBuilder, NoteId, SearchFeedback, UserId};
pub use service::{FeedbackError, ListNotesOptions, NoteService, SortOrder};
