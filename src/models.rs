mod feedback;
mod ids;
mod note;

pub use feedback::SearchFeedback;
pub use ids::{NoteId, UserId};
pub use note::{DEFAULT_CATEGORY, NewNote, Note, NoteBuilder};
