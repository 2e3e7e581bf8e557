//! Note search: query expansion, text normalization, vector similarity and highlighting.
//!
//! A search runs as one synchronous pipeline per request:
//!
//! 1. The raw query is split into lowercase terms and expanded with thesaurus
//!    synonyms ([`QueryExpander`]).
//! 2. Every note's `title + " " + content` and the query are normalized into
//!    lemmas ([`Normalizer`]).
//! 3. A TF-IDF space is fitted over the notes plus the query and each note is
//!    scored by cosine similarity, then boosted for prefix matches of the
//!    expanded terms ([`SimilarityScorer`]).
//! 4. Positive-scoring notes are returned best first, with the expanded terms
//!    highlighted in escaped title and content ([`Highlighter`]).
//!
//! Nothing is cached between requests: the vector space is rebuilt from the
//! current notes every time, so a score depends only on those notes and the query.
//!
//! The lexical database is loaded once and shared read-only through `Arc`.
//!
//! ```
//! use std::sync::Arc;
//! use notesearch::search::{SearchEngine, Thesaurus};
//!
//! let engine = SearchEngine::new(Arc::new(Thesaurus::bundled()));
//! assert!(engine.search("", &[]).unwrap().is_empty());
//! ```

mod engine;
mod expander;
mod highlighter;
mod lexicon;
mod normalizer;
mod scorer;
mod stopwords;
mod vector_space;

use anyhow::Result;

use crate::{Note, NoteId};

pub use engine::{SearchEngine, SearchHit};
pub use expander::QueryExpander;
pub use highlighter::{
    HighlightError, HighlightMarker, Highlighter, Markup, escape_html, highlight,
};
pub use lexicon::{LexicalDatabase, LexiconError, PartOfSpeech, SynonymSet, Thesaurus};
pub use normalizer::{Normalizer, PartOfSpeechTagger, SuffixTagger, raw_terms};
pub use scorer::{
    BoostWeights, DEFAULT_PREFIX_BOOST, DEFAULT_TITLE_BOOST, ScoredNote, SimilarityScorer,
};
pub use stopwords::ENGLISH_STOPWORDS;
pub use vector_space::{
    SparseVector, TfIdfVectorizer, VectorSpaceError, VectorSpaceModel, cosine_similarity,
};

/// Read access to stored notes, as search needs it.
pub trait NoteStore {
    /// Every note, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_all_notes(&self) -> Result<Vec<Note>>;

    /// One note by ID, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_note(&self, id: NoteId) -> Result<Option<Note>>;
}
