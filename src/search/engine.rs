use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::Note;
use crate::config::SearchConfig;

use super::NoteStore;
use super::expander::QueryExpander;
use super::highlighter::{HighlightError, HighlightMarker, Highlighter, Markup};
use super::lexicon::{LexicalDatabase, LexiconError, Thesaurus};
use super::normalizer::{Normalizer, raw_terms};
use super::scorer::{BoostWeights, SimilarityScorer};
use super::vector_space::{TfIdfVectorizer, VectorSpaceModel};

/// One ranked search result, ready for display.
///
/// Score and markup belong to this request only; the note itself is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub note: Note,
    pub similarity_score: f64,
    pub highlighted_title: Markup,
    pub highlighted_content: Markup,
}

/// Query pipeline: normalize, expand, score, highlight.
///
/// Holds only read-only resources, so one engine can serve any number of
/// requests; nothing about a request outlives the call that handles it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use notesearch::search::{SearchEngine, Thesaurus};
/// use notesearch::{NoteBuilder, NoteId};
///
/// let engine = SearchEngine::new(Arc::new(Thesaurus::bundled()));
/// let notes = vec![NoteBuilder::new()
///     .id(NoteId::new(1))
///     .title("Dog Training")
///     .content("Basic obedience tips for dogs")
///     .build()];
///
/// let hits = engine.search("dog", &notes).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert!(hits[0].highlighted_title.as_str().contains("<mark>Dog</mark>"));
/// ```
#[derive(Debug, Clone)]
pub struct SearchEngine {
    normalizer: Normalizer,
    expander: QueryExpander,
    scorer: SimilarityScorer,
    marker: HighlightMarker,
}

impl SearchEngine {
    /// Creates an engine with TF-IDF scoring and default boosts and marker.
    pub fn new(lexicon: Arc<dyn LexicalDatabase>) -> Self {
        Self::with_parts(
            lexicon,
            Arc::new(TfIdfVectorizer::new()),
            BoostWeights::default(),
            HighlightMarker::default(),
        )
    }

    /// Creates an engine from explicit parts.
    pub fn with_parts(
        lexicon: Arc<dyn LexicalDatabase>,
        model: Arc<dyn VectorSpaceModel>,
        boosts: BoostWeights,
        marker: HighlightMarker,
    ) -> Self {
        let normalizer = Normalizer::new(Arc::clone(&lexicon));
        Self {
            expander: QueryExpander::new(lexicon),
            scorer: SimilarityScorer::new(normalizer.clone(), model, boosts),
            normalizer,
            marker,
        }
    }

    /// Builds an engine from configuration, loading the configured thesaurus.
    ///
    /// Falls back to the bundled thesaurus when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured thesaurus cannot be loaded.
    pub fn from_config(config: &SearchConfig) -> Result<Self, LexiconError> {
        let thesaurus = match &config.thesaurus_path {
            Some(path) => Thesaurus::from_path(path)?,
            None => Thesaurus::bundled(),
        };

        Ok(Self::with_parts(
            Arc::new(thesaurus),
            Arc::new(TfIdfVectorizer::new()),
            config.boosts,
            HighlightMarker::tag(&config.highlight_tag),
        ))
    }

    /// Returns the normalizer.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Raw lowercase query terms plus their synonyms.
    pub fn expanded_terms(&self, query: &str) -> BTreeSet<String> {
        self.expander.expand(&raw_terms(query))
    }

    /// Ranks `notes` against `query` and highlights the expanded terms in each hit.
    ///
    /// A blank query performs no search and returns nothing.
    ///
    /// # Errors
    ///
    /// Returns `HighlightError` if the highlight pattern cannot be compiled.
    pub fn search(&self, query: &str, notes: &[Note]) -> Result<Vec<SearchHit>, HighlightError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let terms = self.expanded_terms(query);
        let ranked = self.scorer.score(query, notes, &terms);
        let highlighter = Highlighter::new(&terms, self.marker.clone())?;

        tracing::debug!(
            notes = notes.len(),
            hits = ranked.len(),
            terms = terms.len(),
            "search finished"
        );

        Ok(ranked
            .into_iter()
            .map(|scored| SearchHit {
                highlighted_title: highlighter.highlight(scored.note.title()),
                highlighted_content: highlighter.highlight(scored.note.content()),
                similarity_score: scored.score,
                note: scored.note.clone(),
            })
            .collect())
    }

    /// Loads every note from `store` and searches them.
    ///
    /// A blank query returns nothing without reading the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or highlighting fails.
    pub fn search_store<S: NoteStore + ?Sized>(
        &self,
        store: &S,
        query: &str,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let notes = store.list_all_notes().context("Failed to load notes")?;
        Ok(self.search(query, &notes)?)
    }

    /// Highlights the expanded terms of `query` in a single note's title and content.
    ///
    /// A blank query leaves both escaped but unmarked.
    ///
    /// # Errors
    ///
    /// Returns `HighlightError` if the highlight pattern cannot be compiled.
    pub fn highlight_note(
        &self,
        note: &Note,
        query: &str,
    ) -> Result<(Markup, Markup), HighlightError> {
        let highlighter = Highlighter::new(&self.expanded_terms(query), self.marker.clone())?;
        Ok((
            highlighter.highlight(note.title()),
            highlighter.highlight(note.content()),
        ))
    }
}
