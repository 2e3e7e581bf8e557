use std::collections::BTreeSet;
use std::sync::Arc;

use crate::Note;

use super::normalizer::Normalizer;
use super::vector_space::{VectorSpaceModel, cosine_similarity};

/// Default increment when any word of a note starts with an expanded term.
pub const DEFAULT_PREFIX_BOOST: f64 = 0.2;
/// Default increment when a note's title starts with an expanded term.
pub const DEFAULT_TITLE_BOOST: f64 = 0.3;

/// Heuristic increments added on top of cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostWeights {
    /// Added per term that prefixes some word of the note's title or content.
    pub prefix_match: f64,
    /// Added per term that prefixes the note's title.
    pub title_prefix: f64,
}

impl Default for BoostWeights {
    fn default() -> Self {
        Self {
            prefix_match: DEFAULT_PREFIX_BOOST,
            title_prefix: DEFAULT_TITLE_BOOST,
        }
    }
}

/// A note paired with its final relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNote<'a> {
    pub note: &'a Note,
    pub score: f64,
}

/// Ranks notes against a query with TF-IDF cosine similarity plus prefix boosts.
///
/// The vector space is fitted per call over every note plus the query, so a
/// score depends only on the notes passed in and the query text.
#[derive(Clone)]
pub struct SimilarityScorer {
    normalizer: Normalizer,
    model: Arc<dyn VectorSpaceModel>,
    boosts: BoostWeights,
}

impl SimilarityScorer {
    /// Creates a scorer.
    pub fn new(
        normalizer: Normalizer,
        model: Arc<dyn VectorSpaceModel>,
        boosts: BoostWeights,
    ) -> Self {
        Self {
            normalizer,
            model,
            boosts,
        }
    }

    /// Returns the boost increments in use.
    pub fn boosts(&self) -> BoostWeights {
        self.boosts
    }

    /// Scores `notes` against `query` and returns the positive ones, best first.
    ///
    /// `expanded_terms` are the raw lowercase query terms plus their synonyms;
    /// they drive the prefix boosts. Notes with equal scores keep their input
    /// order. A vector space that cannot be fitted yields no results.
    pub fn score<'a>(
        &self,
        query: &str,
        notes: &'a [Note],
        expanded_terms: &BTreeSet<String>,
    ) -> Vec<ScoredNote<'a>> {
        if notes.is_empty() {
            return Vec::new();
        }

        let mut documents: Vec<String> = notes
            .iter()
            .map(|note| self.normalizer.normalize(&note.searchable_text()))
            .collect();
        let normalized_query = self.normalizer.normalize(query);
        tracing::debug!(query = %normalized_query, "normalized query");
        documents.push(normalized_query);

        let vectors = match self.model.fit_transform(&documents) {
            Ok(vectors) => vectors,
            Err(err) => {
                tracing::warn!(error = %err, "vectorization failed; returning no results");
                return Vec::new();
            }
        };
        let Some((query_vector, note_vectors)) = vectors.split_last() else {
            return Vec::new();
        };

        let mut scored: Vec<ScoredNote<'a>> = notes
            .iter()
            .zip(note_vectors)
            .map(|(note, vector)| ScoredNote {
                note,
                score: cosine_similarity(query_vector, vector) + self.boost(note, expanded_terms),
            })
            .collect();

        // Stable: equal scores keep note order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.retain(|s| s.score > 0.0);
        scored
    }

    /// Sum of prefix increments earned by `note` over all terms.
    pub fn boost(&self, note: &Note, expanded_terms: &BTreeSet<String>) -> f64 {
        let text = note.searchable_text().to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();
        let title = note.title().to_lowercase();

        let mut boost = 0.0;
        for term in expanded_terms {
            if words.iter().any(|word| word.starts_with(term.as_str())) {
                boost += self.boosts.prefix_match;
            }
            if title.starts_with(term.as_str()) {
                boost += self.boosts.title_prefix;
            }
        }
        boost
    }
}

impl std::fmt::Debug for SimilarityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityScorer")
            .field("boosts", &self.boosts)
            .finish_non_exhaustive()
    }
}
