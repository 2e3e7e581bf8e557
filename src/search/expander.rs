use std::collections::BTreeSet;
use std::sync::Arc;

use super::lexicon::LexicalDatabase;

/// Widens query terms with their thesaurus synonyms.
#[derive(Clone)]
pub struct QueryExpander {
    lexicon: Arc<dyn LexicalDatabase>,
}

impl QueryExpander {
    /// Creates an expander backed by the given lexical database.
    pub fn new(lexicon: Arc<dyn LexicalDatabase>) -> Self {
        Self { lexicon }
    }

    /// Returns the input terms plus every lemma of every synonym set they belong to.
    ///
    /// Multi-word lemmas have their `_` separators replaced by spaces and are
    /// lowercased. Terms the thesaurus does not know pass through unchanged, so
    /// the result is always a superset of `terms`.
    pub fn expand(&self, terms: &BTreeSet<String>) -> BTreeSet<String> {
        let mut expanded = terms.clone();

        for term in terms {
            for synset in self.lexicon.synonyms_of(term) {
                for lemma in synset.lemmas() {
                    let surface = lemma.replace('_', " ").to_lowercase();
                    if !surface.trim().is_empty() {
                        expanded.insert(surface);
                    }
                }
            }
        }

        tracing::debug!(
            input = terms.len(),
            expanded = expanded.len(),
            "expanded query terms"
        );
        expanded
    }
}

impl std::fmt::Debug for QueryExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExpander").finish_non_exhaustive()
    }
}
