use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::lexicon::{LexicalDatabase, PartOfSpeech};
use super::stopwords::ENGLISH_STOPWORDS;

/// Assigns a coarse part of speech to a single token.
pub trait PartOfSpeechTagger: Send + Sync {
    /// Tags one lowercase token. Unrecognized tokens should come back as nouns.
    fn tag(&self, token: &str) -> PartOfSpeech;
}

/// Context-free tagger driven by English derivational suffixes.
///
/// Deterministic per token, which keeps normalization idempotent: a lemma is
/// tagged the same way whether it came from the raw text or from a previous
/// normalization pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixTagger;

const ADVERB_SUFFIXES: &[&str] = &["ly"];
const VERB_SUFFIXES: &[&str] = &["ing", "ed", "ize", "ise", "ify"];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "less", "ish", "ic", "ical", "ary", "ent", "ant",
];

impl PartOfSpeechTagger for SuffixTagger {
    fn tag(&self, token: &str) -> PartOfSpeech {
        // Short tokens carry too little suffix to judge.
        if token.chars().count() <= 4 || token.chars().all(|c| c.is_ascii_digit()) {
            return PartOfSpeech::Noun;
        }

        let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| token.ends_with(s));

        if ends_with_any(ADVERB_SUFFIXES) {
            PartOfSpeech::Adverb
        } else if ends_with_any(VERB_SUFFIXES) {
            PartOfSpeech::Verb
        } else if ends_with_any(ADJECTIVE_SUFFIXES) {
            PartOfSpeech::Adjective
        } else {
            PartOfSpeech::Noun
        }
    }
}

/// Turns free text into a space-separated sequence of lemmas.
///
/// Lowercases, strips ASCII punctuation, splits on whitespace, drops
/// stopwords, tags each survivor and lemmatizes it for that tag. A token that
/// is already a dictionary form keeps the first part of speech the lexicon
/// knows it under; only unknown tokens are handed to the tagger.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use notesearch::search::{Normalizer, Thesaurus};
///
/// let normalizer = Normalizer::new(Arc::new(Thesaurus::bundled()));
/// assert_eq!(normalizer.normalize("The dogs!"), "dog");
/// assert_eq!(normalizer.normalize("the and of"), "");
/// ```
#[derive(Clone)]
pub struct Normalizer {
    lexicon: Arc<dyn LexicalDatabase>,
    tagger: Arc<dyn PartOfSpeechTagger>,
    stopwords: HashSet<&'static str>,
}

impl Normalizer {
    /// Creates a normalizer using the suffix tagger.
    pub fn new(lexicon: Arc<dyn LexicalDatabase>) -> Self {
        Self::with_tagger(lexicon, Arc::new(SuffixTagger))
    }

    /// Creates a normalizer with a custom part-of-speech tagger.
    pub fn with_tagger(
        lexicon: Arc<dyn LexicalDatabase>,
        tagger: Arc<dyn PartOfSpeechTagger>,
    ) -> Self {
        Self {
            lexicon,
            tagger,
            stopwords: ENGLISH_STOPWORDS.iter().copied().collect(),
        }
    }

    /// Returns the lexical database this normalizer lemmatizes with.
    pub fn lexicon(&self) -> &Arc<dyn LexicalDatabase> {
        &self.lexicon
    }

    /// Normalizes `text` into lemmas joined by single spaces.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        stripped
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| {
                let pos = self.tag(token);
                self.lexicon.lemmatize(token, pos)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tag(&self, token: &str) -> PartOfSpeech {
        PartOfSpeech::ALL
            .into_iter()
            .find(|pos| self.lexicon.contains(token, *pos))
            .unwrap_or_else(|| self.tagger.tag(token))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

/// Splits a raw query into lowercase terms without any filtering.
///
/// These are the surface forms used for expansion, boosting and highlighting.
pub fn raw_terms(query: &str) -> BTreeSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}
