//! Lexical database: synonym sets and dictionary-form lemmatization.
//!
//! The thesaurus is a WordNet-style collection of synonym sets, each tagged with
//! a part of speech. Lemmatization follows WordNet's morphological processor:
//! irregular forms come from an exception table, regular inflections are undone
//! by suffix substitution and a candidate is only accepted when it names a known
//! lemma for the requested part of speech.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Thesaurus compiled into the binary, used when no external file is configured.
const BUNDLED_THESAURUS: &str = include_str!("../../data/thesaurus.txt");

/// Coarse part of speech used to pick a lemmatization rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// All parts of speech, in the order synonym lookups visit them.
    pub const ALL: [PartOfSpeech; 4] = [Self::Noun, Self::Verb, Self::Adjective, Self::Adverb];

    /// Parses a WordNet part-of-speech letter.
    ///
    /// Adjective satellites (`s`) fold into `Adjective`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "n" => Some(Self::Noun),
            "v" => Some(Self::Verb),
            "a" | "s" => Some(Self::Adjective),
            "r" => Some(Self::Adverb),
            _ => None,
        }
    }

    /// Suffix substitutions that undo regular inflection for this part of speech.
    fn substitutions(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            Self::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            Self::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
            Self::Adverb => &[],
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noun => write!(f, "n"),
            Self::Verb => write!(f, "v"),
            Self::Adjective => write!(f, "a"),
            Self::Adverb => write!(f, "r"),
        }
    }
}

/// Irregular inflections that suffix rules cannot undo.
const IRREGULAR_FORMS: &[(PartOfSpeech, &str, &str)] = &[
    (PartOfSpeech::Noun, "mice", "mouse"),
    (PartOfSpeech::Noun, "teeth", "tooth"),
    (PartOfSpeech::Noun, "feet", "foot"),
    (PartOfSpeech::Noun, "geese", "goose"),
    (PartOfSpeech::Noun, "children", "child"),
    (PartOfSpeech::Noun, "people", "person"),
    (PartOfSpeech::Noun, "lives", "life"),
    (PartOfSpeech::Noun, "knives", "knife"),
    (PartOfSpeech::Noun, "wives", "wife"),
    (PartOfSpeech::Noun, "leaves", "leaf"),
    (PartOfSpeech::Noun, "wolves", "wolf"),
    (PartOfSpeech::Noun, "halves", "half"),
    (PartOfSpeech::Noun, "shelves", "shelf"),
    (PartOfSpeech::Noun, "analyses", "analysis"),
    (PartOfSpeech::Noun, "crises", "crisis"),
    (PartOfSpeech::Noun, "theses", "thesis"),
    (PartOfSpeech::Noun, "criteria", "criterion"),
    (PartOfSpeech::Noun, "phenomena", "phenomenon"),
    (PartOfSpeech::Verb, "went", "go"),
    (PartOfSpeech::Verb, "gone", "go"),
    (PartOfSpeech::Verb, "made", "make"),
    (PartOfSpeech::Verb, "got", "get"),
    (PartOfSpeech::Verb, "gotten", "get"),
    (PartOfSpeech::Verb, "getting", "get"),
    (PartOfSpeech::Verb, "took", "take"),
    (PartOfSpeech::Verb, "taken", "take"),
    (PartOfSpeech::Verb, "saw", "see"),
    (PartOfSpeech::Verb, "seen", "see"),
    (PartOfSpeech::Verb, "said", "say"),
    (PartOfSpeech::Verb, "told", "tell"),
    (PartOfSpeech::Verb, "knew", "know"),
    (PartOfSpeech::Verb, "known", "know"),
    (PartOfSpeech::Verb, "thought", "think"),
    (PartOfSpeech::Verb, "forgot", "forget"),
    (PartOfSpeech::Verb, "forgotten", "forget"),
    (PartOfSpeech::Verb, "ran", "run"),
    (PartOfSpeech::Verb, "running", "run"),
    (PartOfSpeech::Verb, "began", "begin"),
    (PartOfSpeech::Verb, "begun", "begin"),
    (PartOfSpeech::Verb, "beginning", "begin"),
    (PartOfSpeech::Verb, "ate", "eat"),
    (PartOfSpeech::Verb, "eaten", "eat"),
    (PartOfSpeech::Verb, "drank", "drink"),
    (PartOfSpeech::Verb, "drunk", "drink"),
    (PartOfSpeech::Verb, "brought", "bring"),
    (PartOfSpeech::Verb, "found", "find"),
    (PartOfSpeech::Verb, "gave", "give"),
    (PartOfSpeech::Verb, "given", "give"),
    (PartOfSpeech::Verb, "kept", "keep"),
    (PartOfSpeech::Verb, "sang", "sing"),
    (PartOfSpeech::Verb, "sung", "sing"),
    (PartOfSpeech::Verb, "swam", "swim"),
    (PartOfSpeech::Verb, "swimming", "swim"),
    (PartOfSpeech::Verb, "flew", "fly"),
    (PartOfSpeech::Verb, "flown", "fly"),
    (PartOfSpeech::Verb, "slept", "sleep"),
    (PartOfSpeech::Verb, "bought", "buy"),
    (PartOfSpeech::Verb, "taught", "teach"),
    (PartOfSpeech::Verb, "met", "meet"),
    (PartOfSpeech::Verb, "wrote", "write"),
    (PartOfSpeech::Verb, "written", "write"),
    (PartOfSpeech::Verb, "planned", "plan"),
    (PartOfSpeech::Verb, "planning", "plan"),
    (PartOfSpeech::Verb, "shopped", "shop"),
    (PartOfSpeech::Verb, "shopping", "shop"),
    (PartOfSpeech::Verb, "stopped", "stop"),
    (PartOfSpeech::Verb, "stopping", "stop"),
    (PartOfSpeech::Adjective, "better", "good"),
    (PartOfSpeech::Adjective, "best", "good"),
    (PartOfSpeech::Adjective, "bigger", "big"),
    (PartOfSpeech::Adjective, "biggest", "big"),
    (PartOfSpeech::Adjective, "happier", "happy"),
    (PartOfSpeech::Adjective, "happiest", "happy"),
    (PartOfSpeech::Adjective, "easier", "easy"),
    (PartOfSpeech::Adjective, "easiest", "easy"),
    (PartOfSpeech::Adverb, "better", "well"),
    (PartOfSpeech::Adverb, "best", "well"),
];

/// Errors raised while loading a thesaurus.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The thesaurus file could not be read.
    #[error("Failed to read thesaurus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line did not follow the `<pos>\t<lemma>,...` layout.
    #[error("Malformed thesaurus line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// A group of lemmas sharing one sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymSet {
    pos: PartOfSpeech,
    lemmas: Vec<String>,
}

impl SynonymSet {
    /// Creates a synonym set from its lemma names.
    pub fn new(pos: PartOfSpeech, lemmas: Vec<String>) -> Self {
        Self { pos, lemmas }
    }

    /// Returns the part of speech of this sense.
    pub fn pos(&self) -> PartOfSpeech {
        self.pos
    }

    /// Returns the lemma names as stored, with `_` joining multi-word lemmas.
    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }
}

/// Read-only lexical resource consulted by normalization and query expansion.
pub trait LexicalDatabase: Send + Sync {
    /// Returns every synonym set the word (or one of its base forms) belongs to.
    fn synonyms_of(&self, word: &str) -> Vec<SynonymSet>;

    /// Reduces a word to its dictionary form for the given part of speech.
    ///
    /// Words the database cannot reduce are returned unchanged.
    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String;

    /// Whether `word` is itself a dictionary form for `pos`.
    fn contains(&self, word: &str, pos: PartOfSpeech) -> bool;
}

/// In-memory WordNet-style thesaurus.
#[derive(Debug, Default)]
pub struct Thesaurus {
    synsets: Vec<SynonymSet>,
    /// Lowercase lemma key to the synsets containing it, per part of speech.
    index: HashMap<(PartOfSpeech, String), Vec<usize>>,
    /// Irregular form to base forms, per part of speech.
    exceptions: HashMap<(PartOfSpeech, String), Vec<String>>,
}

impl Thesaurus {
    /// Loads the thesaurus shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the bundled data is malformed, which the unit tests rule out.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_THESAURUS).expect("bundled thesaurus is well-formed")
    }

    /// Loads a thesaurus file.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::Io` if the file cannot be read and
    /// `LexiconError::Parse` if any line is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let thesaurus = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            synsets = thesaurus.len(),
            "loaded thesaurus"
        );
        Ok(thesaurus)
    }

    /// Parses thesaurus text.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::Parse` naming the first malformed line.
    pub fn parse(text: &str) -> Result<Self, LexiconError> {
        let mut thesaurus = Self::default();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (code, lemmas) = line.split_once('\t').ok_or_else(|| LexiconError::Parse {
                line: number + 1,
                message: "expected <pos><TAB><lemmas>".to_string(),
            })?;

            let pos = PartOfSpeech::from_code(code.trim()).ok_or_else(|| LexiconError::Parse {
                line: number + 1,
                message: format!("unknown part of speech '{}'", code.trim()),
            })?;

            let lemmas: Vec<String> = lemmas
                .split(',')
                .map(str::trim)
                .filter(|lemma| !lemma.is_empty())
                .map(String::from)
                .collect();

            if lemmas.is_empty() {
                return Err(LexiconError::Parse {
                    line: number + 1,
                    message: "synonym set has no lemmas".to_string(),
                });
            }

            thesaurus.insert(SynonymSet::new(pos, lemmas));
        }

        for (pos, form, base) in IRREGULAR_FORMS {
            thesaurus
                .exceptions
                .entry((*pos, (*form).to_string()))
                .or_default()
                .push((*base).to_string());
        }

        Ok(thesaurus)
    }

    /// Adds a synonym set and indexes each of its lemmas.
    pub fn insert(&mut self, synset: SynonymSet) {
        let position = self.synsets.len();
        for lemma in synset.lemmas() {
            let slot = self
                .index
                .entry((synset.pos(), lemma.to_lowercase()))
                .or_default();
            if !slot.contains(&position) {
                slot.push(position);
            }
        }
        self.synsets.push(synset);
    }

    /// Number of synonym sets.
    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    /// Whether the thesaurus holds no synonym sets.
    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }

    fn is_known(&self, form: &str, pos: PartOfSpeech) -> bool {
        self.index.contains_key(&(pos, form.to_string()))
    }

    /// Base forms of `form` known for `pos`, in discovery order.
    fn morphy(&self, form: &str, pos: PartOfSpeech) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut accept = |forms: &[String], require_known: bool| -> Vec<String> {
            forms
                .iter()
                .filter(|f| !require_known || self.is_known(f, pos))
                .filter(|f| seen.insert((*f).clone()))
                .cloned()
                .collect()
        };

        // Irregular targets count as lemmas even when no synonym set lists them.
        if let Some(bases) = self.exceptions.get(&(pos, form.to_string())) {
            let mut candidates = Vec::new();
            if self.is_known(form, pos) {
                candidates.push(form.to_string());
            }
            candidates.extend(bases.iter().cloned());
            return accept(&candidates, false);
        }

        let mut forms = detach(&[form.to_string()], pos);
        let mut candidates = vec![form.to_string()];
        candidates.extend(forms.iter().cloned());
        let found = accept(&candidates, true);
        if !found.is_empty() {
            return found;
        }

        while !forms.is_empty() {
            forms = detach(&forms, pos);
            let found = accept(&forms, true);
            if !found.is_empty() {
                return found;
            }
        }

        Vec::new()
    }
}

/// Applies every matching suffix substitution to every form.
fn detach(forms: &[String], pos: PartOfSpeech) -> Vec<String> {
    let mut out = Vec::new();
    for form in forms {
        for (old, new) in pos.substitutions() {
            if let Some(stem) = form.strip_suffix(old) {
                out.push(format!("{stem}{new}"));
            }
        }
    }
    out
}

impl LexicalDatabase for Thesaurus {
    fn synonyms_of(&self, word: &str) -> Vec<SynonymSet> {
        let word = word.trim().to_lowercase().replace(' ', "_");
        if word.is_empty() {
            return Vec::new();
        }

        let mut positions = Vec::new();
        for pos in PartOfSpeech::ALL {
            for base in self.morphy(&word, pos) {
                if let Some(found) = self.index.get(&(pos, base)) {
                    for position in found {
                        if !positions.contains(position) {
                            positions.push(*position);
                        }
                    }
                }
            }
        }

        positions
            .into_iter()
            .map(|position| self.synsets[position].clone())
            .collect()
    }

    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        self.morphy(word, pos)
            .into_iter()
            .min_by_key(|lemma| lemma.chars().count())
            .unwrap_or_else(|| word.to_string())
    }

    fn contains(&self, word: &str, pos: PartOfSpeech) -> bool {
        self.is_known(&word.to_lowercase().replace(' ', "_"), pos)
    }
}
