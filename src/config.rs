//! Runtime configuration read from environment variables.
//!
//! Values are parsed at call time and fall back to defaults when a variable is
//! unset or unparseable. The binary loads a `.env` file first, so the same
//! variables can live there.

use std::path::PathBuf;

use crate::UserId;
use crate::search::{BoostWeights, DEFAULT_PREFIX_BOOST, DEFAULT_TITLE_BOOST};

/// Environment variable overriding the word-prefix boost.
pub const PREFIX_BOOST_VAR: &str = "NOTES_PREFIX_BOOST";
/// Environment variable overriding the title-prefix boost.
pub const TITLE_BOOST_VAR: &str = "NOTES_TITLE_BOOST";
/// Environment variable naming an external thesaurus file.
pub const THESAURUS_VAR: &str = "NOTES_THESAURUS";
/// Environment variable naming the element used to mark matches.
pub const HIGHLIGHT_TAG_VAR: &str = "NOTES_HIGHLIGHT_TAG";
/// Environment variable overriding the database location.
pub const DATABASE_VAR: &str = "NOTES_DB";
/// Environment variable naming the acting user.
pub const USER_VAR: &str = "NOTES_USER";

/// Search tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Prefix boost increments.
    pub boosts: BoostWeights,
    /// Element name wrapped around highlighted matches (default `mark`).
    pub highlight_tag: String,
    /// Thesaurus file replacing the bundled one.
    pub thesaurus_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            boosts: BoostWeights::default(),
            highlight_tag: "mark".to_string(),
            thesaurus_path: None,
        }
    }
}

impl SearchConfig {
    /// Parses configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NOTES_PREFIX_BOOST` (f64, default 0.2): added per term prefixing a word
    /// - `NOTES_TITLE_BOOST` (f64, default 0.3): added per term prefixing the title
    /// - `NOTES_THESAURUS` (path, optional): thesaurus file to load instead of the bundled one
    /// - `NOTES_HIGHLIGHT_TAG` (default `mark`): element wrapped around matches
    ///
    /// Negative or non-finite boosts are ignored so scores stay non-negative.
    pub fn from_env() -> Self {
        let prefix_match = env_boost(PREFIX_BOOST_VAR).unwrap_or(DEFAULT_PREFIX_BOOST);
        let title_prefix = env_boost(TITLE_BOOST_VAR).unwrap_or(DEFAULT_TITLE_BOOST);

        let thesaurus_path = std::env::var(THESAURUS_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let highlight_tag = std::env::var(HIGHLIGHT_TAG_VAR)
            .ok()
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "mark".to_string());

        Self {
            boosts: BoostWeights {
                prefix_match,
                title_prefix,
            },
            highlight_tag,
            thesaurus_path,
        }
    }
}

fn env_boost(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Returns the acting user from `NOTES_USER`, defaulting to user 1.
pub fn current_user() -> UserId {
    let id = std::env::var(USER_VAR)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1);
    UserId::new(id)
}
