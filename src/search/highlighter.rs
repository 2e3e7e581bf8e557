use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a highlight pattern.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The combined term pattern could not be compiled.
    #[error("Failed to build highlight pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// HTML that is safe to render as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Returns the markup text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the markup and returns the text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opening and closing markup wrapped around each match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarker {
    open: String,
    close: String,
}

impl HighlightMarker {
    /// Wraps matches in a plain element, e.g. `tag("mark")` gives `<mark>..</mark>`.
    pub fn tag(name: &str) -> Self {
        Self {
            open: format!("<{name}>"),
            close: format!("</{name}>"),
        }
    }

    /// Wraps matches in `<span class="...">..</span>`.
    pub fn span_class(class: &str) -> Self {
        Self {
            open: format!("<span class=\"{}\">", escape_html(class)),
            close: "</span>".to_string(),
        }
    }
}

impl Default for HighlightMarker {
    fn default() -> Self {
        Self::tag("mark")
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Marks case-insensitive occurrences of a fixed term set in text.
///
/// Terms are matched as plain substrings, longest first, so a longer term
/// wins over a shorter one starting at the same position. Matching runs on
/// the raw text and every piece is escaped on its own, which keeps terms from
/// matching inside entities such as `&amp;`.
///
/// # Examples
///
/// ```
/// use notesearch::search::{Highlighter, HighlightMarker};
///
/// let highlighter = Highlighter::new(["cat", "category"], HighlightMarker::default()).unwrap();
/// assert_eq!(highlighter.highlight("Category").as_str(), "<mark>Category</mark>");
/// ```
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
    marker: HighlightMarker,
}

impl Highlighter {
    /// Compiles the term set into a single alternation.
    ///
    /// Empty and whitespace-only terms are ignored.
    ///
    /// # Errors
    ///
    /// Returns `HighlightError::Pattern` if the alternation cannot be compiled,
    /// e.g. when it exceeds the regex size limit.
    pub fn new<I, S>(terms: I, marker: HighlightMarker) -> Result<Self, HighlightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| !t.trim().is_empty())
            .collect();
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        terms.dedup();

        let pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!("(?:{alternation})"))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { pattern, marker })
    }

    /// Returns escaped `raw_text` with every term occurrence wrapped in the marker.
    pub fn highlight(&self, raw_text: &str) -> Markup {
        let Some(pattern) = &self.pattern else {
            return Markup(escape_html(raw_text));
        };

        let mut out = String::with_capacity(raw_text.len() + 16);
        let mut last = 0;
        for found in pattern.find_iter(raw_text) {
            out.push_str(&escape_html(&raw_text[last..found.start()]));
            out.push_str(&self.marker.open);
            out.push_str(&escape_html(found.as_str()));
            out.push_str(&self.marker.close);
            last = found.end();
        }
        out.push_str(&escape_html(&raw_text[last..]));
        Markup(out)
    }
}

/// One-shot helper: highlights `terms` in `raw_text` with the default marker.
///
/// # Errors
///
/// Returns `HighlightError::Pattern` if the term pattern cannot be compiled.
pub fn highlight<I, S>(raw_text: &str, terms: I) -> Result<Markup, HighlightError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Highlighter::new(terms, HighlightMarker::default())?.highlight(raw_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TERMS: [&str; 0] = [];

    #[test]
    fn no_terms_returns_escaped_text() {
        let raw = r#"<b>"Tom" & 'Jerry'</b>"#;
        let markup = highlight(raw, NO_TERMS).unwrap();
        assert_eq!(markup.as_str(), escape_html(raw));
        assert_eq!(
            markup.as_str(),
            "&lt;b&gt;&#34;Tom&#34; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn matches_are_case_insensitive_and_keep_original_case() {
        let markup = highlight("Dog Training for dogs", ["dog"]).unwrap();
        assert_eq!(
            markup.as_str(),
            "<mark>Dog</mark> Training for <mark>dog</mark>s"
        );
    }

    #[test]
    fn longest_term_wins_at_same_position() {
        let markup = highlight("category", ["cat", "category"]).unwrap();
        assert_eq!(markup.as_str(), "<mark>category</mark>");
    }

    #[test]
    fn regex_special_characters_are_literal() {
        let markup = highlight("I like C++ and c", ["c++"]).unwrap();
        assert_eq!(markup.as_str(), "I like <mark>C++</mark> and c");

        let markup = highlight("a.b axb", ["a.b"]).unwrap();
        assert_eq!(markup.as_str(), "<mark>a.b</mark> axb");
    }

    #[test]
    fn empty_terms_are_excluded() {
        let markup = highlight("dog", ["", "  "]).unwrap();
        assert_eq!(markup.as_str(), "dog");

        let markup = highlight("dog", ["", "dog"]).unwrap();
        assert_eq!(markup.as_str(), "<mark>dog</mark>");
    }

    #[test]
    fn terms_never_match_inside_escaped_entities() {
        let markup = highlight("salt & pepper", ["amp"]).unwrap();
        assert_eq!(markup.as_str(), "salt &amp; pepper");
    }

    #[test]
    fn matched_text_is_escaped_too() {
        let markup = highlight("x <tag> y", ["<tag>"]).unwrap();
        assert_eq!(markup.as_str(), "x <mark>&lt;tag&gt;</mark> y");
    }

    #[test]
    fn multi_word_terms_match_across_spaces() {
        let markup = highlight("My Domestic Dog", ["domestic dog", "dog"]).unwrap();
        assert_eq!(markup.as_str(), "My <mark>Domestic Dog</mark>");
    }

    #[test]
    fn span_marker_wraps_with_class() {
        let h = Highlighter::new(["note"], HighlightMarker::span_class("highlight")).unwrap();
        assert_eq!(
            h.highlight("Notes").as_str(),
            r#"<span class="highlight">Note</span>s"#
        );
    }
}
