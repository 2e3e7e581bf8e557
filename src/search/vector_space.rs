//! TF-IDF vector space over a small document set.
//!
//! Weights follow the common smoothed scheme: raw term counts, inverse document
//! frequency `ln((1 + n) / (1 + df)) + 1`, rows scaled to unit L2 length. With
//! unit rows the cosine between two documents is their dot product.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Tokens are runs of two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Errors raised while fitting a vector space.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorSpaceError {
    /// No document contributed a single token.
    #[error("empty vocabulary; documents contain no indexable tokens")]
    EmptyVocabulary,
}

/// Sparse vector as `(dimension, weight)` pairs sorted by dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from unsorted entries. Zero weights are dropped.
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, weight)| *weight != 0.0);
        entries.sort_by_key(|(dimension, _)| *dimension);
        Self { entries }
    }

    /// Non-zero entries in dimension order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Whether every weight is zero.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product with another sparse vector.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_dim, a_w) = self.entries[i];
            let (b_dim, b_w) = other.entries[j];
            match a_dim.cmp(&b_dim) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine of the angle between two vectors; zero when either is the zero vector.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(0.0, 1.0)
}

/// Turns a batch of documents into vectors in one shared space.
pub trait VectorSpaceModel: Send + Sync {
    /// Fits the space on `documents` and returns one vector per document, in order.
    ///
    /// # Errors
    ///
    /// Returns `VectorSpaceError::EmptyVocabulary` when no document yields a token.
    fn fit_transform(&self, documents: &[String]) -> Result<Vec<SparseVector>, VectorSpaceError>;
}

/// TF-IDF vectorizer with smoothed IDF and L2-normalized rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct TfIdfVectorizer;

impl TfIdfVectorizer {
    /// Creates a vectorizer.
    pub fn new() -> Self {
        Self
    }

    /// Splits a document into lowercase tokens of two or more word characters.
    pub fn tokenize(document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl VectorSpaceModel for TfIdfVectorizer {
    fn fit_transform(&self, documents: &[String]) -> Result<Vec<SparseVector>, VectorSpaceError> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| Self::tokenize(d)).collect();

        // Sorted vocabulary gives stable dimension numbering.
        let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            for token in tokens {
                vocabulary.entry(token.as_str()).or_insert(0);
            }
        }
        if vocabulary.is_empty() {
            return Err(VectorSpaceError::EmptyVocabulary);
        }
        for (dimension, slot) in vocabulary.values_mut().enumerate() {
            *slot = dimension;
        }

        let counts: Vec<HashMap<usize, f64>> = tokenized
            .iter()
            .map(|tokens| {
                let mut tf = HashMap::new();
                for token in tokens {
                    *tf.entry(vocabulary[token.as_str()]).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for tf in &counts {
            for dimension in tf.keys() {
                document_frequency[*dimension] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        tracing::debug!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "fitted tf-idf space"
        );

        Ok(counts
            .into_iter()
            .map(|tf| {
                let weighted = SparseVector::from_entries(
                    tf.into_iter().map(|(dim, count)| (dim, count * idf[dim])).collect(),
                );
                let norm = weighted.norm();
                if norm == 0.0 {
                    weighted
                } else {
                    SparseVector::from_entries(
                        weighted.entries().iter().map(|(d, w)| (*d, w / norm)).collect(),
                    )
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn tokenizer_drops_single_character_tokens() {
        assert_eq!(
            TfIdfVectorizer::tokenize("a dog x-ray is OK"),
            vec!["dog", "ray", "is", "ok"]
        );
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let result = TfIdfVectorizer.fit_transform(&docs(&["", "a b c"]));
        assert_eq!(result, Err(VectorSpaceError::EmptyVocabulary));
    }

    #[test]
    fn rows_are_unit_length_or_zero() {
        let vectors = TfIdfVectorizer
            .fit_transform(&docs(&["dog dog cat", "", "bird"]))
            .unwrap();

        assert_eq!(vectors.len(), 3);
        assert!(approx(vectors[0].norm(), 1.0));
        assert!(vectors[1].is_zero());
        assert!(approx(vectors[2].norm(), 1.0));
    }

    #[test]
    fn identical_documents_have_similarity_one() {
        let vectors = TfIdfVectorizer
            .fit_transform(&docs(&["dog training", "cat food", "dog training"]))
            .unwrap();
        assert!(approx(cosine_similarity(&vectors[0], &vectors[2]), 1.0));
        assert!(approx(cosine_similarity(&vectors[0], &vectors[1]), 0.0));
    }

    #[test]
    fn smoothed_idf_weights_rarer_terms_higher() {
        // "dog" appears in 2 of 2 documents, "cat" in 1 of 2.
        let vectors = TfIdfVectorizer.fit_transform(&docs(&["cat dog", "dog"])).unwrap();

        let idf_dog = 1.0;
        let idf_cat = (3.0f64 / 2.0).ln() + 1.0;
        let norm = (idf_dog * idf_dog + idf_cat * idf_cat).sqrt();

        // Vocabulary is sorted: cat = 0, dog = 1
        let row = vectors[0].entries();
        assert_eq!(row.len(), 2);
        assert!(approx(row[0].1, idf_cat / norm));
        assert!(approx(row[1].1, idf_dog / norm));
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        let a = SparseVector::from_entries(vec![(0, 1.0)]);
        let zero = SparseVector::default();
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
    }

    #[test]
    fn dot_product_matches_shared_dimensions_only() {
        let a = SparseVector::from_entries(vec![(3, 2.0), (0, 1.0)]);
        let b = SparseVector::from_entries(vec![(0, 4.0), (2, 5.0), (3, 0.5)]);
        assert!(approx(a.dot(&b), 1.0 * 4.0 + 2.0 * 0.5));
    }
}
