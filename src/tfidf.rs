use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|mat| mat.as_str().to_string())
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Unigram TF-IDF: raw counts times smoothed idf, rows L2-normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    vocab: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Keeps the `max_features` most frequent terms across `documents`
    /// (ties broken alphabetically); columns are in alphabetical order.
    pub fn fit(documents: &[&str], max_features: usize) -> Self {
        let mut corpus_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            for (term, count) in term_counts(doc) {
                *corpus_counts.entry(term.clone()).or_insert(0) += count;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut term_pairs: Vec<(String, usize)> = corpus_counts.into_iter().collect();
        term_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        term_pairs.truncate(max_features);
        term_pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let vocab: BTreeMap<String, usize> = term_pairs
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _count))| (term, idx))
            .collect();

        let doc_count = documents.len() as f64;
        let mut idf = vec![0.0; vocab.len()];
        for (term, idx) in &vocab {
            let df = *doc_freq.get(term).unwrap_or(&0) as f64;
            idf[*idx] = ((1.0 + doc_count) / (1.0 + df)).ln() + 1.0;
        }

        Self { vocab, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocab.len()
    }

    pub fn transform_one(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocab.len()];
        for (term, count) in term_counts(text) {
            if let Some(&idx) = self.vocab.get(&term) {
                vector[idx] = count as f64 * self.idf[idx];
            }
        }

        let norm: f64 = vector.iter().map(|val| val * val).sum::<f64>().sqrt();
        if norm > 0.0 {
            for val in &mut vector {
                *val /= norm;
            }
        }
        vector
    }

    pub fn transform(&self, documents: &[&str]) -> Vec<Vec<f64>> {
        documents.iter().map(|doc| self.transform_one(doc)).collect()
    }
}
