//! Analyze an uploaded CSV of arXiv-style metadata: sample and download the
//! referenced PDFs, search their text for a keyword, preview the dataset
//! sorted by title, and train a throwaway random-forest classifier on the
//! abstracts.

pub mod classify;
pub mod config;
pub mod dataset;
pub mod download;
pub mod error;
pub mod feedback;
pub mod pdf;
pub mod report;
pub mod search;
pub mod serve;
pub mod tfidf;
pub mod utils;

pub use error::{AnalyzerError, Result};
