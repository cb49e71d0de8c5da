//! Parsed CSV metadata: one row per paper with a title and a PDF link.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

use crate::error::{AnalyzerError, Result};

pub const COL_TITLE: &str = "title";
pub const COL_PDF_URL: &str = "pdf_url";
pub const COL_ABSTRACT: &str = "abstract";
pub const COL_CATEGORY: &str = "category";

/// Cell values read as "missing", the same set a dataframe loader treats as NA.
static NA_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .into_iter()
    .collect()
});

fn cell(record: &StringRecord, column: Option<usize>) -> Option<String> {
    let value = record.get(column?)?;
    if NA_TOKENS.contains(value) {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    /// Position among the CSV's data records before incomplete rows were dropped.
    pub index: usize,
    pub title: String,
    pub pdf_url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total_documents: usize,
    /// `None` when the upload has no category column.
    pub unique_categories: Option<usize>,
    pub unique_titles: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
    has_abstract: bool,
    has_category: bool,
    dropped: usize,
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| AnalyzerError::io(path, err))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_bytes(content.as_bytes())
    }

    /// Parses CSV bytes; a header or record that is not valid UTF-8 is a
    /// CSV error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
        let headers = reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|header| header == name);

        let title_col = position(COL_TITLE)
            .ok_or_else(|| AnalyzerError::MissingColumn(COL_TITLE.to_string()))?;
        let url_col = position(COL_PDF_URL)
            .ok_or_else(|| AnalyzerError::MissingColumn(COL_PDF_URL.to_string()))?;
        let abstract_col = position(COL_ABSTRACT);
        let category_col = position(COL_CATEGORY);

        let mut rows = Vec::new();
        let mut dropped = 0;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let (Some(title), Some(pdf_url)) =
                (cell(&record, Some(title_col)), cell(&record, Some(url_col)))
            else {
                dropped += 1;
                continue;
            };
            rows.push(DatasetRow {
                index,
                title,
                pdf_url,
                abstract_text: cell(&record, abstract_col),
                category: cell(&record, category_col),
            });
        }

        info!(
            rows = rows.len(),
            dropped,
            has_abstract = abstract_col.is_some(),
            has_category = category_col.is_some(),
            "loaded dataset"
        );
        Ok(Self {
            rows,
            has_abstract: abstract_col.is_some(),
            has_category: category_col.is_some(),
            dropped,
        })
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows discarded on load for a missing title or URL.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn summary(&self) -> DatasetSummary {
        let unique_categories = self.has_category.then(|| {
            self.rows
                .iter()
                .filter_map(|row| row.category.as_deref())
                .collect::<HashSet<_>>()
                .len()
        });
        let unique_titles = self
            .rows
            .iter()
            .map(|row| row.title.as_str())
            .collect::<HashSet<_>>()
            .len();
        DatasetSummary {
            total_documents: self.rows.len(),
            unique_categories,
            unique_titles,
        }
    }

    /// First `limit` rows ordered by title in plain code-point order.
    pub fn sorted_by_title(&self, limit: usize) -> Vec<&DatasetRow> {
        let mut sorted: Vec<&DatasetRow> = self.rows.iter().collect();
        sorted.sort_by(|a, b| a.title.cmp(&b.title));
        sorted.truncate(limit);
        sorted
    }

    /// `(abstract, category)` pairs of rows that have both.
    pub fn labelled_abstracts(&self) -> Result<Vec<(&str, &str)>> {
        if !self.has_abstract {
            return Err(AnalyzerError::MissingColumn(COL_ABSTRACT.to_string()));
        }
        if !self.has_category {
            return Err(AnalyzerError::MissingColumn(COL_CATEGORY.to_string()));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| match (&row.abstract_text, &row.category) {
                (Some(text), Some(category)) => Some((text.as_str(), category.as_str())),
                _ => None,
            })
            .collect())
    }
}
