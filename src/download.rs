use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::config::AnalyzerConfig;
use crate::dataset::{Dataset, DatasetRow};
use crate::error::{AnalyzerError, Result};
use crate::feedback::Feedback;
use crate::utils;

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub pdf_dir: PathBuf,
    pub timeout: Duration,
    pub seed: u64,
    pub user_agent: String,
}

impl From<&AnalyzerConfig> for DownloadSettings {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            pdf_dir: config.download_dir(),
            timeout: config.request_timeout(),
            seed: config.sample_seed,
            user_agent: config.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedDocument {
    pub path: PathBuf,
    pub title: String,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Saved(PathBuf),
    Rejected(StatusCode),
}

pub fn build_pdf_filename(row: &DatasetRow) -> String {
    format!("doc_{}.pdf", row.index)
}

pub fn build_client(settings: &DownloadSettings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
        .build()?)
}

/// Reproducible sample of `min(limit, len)` distinct rows for a given seed.
pub fn sample_rows(dataset: &Dataset, limit: usize, seed: u64) -> Vec<&DatasetRow> {
    let rows = dataset.rows();
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order.truncate(std::cmp::min(limit, rows.len()));
    order.into_iter().map(|idx| &rows[idx]).collect()
}

/// Fetches one row's PDF; only an HTTP 200 body is written to disk.
pub fn download_pdf_for_row(
    client: &Client,
    row: &DatasetRow,
    pdf_dir: &Path,
) -> Result<FetchOutcome> {
    let pdf_path = pdf_dir.join(build_pdf_filename(row));
    let url = Url::parse(row.pdf_url.trim())?;
    let response = client.get(url).send()?;
    let status = response.status();
    if status != StatusCode::OK {
        return Ok(FetchOutcome::Rejected(status));
    }
    let bytes = response.bytes()?;
    utils::write_atomic_bytes(&pdf_path, &bytes)?;
    debug!(path = %pdf_path.display(), bytes = bytes.len(), "wrote pdf");
    Ok(FetchOutcome::Saved(pdf_path))
}

pub fn download_pdfs(
    dataset: &Dataset,
    limit: usize,
    settings: &DownloadSettings,
    feedback: &mut Feedback,
) -> Result<Vec<DownloadedDocument>> {
    let pdf_dir = settings.pdf_dir.as_path();
    fs::create_dir_all(pdf_dir).map_err(|err| AnalyzerError::io(pdf_dir, err))?;
    let client = build_client(settings)?;

    let sample = sample_rows(dataset, limit, settings.seed);
    info!(requested = limit, sampled = sample.len(), "downloading sample");

    let mut saved = Vec::new();
    for row in sample {
        if row.pdf_url.is_empty() {
            continue;
        }
        match download_pdf_for_row(&client, row, pdf_dir) {
            Ok(FetchOutcome::Saved(path)) => {
                feedback.success(format!("Downloaded: {}", build_pdf_filename(row)));
                saved.push(DownloadedDocument {
                    path,
                    title: row.title.clone(),
                });
            }
            Ok(FetchOutcome::Rejected(status)) => {
                debug!(url = %row.pdf_url, %status, "non-200 response");
                feedback.warning(format!("Failed to download: {}", row.pdf_url));
            }
            Err(err) => feedback.warning(format!("Error: {err}")),
        }
    }

    info!(saved = saved.len(), "download finished");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        let mut csv = String::from("title,pdf_url\n");
        for i in 0..n {
            csv.push_str(&format!("Paper {i},http://127.0.0.1:9/{i}.pdf\n"));
        }
        Dataset::from_csv_str(&csv).unwrap()
    }

    #[test]
    fn sample_is_capped_by_dataset_size() {
        let dataset = dataset(3);
        assert_eq!(sample_rows(&dataset, 20, 42).len(), 3);
        assert_eq!(sample_rows(&dataset, 2, 42).len(), 2);
    }

    #[test]
    fn sample_is_reproducible_and_distinct() {
        let dataset = dataset(50);
        let first: Vec<usize> = sample_rows(&dataset, 10, 42).iter().map(|r| r.index).collect();
        let second: Vec<usize> = sample_rows(&dataset, 10, 42).iter().map(|r| r.index).collect();
        assert_eq!(first, second);
        let mut unique = first.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn filename_uses_row_index() {
        let dataset = Dataset::from_csv_str("title,pdf_url\n,skip\nA,u\n").unwrap();
        assert_eq!(build_pdf_filename(&dataset.rows()[0]), "doc_1.pdf");
    }

    #[test]
    fn relative_url_is_reported_not_fetched() {
        let dataset = Dataset::from_csv_str("title,pdf_url\nA,papers/1.pdf\n").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let settings = DownloadSettings {
            pdf_dir: dir.path().to_path_buf(),
            timeout: Duration::from_secs(1),
            seed: 42,
            user_agent: "test".to_string(),
        };
        let mut feedback = Feedback::new();
        let saved = download_pdfs(&dataset, 5, &settings, &mut feedback).unwrap();
        assert!(saved.is_empty());
        assert!(feedback.notices()[0].message.starts_with("Error: Invalid URL"));
    }
}
