use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::search::SNIPPET_RADIUS;
use crate::utils;

pub const DEFAULT_CONFIG_PATH: &str = "analyzer_config.json";
const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_pdfs";
const DEFAULT_USER_AGENT: &str = "doc-analyzer/0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_TEST_FRACTION: f64 = 0.2;
const DEFAULT_MAX_FEATURES: usize = 10_000;
const DEFAULT_N_TREES: u16 = 400;
const DEFAULT_KEYWORD: &str = "quantum";
const DEFAULT_LIMIT: usize = 5;
const DEFAULT_MAX_LIMIT: usize = 20;
const DEFAULT_PREVIEW_ROWS: usize = 10;
const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub download_dir: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub sample_seed: u64,
    pub split_seed: u64,
    pub forest_seed: u64,
    pub test_fraction: f64,
    pub max_features: usize,
    pub n_trees: u16,
    pub snippet_radius: usize,
    pub default_keyword: String,
    pub default_limit: usize,
    pub max_limit: usize,
    pub preview_rows: usize,
    pub upload_limit_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::from_file(AnalyzerConfigFile::default())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzerConfigFile {
    #[serde(default)]
    download_dir: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    sample_seed: Option<u64>,
    #[serde(default)]
    split_seed: Option<u64>,
    #[serde(default)]
    forest_seed: Option<u64>,
    #[serde(default)]
    test_fraction: Option<f64>,
    #[serde(default)]
    max_features: Option<usize>,
    #[serde(default)]
    n_trees: Option<u16>,
    #[serde(default)]
    snippet_radius: Option<usize>,
    #[serde(default)]
    default_keyword: Option<String>,
    #[serde(default)]
    default_limit: Option<usize>,
    #[serde(default)]
    max_limit: Option<usize>,
    #[serde(default)]
    preview_rows: Option<usize>,
    #[serde(default)]
    upload_limit_bytes: Option<usize>,
}

impl AnalyzerConfig {
    fn from_file(config: AnalyzerConfigFile) -> Self {
        Self {
            download_dir: config
                .download_dir
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_string()),
            request_timeout_secs: config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: config
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            sample_seed: config.sample_seed.unwrap_or(DEFAULT_SEED),
            split_seed: config.split_seed.unwrap_or(DEFAULT_SEED),
            forest_seed: config.forest_seed.unwrap_or(DEFAULT_SEED),
            test_fraction: config.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION),
            max_features: config.max_features.unwrap_or(DEFAULT_MAX_FEATURES),
            n_trees: config.n_trees.unwrap_or(DEFAULT_N_TREES),
            snippet_radius: config.snippet_radius.unwrap_or(SNIPPET_RADIUS),
            default_keyword: config
                .default_keyword
                .unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
            default_limit: config.default_limit.unwrap_or(DEFAULT_LIMIT),
            max_limit: config.max_limit.unwrap_or(DEFAULT_MAX_LIMIT),
            preview_rows: config.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            upload_limit_bytes: config
                .upload_limit_bytes
                .unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AnalyzerError::Config(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.max_limit == 0 {
            return Err(AnalyzerError::Config("max_limit must be at least 1".to_string()));
        }
        if self.n_trees == 0 {
            return Err(AnalyzerError::Config("n_trees must be at least 1".to_string()));
        }
        if self.max_features == 0 {
            return Err(AnalyzerError::Config(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Slider bounds: the download count is always in `1..=max_limit`.
    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.clamp(1, self.max_limit.max(1))
    }

    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|err| AnalyzerError::io(path, err))?;
        let file = serde_json::from_str::<AnalyzerConfigFile>(&contents).map_err(|err| {
            AnalyzerError::Config(format!("Failed to parse config {path:?}: {err}"))
        })?;
        AnalyzerConfig::from_file(file)
    } else {
        AnalyzerConfig::default()
    };
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &AnalyzerConfig) -> Result<()> {
    utils::ensure_parent_dir(path)?;
    let contents = serde_json::to_string_pretty(config)?;
    utils::write_atomic_bytes(path, contents.as_bytes())
}
