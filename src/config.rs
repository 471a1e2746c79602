use crate::constants::*;
use crate::errors::{AppError, AppResult};
use crate::models::{DownloadTask, PdfPages};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Resolved configuration with all values filled in.
///
/// This struct represents the pipeline defaults and can be deserialized by the TOML
/// loader. Every key is optional in the file; missing keys fall back to the defaults
/// below, and unknown keys are rejected to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    // Portal
    /// Page holding the code input and the download links
    pub portal_url: String,
    /// CSS selector of the access code input
    pub code_input_selector: String,
    /// Access codes to submit, processed in order
    pub codes: Vec<String>,
    /// Download tags in `container|link|file_id|extension` form
    pub tags: Vec<String>,
    /// Prefix of the downloaded file names (`{prefix}{file_id}-{code}.{ext}`)
    pub file_prefix: String,

    // Paths
    /// Directory the browser downloads into and the table is built from
    pub download_dir: PathBuf,
    /// Spreadsheet to write; the extension selects the format (xlsx, parquet, csv)
    pub output_path: PathBuf,

    // Waits
    /// Maximum seconds to wait for a download link to become clickable
    pub click_timeout_secs: u64,
    /// Maximum seconds to wait for a clicked download to appear on disk
    pub download_timeout_secs: u64,
    /// Milliseconds between file existence checks
    pub poll_interval_ms: u64,

    // Processing
    /// Which PDF pages end up in the table
    pub pdf_pages: PdfPages,
    /// Whether to run the browser without a window
    pub headless: bool,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// Whether to delete the downloaded files once the table is written
    pub cleanup: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            portal_url: PORTAL_URL.to_string(),
            code_input_selector: CODE_INPUT_SELECTOR.to_string(),
            codes: DEFAULT_CODES.iter().map(|c| c.to_string()).collect(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            file_prefix: FILE_PREFIX.to_string(),
            download_dir: PathBuf::from(DOWNLOAD_DIR),
            output_path: PathBuf::from(OUTPUT_PATH),
            click_timeout_secs: CLICK_TIMEOUT_SECS,
            download_timeout_secs: DOWNLOAD_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            pdf_pages: PdfPages::First,
            headless: true,
            chrome_executable: None,
            cleanup: false,
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, unknown keys are present,
    /// or any value fails [`ResolvedConfig::validate`].
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the values the pipeline relies on.
    ///
    /// Codes end up inside file names (`arquivo1-{code}.txt`), so they must be
    /// non-empty and free of `-`, `.` and path separators for the names to parse back.
    pub fn validate(&self) -> AppResult<()> {
        self.portal_url()?;

        if self.codes.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one access code is required".into(),
            ));
        }
        for code in &self.codes {
            if code.trim().is_empty() {
                return Err(AppError::InvalidInput("Access codes must not be blank".into()));
            }
            if code.contains(['-', '.', '/', '\\']) {
                return Err(AppError::InvalidInput(format!(
                    "Access code '{code}' must not contain '-', '.' or path separators"
                )));
            }
        }

        if self.tasks()?.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one download tag is required".into(),
            ));
        }
        if self.file_prefix.contains(['-', '.', '/', '\\']) {
            return Err(AppError::InvalidInput(format!(
                "File prefix '{}' must not contain '-', '.' or path separators",
                self.file_prefix
            )));
        }

        if self.click_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Click timeout must be greater than 0".into(),
            ));
        }
        if self.download_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Download timeout must be greater than 0".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::InvalidInput(
                "Poll interval must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Parsed portal URL.
    pub fn portal_url(&self) -> AppResult<Url> {
        Ok(Url::parse(&self.portal_url)?)
    }

    /// Decodes the configured download tags.
    pub fn tasks(&self) -> AppResult<Vec<DownloadTask>> {
        self.tags.iter().map(|t| DownloadTask::from_tag(t)).collect()
    }

    pub fn click_timeout(&self) -> Duration {
        Duration::from_secs(self.click_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
