use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Browser launch, navigation or CDP command failed
    #[error("Browser error: {0}")]
    BrowserError(String),
    /// A page element never became clickable
    #[error("Element '{xpath}' was not clickable after {waited:?}")]
    ElementTimeout { xpath: String, waited: Duration },
    /// An expected download never appeared on disk
    #[error("Download '{}' did not appear after {waited:?}", .path.display())]
    DownloadTimeout { path: PathBuf, waited: Duration },
    /// A downloaded file name does not follow `{archive}-{code}.{ext}`
    #[error("Unexpected file name '{name}': {reason} (expected '{{archive}}-{{code}}.{{txt|pdf}}')")]
    FileNameError { name: String, reason: String },
    /// Failed to extract content from a downloaded file
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
    /// Building or exporting the output table failed
    #[error("Table error: {0}")]
    TableError(String),
}

// Conversion implementations for common errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::BrowserError(err.to_string())
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::TableError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::TableError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid URL: {err}"))
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
