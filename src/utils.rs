use crate::errors::{AppError, AppResult};
use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn kb_from_bytes(bytes: u64) -> f64 {
    ((bytes as f64 / 1024.0) * 100.0).round() / 100.0
}

/// Cuts `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(text[..byte_idx].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// File name component of `path` as UTF-8.
///
/// # Errors
///
/// Returns `FileNameError` carrying the lossy rendering of the path when the
/// name is missing or not valid UTF-8.
pub fn file_name_str(path: &Path) -> AppResult<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::FileNameError {
            name: path.to_string_lossy().into_owned(),
            reason: "file name is missing or not valid UTF-8".to_string(),
        })
}
