use crate::errors::{AppError, AppResult};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::debug;

/// Waits until `path` is a regular file, checking every `poll_interval`.
///
/// The browser writes downloads under a temporary name and renames them when
/// complete, so the final name existing means the file is ready to read. A
/// directory or other non-file entry at `path` does not count.
///
/// # Errors
///
/// Returns `DownloadTimeout` if the file has not appeared after `timeout`.
pub async fn wait_for_download(
    path: &Path,
    timeout: Duration,
    poll_interval: Duration,
) -> AppResult<()> {
    let started = Instant::now();

    loop {
        let is_file = fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            debug!(
                file = %path.display(),
                waited_ms = started.elapsed().as_millis() as u64,
                "Download finished"
            );
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(AppError::DownloadTimeout {
                path: path.to_path_buf(),
                waited,
            });
        }

        tokio::time::sleep(poll_interval.min(timeout - waited)).await;
    }
}
