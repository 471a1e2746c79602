use crate::errors::AppResult;
use std::path::PathBuf;
use tracing::{info, warn};

/// Deletes downloaded files once the table has been written.
///
/// Typically called with the paths returned by
/// [`download_codes`](crate::downloader::download_codes) after a successful export.
///
/// # Arguments
///
/// * `paths` - Downloaded files to delete
/// * `should_cleanup` - If `false`, the function returns immediately without deleting anything
///
/// # Error Handling
///
/// Individual deletion errors are logged as warnings but do not fail the entire operation.
/// Files that are already gone are skipped silently.
pub async fn cleanup_files(paths: &[PathBuf], should_cleanup: bool) -> AppResult<()> {
    if !should_cleanup {
        info!("Cleanup skipped (cleanup disabled)");
        return Ok(());
    }

    info!(files = paths.len(), "Starting cleanup phase");

    let mut deleted = 0;
    let mut errors = 0;

    for path in paths {
        if !path.exists() {
            continue;
        }
        match tokio::fs::remove_file(path).await {
            Ok(_) => {
                deleted += 1;
            }
            Err(e) => {
                errors += 1;
                warn!(
                    file = %path.display(),
                    error = %e,
                    "Failed to delete downloaded file"
                );
            }
        }
    }

    info!(deleted = deleted, errors = errors, "Cleanup completed");

    Ok(())
}
