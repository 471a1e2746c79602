use super::browser::Portal;
use super::waiter::wait_for_download;
use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::models::DownloadTask;
use crate::ui;
use crate::utils::format_duration;
use indicatif::ProgressBar;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

/// Downloads every file of one access code through `portal`.
///
/// Opens a session on the portal URL, submits `code`, then for each task in
/// order clicks its link and waits for the expected file
/// (`{file_prefix}{file_id}-{code}.{ext}`) to appear in the download directory.
/// A file left over from an earlier run under the expected name is removed
/// before clicking, so the wait only succeeds on a fresh download. A leftover
/// that cannot be removed fails the code with `IoError`.
///
/// The session is closed whether or not the downloads succeed.
///
/// # Returns
///
/// The paths of the downloaded files, in task order.
///
/// # Errors
///
/// Returns the first browser, `ElementTimeout` or `DownloadTimeout` error hit;
/// no further tasks are attempted for this code.
pub async fn download_code<P: Portal + ?Sized>(
    portal: &mut P,
    code: &str,
    tasks: &[DownloadTask],
    config: &ResolvedConfig,
    pb: &ProgressBar,
) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(&config.download_dir).await?;

    let result = run_session(portal, code, tasks, config, pb).await;
    let closed = portal.close().await;

    match (result, closed) {
        (Ok(paths), Ok(())) => Ok(paths),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(code = code, error = %close_err, "Failed to close browser session");
            Err(e)
        }
    }
}

async fn run_session<P: Portal + ?Sized>(
    portal: &mut P,
    code: &str,
    tasks: &[DownloadTask],
    config: &ResolvedConfig,
    pb: &ProgressBar,
) -> AppResult<Vec<PathBuf>> {
    let url = config.portal_url()?;
    portal.open(&url).await?;
    portal
        .submit_code(&config.code_input_selector, code)
        .await?;

    let mut paths = Vec::with_capacity(tasks.len());
    for task in tasks {
        let file_name = task.file_name(&config.file_prefix, code);
        let file_path = config.download_dir.join(&file_name);

        remove_stale_download(&file_path).await?;

        pb.set_message(format!("Downloading {file_name}..."));
        portal
            .click_when_ready(&task.xpath(), config.click_timeout())
            .await?;
        wait_for_download(&file_path, config.download_timeout(), config.poll_interval()).await?;

        pb.inc(1);
        pb.set_message(format!("Completed {file_name}"));
        paths.push(file_path);
    }

    Ok(paths)
}

/// Deletes a leftover file at `path` so only a fresh download can satisfy the wait.
async fn remove_stale_download(path: &Path) -> AppResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(file_path = %path.display(), "Removed stale download");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::IoError(format!(
            "Failed to remove stale download {}: {e}",
            path.display()
        ))),
    }
}

/// Downloads the files of every configured access code, one code at a time.
///
/// Codes are processed strictly in order; each one gets its own browser session.
/// The first failing code aborts the run, leaving later codes untouched.
///
/// # Returns
///
/// Every downloaded path, grouped by code in configuration order.
///
/// # Errors
///
/// Returns `InvalidInput` for undecodable tags, otherwise the error of the failing code.
pub async fn download_codes<P: Portal + ?Sized>(
    portal: &mut P,
    config: &ResolvedConfig,
) -> AppResult<Vec<PathBuf>> {
    let tasks = config.tasks()?;
    let total_files = config.codes.len() * tasks.len();

    let pb = ui::create_progress_bar(total_files as u64)?;
    let start = Instant::now();

    info!(
        codes = config.codes.len(),
        files = total_files,
        download_dir = %config.download_dir.display(),
        "Starting download"
    );

    let mut downloaded = Vec::with_capacity(total_files);
    for code in &config.codes {
        info!(code = code.as_str(), "Downloading files for code");
        match download_code(portal, code, &tasks, config, &pb).await {
            Ok(mut paths) => downloaded.append(&mut paths),
            Err(e) => {
                pb.abandon_with_message(format!("Failed code {code}"));
                warn!(code = code.as_str(), error = %e, "Download failed");
                return Err(e);
            }
        }
    }

    pb.finish_with_message(format!("Downloaded {} file(s)", downloaded.len()));
    info!(
        downloaded = downloaded.len(),
        elapsed = format_duration(start.elapsed()),
        "Download completed"
    );

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;
    use url::Url;

    /// Portal double that "downloads" by writing the expected file on click.
    struct FakePortal {
        download_dir: PathBuf,
        tasks: Vec<DownloadTask>,
        code: Option<String>,
        writes_files: bool,
        opened: usize,
        closed: usize,
        clicks: Vec<String>,
    }

    impl FakePortal {
        fn new(config: &ResolvedConfig, writes_files: bool) -> Self {
            Self {
                download_dir: config.download_dir.clone(),
                tasks: config.tasks().unwrap(),
                code: None,
                writes_files,
                opened: 0,
                closed: 0,
                clicks: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Portal for FakePortal {
        async fn open(&mut self, _url: &Url) -> AppResult<()> {
            self.opened += 1;
            Ok(())
        }

        async fn submit_code(&mut self, _selector: &str, code: &str) -> AppResult<()> {
            self.code = Some(code.to_string());
            Ok(())
        }

        async fn click_when_ready(&mut self, xpath: &str, _timeout: Duration) -> AppResult<()> {
            self.clicks.push(xpath.to_string());
            if !self.writes_files {
                return Ok(());
            }
            let code = self.code.clone().unwrap();
            let task = self.tasks.iter().find(|t| t.xpath() == xpath).unwrap();
            let path = self.download_dir.join(task.file_name("arquivo", &code));
            tokio::fs::write(&path, format!("fresh {xpath}")).await.unwrap();
            Ok(())
        }

        async fn close(&mut self) -> AppResult<()> {
            self.closed += 1;
            Ok(())
        }
    }

    fn test_config(dir: &Path) -> ResolvedConfig {
        ResolvedConfig {
            download_dir: dir.join("data"),
            download_timeout_secs: 1,
            poll_interval_ms: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn download_codes_fetches_every_task_for_every_code() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let mut portal = FakePortal::new(&config, true);

        let paths = download_codes(&mut portal, &config).await.unwrap();

        assert_eq!(paths.len(), 8);
        assert!(paths.iter().all(|p| p.exists()));
        assert_eq!(paths[0], config.download_dir.join("arquivo1-98465.txt"));
        assert_eq!(paths[7], config.download_dir.join("arquivo2-321465.pdf"));
        assert_eq!(portal.opened, 2);
        assert_eq!(portal.closed, 2);
        assert_eq!(portal.clicks[0], "/html/body/div[2]/div[2]/a");
        assert_eq!(portal.clicks[3], "/html/body/div[3]/div[3]/a");
    }

    #[tokio::test]
    async fn stale_file_is_replaced_by_fresh_download() {
        let temp_dir = TempDir::new().unwrap();
        let config = ResolvedConfig {
            codes: vec!["98465".to_string()],
            ..test_config(temp_dir.path())
        };
        std::fs::create_dir_all(&config.download_dir).unwrap();
        let stale = config.download_dir.join("arquivo1-98465.txt");
        std::fs::write(&stale, "stale").unwrap();

        let mut portal = FakePortal::new(&config, true);
        download_codes(&mut portal, &config).await.unwrap();

        let content = std::fs::read_to_string(&stale).unwrap();
        assert!(content.starts_with("fresh"));
    }

    #[tokio::test]
    async fn missing_download_times_out_and_closes_session() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let mut portal = FakePortal::new(&config, false);

        let result = download_codes(&mut portal, &config).await;

        match result {
            Err(AppError::DownloadTimeout { path, .. }) => {
                assert_eq!(path, config.download_dir.join("arquivo1-98465.txt"));
            }
            other => panic!("Expected DownloadTimeout, got {other:?}"),
        }
        // First code fails on its first task; the second code is never started
        assert_eq!(portal.opened, 1);
        assert_eq!(portal.closed, 1);
        assert_eq!(portal.clicks.len(), 1);
    }

    #[tokio::test]
    async fn unremovable_leftover_fails_before_clicking() {
        let temp_dir = TempDir::new().unwrap();
        let config = ResolvedConfig {
            codes: vec!["98465".to_string()],
            ..test_config(temp_dir.path())
        };
        let squatter = config.download_dir.join("arquivo1-98465.txt");
        std::fs::create_dir_all(&squatter).unwrap();

        let mut portal = FakePortal::new(&config, true);
        let result = download_codes(&mut portal, &config).await;

        match result {
            Err(AppError::IoError(msg)) => assert!(msg.contains("arquivo1-98465.txt")),
            other => panic!("Expected IoError, got {other:?}"),
        }
        assert!(portal.clicks.is_empty());
        assert_eq!(portal.opened, 1);
        assert_eq!(portal.closed, 1);
    }
}
