use crate::errors::{AppError, AppResult};
use indicatif::{ProgressBar, ProgressStyle};

const DOWNLOAD_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files {msg}";

/// Progress bar counting expected downloads across all access codes.
///
/// # Example
///
/// ```no_run
/// use portal_harvest::ui;
///
/// # fn main() -> Result<(), portal_harvest::errors::AppError> {
/// let pb = ui::create_progress_bar(8)?;
/// pb.inc(1);
/// pb.finish_with_message("Downloaded 8 file(s)");
/// # Ok(())
/// # }
/// ```
pub fn create_progress_bar(total: u64) -> AppResult<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template(DOWNLOAD_TEMPLATE)
        .map_err(|e| AppError::InvalidInput(format!("Bad progress bar template: {e}")))?
        .progress_chars("#>-");
    Ok(ProgressBar::new(total).with_style(style))
}
