//! Browser-driven downloads from the portal.
//!
//! This module drives a browser through the portal's access code form and
//! download links, waiting for each file to land on disk. The main entry points
//! are [`download_codes`] and [`download_code`]; [`Portal`] is the browser seam.

mod browser;
mod file_downloader;
mod waiter;

// Re-export public API
pub use browser::{ChromiumPortal, Portal};
pub use file_downloader::{download_code, download_codes};
pub use waiter::wait_for_download;
