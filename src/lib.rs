//! portal-harvest library
//!
//! This crate provides the core functionality for the `portal-harvest` binary.
//! The crate root only declares modules; implementation and tests live in the modules themselves.
//!
//! ## Overview
//!
//! The library is organized into modules that handle the two phases of the pipeline:
//!
//! - [`downloader`] - Drives a browser through the portal's code form and download links
//! - [`parser`] - Reads the downloaded text/PDF files and exports the sorted table
//! - [`cli`] - Command-line interface orchestrating download, tabulation and cleanup
//! - [`config`] - Pipeline settings with defaults and TOML loading
//! - [`models`] - Download tasks, file metadata and table rows
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! Download the files of every configured access code, then build the spreadsheet:
//!
//! ```no_run
//! use portal_harvest::{cli, config::ResolvedConfig, downloader::ChromiumPortal, errors::AppResult};
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let mut portal = ChromiumPortal::new(&config);
//! let table = cli::run_workflow(&mut portal, &config).await?;
//! println!("{} rows written", table.height());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod errors;
pub mod models;
pub mod parser;
pub mod ui;
pub mod utils;
