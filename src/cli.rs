use crate::config::ResolvedConfig;
use crate::downloader::{download_codes, ChromiumPortal, Portal};
use crate::errors::{AppError, AppResult};
use crate::models::PdfPages;
use crate::parser::{build_table, cleanup_files, OutputFormat};
use clap::{Arg, ArgAction, ArgMatches, Command};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{info, warn};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

fn output_arg() -> Arg<'static> {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("Spreadsheet to write (.xlsx, .parquet or .csv), overwritten if present")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn dir_arg() -> Arg<'static> {
    Arg::new("dir")
        .short('d')
        .long("dir")
        .help("Download directory the table is built from")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn all_pages_arg() -> Arg<'static> {
    Arg::new("all_pages")
        .long("all-pages")
        .help("Keep the text of every PDF page instead of the first one only")
        .action(ArgAction::SetTrue)
}

/// Builds the command-line definition.
///
/// Three subcommands share the same pipeline:
/// - `run`: download with the built-in defaults (codes, tags, portal URL), then tabulate
/// - `toml`: same as `run`, with every setting read from a TOML configuration file
/// - `parse`: tabulate an existing download directory without starting a browser
pub fn build_command() -> Command<'static> {
    Command::new("portal-harvest")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("run")
                .about("Download the files of each access code and build the spreadsheet")
                .after_help("Uses the built-in portal URL and download tags.\nThe spreadsheet covers every .txt/.pdf file in the download directory,\nincluding files kept from earlier runs with other codes.\nExample:\n  portal-harvest run -c 98465 -c 321465 -o simple-energy.xlsx")
                .arg(
                    Arg::new("code")
                        .short('c')
                        .long("code")
                        .help("Access code to submit (repeatable, replaces the default list)")
                        .action(ArgAction::Append),
                )
                .arg(output_arg())
                .arg(dir_arg())
                .arg(all_pages_arg())
                .arg(
                    Arg::new("headful")
                        .long("headful")
                        .help("Show the browser window while downloading")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("chrome")
                        .long("chrome")
                        .help("Path to the Chrome/Chromium executable")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("cleanup")
                        .long("cleanup")
                        .help("Delete the downloaded files after the spreadsheet is written")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Build the spreadsheet from already downloaded files")
                .arg(dir_arg())
                .arg(output_arg())
                .arg(all_pages_arg()),
        )
}

/// Parses command-line arguments and executes the selected subcommand.
///
/// `run` and `toml` execute the full workflow:
/// 1. Validates the configuration
/// 2. Downloads the files of every access code through a Chromium session
/// 3. Reads the downloaded text/PDF files and writes the sorted spreadsheet
/// 4. Deletes the downloads if cleanup is enabled
///
/// `parse` only performs step 3.
///
/// # Errors
///
/// Returns the first error of any stage; nothing is written after a failed download.
pub async fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => {
            let config = run_config(sub);
            let mut portal = ChromiumPortal::new(&config);
            run_workflow(&mut portal, &config).await?;
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .expect("config is required");

            let config = ResolvedConfig::from_toml_file(config_path)?;
            let mut portal = ChromiumPortal::new(&config);
            run_workflow(&mut portal, &config).await?;
        }
        Some(("parse", sub)) => {
            let config = parse_config(sub);
            build_table_blocking(&config).await?;
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

/// Applies `run` flags on top of the default configuration.
fn run_config(sub: &ArgMatches) -> ResolvedConfig {
    let mut config = ResolvedConfig::default();
    if let Some(codes) = sub.get_many::<String>("code") {
        config.codes = codes.cloned().collect();
    }
    if let Some(output) = sub.get_one::<PathBuf>("output") {
        config.output_path = output.clone();
    }
    if let Some(dir) = sub.get_one::<PathBuf>("dir") {
        config.download_dir = dir.clone();
    }
    if let Some(chrome) = sub.get_one::<PathBuf>("chrome") {
        config.chrome_executable = Some(chrome.clone());
    }
    if sub.get_flag("all_pages") {
        config.pdf_pages = PdfPages::All;
    }
    if sub.get_flag("headful") {
        config.headless = false;
    }
    if sub.get_flag("cleanup") {
        config.cleanup = true;
    }
    config
}

/// Applies `parse` flags on top of the default configuration.
fn parse_config(sub: &ArgMatches) -> ResolvedConfig {
    let mut config = ResolvedConfig::default();
    if let Some(dir) = sub.get_one::<PathBuf>("dir") {
        config.download_dir = dir.clone();
    }
    if let Some(output) = sub.get_one::<PathBuf>("output") {
        config.output_path = output.clone();
    }
    if sub.get_flag("all_pages") {
        config.pdf_pages = PdfPages::All;
    }
    config
}

/// Downloads every code through `portal`, then builds and writes the table.
///
/// # Returns
///
/// The sorted table written to `config.output_path`.
pub async fn run_workflow<P: Portal + ?Sized>(
    portal: &mut P,
    config: &ResolvedConfig,
) -> AppResult<DataFrame> {
    config.validate()?;
    OutputFormat::from_path(&config.output_path)?;

    print_run_info(config);

    let downloaded = download_codes(portal, config).await?;

    info!("Starting table phase");
    let df = build_table_blocking(config).await?;

    if df.height() != downloaded.len() {
        warn!(
            downloaded = downloaded.len(),
            rows = df.height(),
            download_dir = %config.download_dir.display(),
            "Table includes files not downloaded by this run"
        );
    }

    cleanup_files(&downloaded, config.cleanup).await?;

    info!(
        codes = config.codes.len(),
        files = downloaded.len(),
        rows = df.height(),
        "All operations completed successfully"
    );

    Ok(df)
}

/// Runs the synchronous table build off the async runtime.
async fn build_table_blocking(config: &ResolvedConfig) -> AppResult<DataFrame> {
    let dir = config.download_dir.clone();
    let output = config.output_path.clone();
    let pdf_pages = config.pdf_pages;

    tokio::task::spawn_blocking(move || build_table(&dir, &output, pdf_pages))
        .await
        .map_err(|e| AppError::IoError(format!("Task join error: {e}")))?
}

fn print_run_info(config: &ResolvedConfig) {
    info!(
        portal = config.portal_url.as_str(),
        codes = config.codes.join(", "),
        tasks = config.tags.len(),
        download_dir = %config.download_dir.display(),
        output = %config.output_path.display(),
        "Starting run"
    );
}
