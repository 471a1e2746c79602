use crate::constants::{TABLE_COLUMNS, XLSX_MAX_CELL_CHARS};
use crate::errors::{AppError, AppResult};
use crate::models::{FileKind, PdfPages, Row};
use crate::utils::{file_name_str, format_duration, kb_from_bytes, truncate_chars};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::content::read_content;
use super::file_finder::list_files;
use super::file_name::parse_file_name;

/// Spreadsheet formats the table can be exported to, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("parquet") => Ok(Self::Parquet),
            Some("csv") => Ok(Self::Csv),
            _ => Err(AppError::InvalidInput(format!(
                "Unsupported output file {} (expected .xlsx, .parquet or .csv)",
                path.display()
            ))),
        }
    }
}

/// Reads every `.txt` then every `.pdf` file in `dir` into table rows.
///
/// Metadata comes from the file name (see [`parse_file_name`](super::parse_file_name)),
/// content from [`read_content`](super::read_content). Rows are returned in
/// discovery order: text files first, then PDFs, each sorted by file name.
///
/// # Errors
///
/// Fails on the first unreadable directory, malformed file name or unreadable file.
pub fn collect_rows(dir: &Path, pdf_pages: PdfPages) -> AppResult<Vec<Row>> {
    let mut rows = Vec::new();

    for kind in FileKind::ALL {
        let files = list_files(dir, kind)?;
        info!(kind = %kind, files = files.len(), "Reading files");

        for path in files {
            let meta = parse_file_name(file_name_str(&path)?)?;
            let content = read_content(&path, meta.kind, pdf_pages)?;
            debug!(
                file = %path.display(),
                code = meta.code.as_str(),
                chars = content.chars().count(),
                "Read file"
            );
            rows.push(Row::new(meta, content));
        }
    }

    Ok(rows)
}

/// Converts rows into a DataFrame with the `code, archive, source, content` schema.
///
/// An empty input yields a zero-row frame with the same four string columns.
pub fn rows_to_dataframe(rows: Vec<Row>) -> AppResult<DataFrame> {
    let len = rows.len();
    let mut codes = Vec::with_capacity(len);
    let mut archives = Vec::with_capacity(len);
    let mut sources = Vec::with_capacity(len);
    let mut contents = Vec::with_capacity(len);

    for row in rows {
        codes.push(row.code);
        archives.push(row.archive);
        sources.push(row.source);
        contents.push(row.content);
    }

    let [code, archive, source, content] = TABLE_COLUMNS;
    DataFrame::new(vec![
        Series::new(code, codes),
        Series::new(archive, archives),
        Series::new(source, sources),
        Series::new(content, contents),
    ])
    .map_err(|e| AppError::TableError(format!("Failed to create DataFrame: {e}")))
}

/// Sorts the table by `code`, then `source`, keeping discovery order on ties.
pub fn sort_table(df: &DataFrame) -> AppResult<DataFrame> {
    df.sort(
        ["code", "source"],
        SortMultipleOptions::default().with_maintain_order(true),
    )
    .map_err(|e| AppError::TableError(format!("Failed to sort table: {e}")))
}

/// Writes the table to `path`, overwriting any existing file.
///
/// The format follows the extension (see [`OutputFormat`]). Parent directories
/// are created as needed.
pub fn write_table(df: &mut DataFrame, path: &Path) -> AppResult<()> {
    let format = OutputFormat::from_path(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::IoError(format!(
                "Failed to create output directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    match format {
        OutputFormat::Xlsx => write_xlsx(df, path),
        OutputFormat::Parquet => {
            let mut file = create_file(path)?;
            ParquetWriter::new(&mut file)
                .finish(df)
                .map_err(|e| AppError::TableError(format!("Failed to write Parquet file: {e}")))?;
            Ok(())
        }
        OutputFormat::Csv => {
            let mut file = create_file(path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .map_err(|e| AppError::TableError(format!("Failed to write CSV file: {e}")))
        }
    }
}

fn create_file(path: &Path) -> AppResult<File> {
    File::create(path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output file {}: {e}",
            path.display()
        ))
    })
}

fn write_xlsx(df: &DataFrame, path: &Path) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in TABLE_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string(0, col, *name)?;

        let values = df.column(name)?.str()?;
        for (idx, value) in values.into_iter().enumerate() {
            let row = idx as u32 + 1;
            let value = value.unwrap_or("");
            let cell = truncate_chars(value, XLSX_MAX_CELL_CHARS);
            if cell.len() < value.len() {
                warn!(
                    column = *name,
                    row = row,
                    chars = value.chars().count(),
                    "Cell exceeds spreadsheet limit, truncating"
                );
            }
            worksheet.write_string(row, col, cell.as_ref())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Builds the output table from the files in `dir` and writes it to `output`.
///
/// Collects rows, sorts them by `(code, source)` and exports the result. The
/// output is only written once every file has been read, so a failure leaves
/// no partial spreadsheet behind.
///
/// # Returns
///
/// The sorted table that was written.
pub fn build_table(dir: &Path, output: &Path, pdf_pages: PdfPages) -> AppResult<DataFrame> {
    // Reject an unsupported output before reading anything
    OutputFormat::from_path(output)?;

    let start = Instant::now();
    info!(dir = %dir.display(), "Starting table build");

    let rows = collect_rows(dir, pdf_pages)?;
    let row_count = rows.len();
    if row_count == 0 {
        warn!(dir = %dir.display(), "No .txt or .pdf files found");
    }

    let df = rows_to_dataframe(rows)?;
    let mut df = sort_table(&df)?;
    write_table(&mut df, output)?;

    let size = fs::metadata(output).map(|m| m.len()).map_err(|e| {
        AppError::IoError(format!(
            "Failed to read output metadata {}: {e}",
            output.display()
        ))
    })?;

    info!(
        rows = row_count,
        output = %output.display(),
        output_size_kb = kb_from_bytes(size),
        elapsed = format_duration(start.elapsed()),
        "Table written"
    );

    Ok(df)
}
