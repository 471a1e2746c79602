use crate::errors::{AppError, AppResult};
use crate::models::{FileKind, PdfPages};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Reads the text content of a downloaded file.
///
/// - `Txt`: the whole file. Bytes that are not valid UTF-8 are replaced and a
///   warning is logged.
/// - `Pdf`: the text of the first page, or of every page when `pdf_pages` is
///   [`PdfPages::All`].
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read and `ParseError` if a PDF
/// cannot be loaded, has no pages or its text cannot be extracted.
pub fn read_content(path: &Path, kind: FileKind, pdf_pages: PdfPages) -> AppResult<String> {
    match kind {
        FileKind::Txt => read_text(path),
        FileKind::Pdf => read_pdf(path, pdf_pages),
    }
}

fn read_text(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::IoError(format!("Failed to read text file {}: {e}", path.display()))
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                file = %path.display(),
                valid_up_to = e.utf8_error().valid_up_to(),
                "Text file is not valid UTF-8, replacing invalid bytes"
            );
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

fn read_pdf(path: &Path, pdf_pages: PdfPages) -> AppResult<String> {
    let doc = Document::load(path).map_err(|e| {
        AppError::ParseError(format!("Failed to load PDF {}: {e}", path.display()))
    })?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let selected: &[u32] = match (pdf_pages, page_numbers.first()) {
        (_, None) => {
            return Err(AppError::ParseError(format!(
                "PDF {} has no pages",
                path.display()
            )))
        }
        (PdfPages::First, Some(_)) => &page_numbers[..1],
        (PdfPages::All, Some(_)) => &page_numbers,
    };

    if pdf_pages == PdfPages::First && page_numbers.len() > 1 {
        debug!(
            file = %path.display(),
            pages = page_numbers.len(),
            "Keeping first PDF page only"
        );
    }

    doc.extract_text(selected).map_err(|e| {
        AppError::ParseError(format!(
            "Failed to extract text from PDF {}: {e}",
            path.display()
        ))
    })
}
