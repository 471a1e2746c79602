use crate::constants::TAG_SEPARATOR;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Kind of file the portal hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Txt,
    Pdf,
}

impl FileKind {
    /// Every kind, in the order rows are collected.
    pub const ALL: [FileKind; 2] = [FileKind::Txt, FileKind::Pdf];

    /// Returns the lower-case file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileKind {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported file extension '{other}' (expected 'txt' or 'pdf')"
            ))),
        }
    }
}

/// How much of a PDF ends up in the `content` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPages {
    /// Only the first page (the portal's one-page reports)
    #[default]
    First,
    /// Every page, in document order
    All,
}

/// One link to click on the portal page and the file it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// 1-based index of the outer `div` under `body`
    pub container: u32,
    /// 1-based index of the inner `div` holding the link
    pub link: u32,
    /// Number embedded in the downloaded file name
    pub file_id: u32,
    pub kind: FileKind,
}

impl DownloadTask {
    /// Decodes a tag of the form `container|link|file_id|extension`, e.g. `2|3|1|pdf`.
    pub fn from_tag(tag: &str) -> AppResult<Self> {
        let fields: Vec<&str> = tag.split(TAG_SEPARATOR).map(str::trim).collect();
        if fields.len() != 4 {
            return Err(AppError::InvalidInput(format!(
                "Download tag '{tag}' must have 4 '{TAG_SEPARATOR}'-separated fields, found {}",
                fields.len()
            )));
        }

        let index = |name: &str, value: &str| -> AppResult<u32> {
            let parsed: u32 = value.parse().map_err(|e| {
                AppError::InvalidInput(format!(
                    "Download tag '{tag}': invalid {name} '{value}': {e}"
                ))
            })?;
            if parsed == 0 {
                return Err(AppError::InvalidInput(format!(
                    "Download tag '{tag}': {name} must be 1 or greater"
                )));
            }
            Ok(parsed)
        };

        Ok(Self {
            container: index("container index", fields[0])?,
            link: index("link index", fields[1])?,
            file_id: index("file id", fields[2])?,
            kind: fields[3].parse()?,
        })
    }

    /// XPath of the download link on the portal page.
    pub fn xpath(&self) -> String {
        format!("/html/body/div[{}]/div[{}]/a", self.container, self.link)
    }

    /// Name the browser gives the downloaded file, e.g. `arquivo1-98465.txt`.
    pub fn file_name(&self, prefix: &str, code: &str) -> String {
        format!("{prefix}{}-{code}.{}", self.file_id, self.kind)
    }
}

/// Metadata recovered from a downloaded file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub code: String,
    pub archive: String,
    pub kind: FileKind,
}

/// One line of the output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub code: String,
    pub archive: String,
    pub source: String,
    pub content: String,
}

impl Row {
    pub fn new(meta: FileMeta, content: String) -> Self {
        Self {
            code: meta.code,
            archive: meta.archive,
            source: meta.kind.to_string(),
            content,
        }
    }
}
