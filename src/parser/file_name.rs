use crate::constants::FILE_NAME_REGEX_PATTERN;
use crate::errors::{AppError, AppResult};
use crate::models::{FileKind, FileMeta};
use regex::Regex;
use std::sync::OnceLock;

/// Cached regex for `{archive}-{code}.{ext}` file names.
static FILE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Recovers `(code, archive, kind)` from a downloaded file name.
///
/// `arquivo1-98465.txt` yields code `98465`, archive `arquivo1` and kind `txt`.
///
/// # Errors
///
/// Returns `FileNameError` naming the file and what is wrong with it when the
/// name does not have exactly one `-` and one `.`, or the extension is neither
/// `txt` nor `pdf`.
pub fn parse_file_name(name: &str) -> AppResult<FileMeta> {
    let regex = FILE_NAME_REGEX.get_or_init(|| {
        Regex::new(FILE_NAME_REGEX_PATTERN)
            .expect("FILE_NAME_REGEX_PATTERN is a valid regex pattern")
    });

    let invalid = |reason: &str| AppError::FileNameError {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let Some(caps) = regex.captures(name) else {
        let reason = if !name.contains('-') {
            "missing '-' between archive and code"
        } else if !name.contains('.') {
            "missing extension"
        } else if name.matches('-').count() > 1 || name.matches('.').count() > 1 {
            "more than one '-' or '.'"
        } else {
            "empty archive, code or extension"
        };
        return Err(invalid(reason));
    };

    let kind: FileKind = caps[3]
        .parse()
        .map_err(|_| invalid(&format!("unsupported extension '{}'", &caps[3])))?;

    Ok(FileMeta {
        code: caps[2].to_string(),
        archive: caps[1].to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_txt_name() {
        let meta = parse_file_name("arquivo1-98465.txt").unwrap();
        assert_eq!(meta.code, "98465");
        assert_eq!(meta.archive, "arquivo1");
        assert_eq!(meta.kind, FileKind::Txt);
        assert_eq!(meta.kind.to_string(), "txt");
    }

    #[test]
    fn test_parse_pdf_name_uppercase_extension() {
        let meta = parse_file_name("arquivo2-321465.PDF").unwrap();
        assert_eq!(meta.code, "321465");
        assert_eq!(meta.archive, "arquivo2");
        assert_eq!(meta.kind, FileKind::Pdf);
    }

    #[test]
    fn test_missing_dash() {
        match parse_file_name("arquivo1.txt") {
            Err(AppError::FileNameError { name, reason }) => {
                assert_eq!(name, "arquivo1.txt");
                assert!(reason.contains("'-'"));
            }
            other => panic!("Expected FileNameError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_extension() {
        let err = parse_file_name("arquivo1-98465").unwrap_err();
        assert!(err.to_string().contains("missing extension"));
    }

    #[test]
    fn test_extra_separators() {
        let err = parse_file_name("arquivo1-98465-2.txt").unwrap_err();
        assert!(err.to_string().contains("more than one"));

        let err = parse_file_name("arquivo1-98465.tar.txt").unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_empty_parts() {
        assert!(parse_file_name("-98465.txt").is_err());
        assert!(parse_file_name("arquivo1-.txt").is_err());
        assert!(parse_file_name("arquivo1-98465.").is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_file_name("arquivo1-98465.docx").unwrap_err();
        assert!(matches!(err, AppError::FileNameError { .. }));
        assert!(err.to_string().contains("unsupported extension 'docx'"));
    }
}
