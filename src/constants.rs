// Portal
pub const PORTAL_URL: &str = "https://simpleenergy.com.br/teste/";
pub const CODE_INPUT_SELECTOR: &str = "#codigo";

// Default access codes and download tags (`container|link|file_id|extension`)
pub const DEFAULT_CODES: &[&str] = &["98465", "321465"];
pub const DEFAULT_TAGS: &[&str] = &["2|2|1|txt", "2|3|1|pdf", "3|2|2|txt", "3|3|2|pdf"];
pub const TAG_SEPARATOR: char = '|';

// Files and paths
pub const FILE_PREFIX: &str = "arquivo";
pub const DOWNLOAD_DIR: &str = "data";
pub const OUTPUT_PATH: &str = "simple-energy.xlsx";
pub const FILE_NAME_REGEX_PATTERN: &str = r"^([^-./\\]+)-([^-./\\]+)\.([A-Za-z0-9]+)$";

// Waits
pub const CLICK_TIMEOUT_SECS: u64 = 30;
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 120;
pub const POLL_INTERVAL_MS: u64 = 1000;

// Output table
pub const TABLE_COLUMNS: [&str; 4] = ["code", "archive", "source", "content"];
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

// Browser
pub const CLICK_POLL_MS: u64 = 250;
pub const BROWSER_ARGS: &[&str] = &[
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
];
