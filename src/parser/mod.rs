//! Turning downloaded files into the output table.
//!
//! Files are discovered by extension, described by their names, read as text
//! (first PDF page by default) and exported as one sorted table.

mod cleanup;
mod content;
mod file_finder;
mod file_name;
mod table_writer;

// Re-export public API
pub use cleanup::cleanup_files;
pub use content::read_content;
pub use file_finder::list_files;
pub use file_name::parse_file_name;
pub use table_writer::{
    build_table, collect_rows, rows_to_dataframe, sort_table, write_table, OutputFormat,
};
