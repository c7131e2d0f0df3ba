//! Loading of SQL statements packaged alongside caller code.
//!
//! By convention each package keeps its statements as plain-text files in
//! an `sql/` subdirectory; callers pass their package root (typically
//! `env!("CARGO_MANIFEST_DIR")`) and the file name.

use std::fs;
use std::path::Path;

use crate::error::SqlValetError;

/// Read `<package_dir>/sql/<file_name>` and return its contents.
///
/// # Errors
/// A missing file propagates the underlying I/O error unchanged.
pub fn sql_from_file(
    package_dir: impl AsRef<Path>,
    file_name: &str,
) -> Result<String, SqlValetError> {
    let path = package_dir.as_ref().join("sql").join(file_name);
    Ok(fs::read_to_string(path)?)
}
