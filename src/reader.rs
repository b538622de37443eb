//! Reading annotation sources from disk.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Checks that every path exists.
///
/// # Errors
///
/// Returns [`Error::MissingFiles`] listing all missing paths, in input order.
pub fn check_files<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    let missing: Vec<PathBuf> = paths
        .iter()
        .filter_map(|path| {
            let path: &Path = path.as_ref();
            (!path.exists()).then(|| path.to_path_buf())
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingFiles(missing))
    }
}

/// Reads every file and joins the contents with a newline, in input order.
///
/// # Errors
///
/// Returns [`Error::ReadError`] for the first file that cannot be read as UTF-8 text.
pub fn read_files<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let contents = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            debug!("Reading {}", path.display());
            fs::read_to_string(path).map_err(|source| Error::ReadError {
                file: path.to_path_buf(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(contents.join("\n"))
}
