use anyhow::{Context, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions scanned when none are configured
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directory names never descended into
const SKIPPED_DIRS: [&str; 2] = ["node_modules", "target"];

/// File scanner for collecting annotated source files under a directory.
///
/// The `FileScanner` recursively walks the root directory and keeps every file whose
/// extension is in its list. It skips hidden directories (those starting with `.`),
/// `node_modules` and `target`.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extensions: Vec<String>,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Matching files, sorted by path
    pub source_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a scanner for `root_path` using [`DEFAULT_EXTENSIONS`].
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the extension list. Leading dots are ignored (`.js` and `js` are the same).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Scans the directory tree and collects the matching files.
    ///
    /// Entries that cannot be accessed are logged and recorded in
    /// [`ScanResult::warnings`]; scanning continues past them.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an accessible directory.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = self
            .root_path
            .metadata()
            .with_context(|| format!("Cannot access {}", self.root_path.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("{} is not a directory", self.root_path.display());
        }

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = e.file_type().is_dir() && SKIPPED_DIRS.contains(&file_name.as_ref());

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && self.matches(path) {
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        source_files.sort();

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}
