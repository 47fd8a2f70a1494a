//! Temporary files created for one trainer or tagger run.

use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::warn;

use crfprep_core::Result;

/// Owns the temporary files of a single run.
///
/// The files are removed when the value is dropped, on success and on every
/// error path alike. With `unlink` disabled they are left on disk instead.
pub struct TempArtifacts {
    dir: Option<PathBuf>,
    unlink: bool,
    paths: Vec<TempPath>,
}

impl TempArtifacts {
    /// Files go to `dir`, or the system temp dir when `None`.
    pub fn new(dir: Option<PathBuf>, unlink: bool) -> Self {
        Self {
            dir,
            unlink,
            paths: Vec::new(),
        }
    }

    /// Create a `<prefix>XXXX.txt` file holding `contents`.
    pub fn create(&mut self, prefix: &str, contents: &[u8]) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".txt");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents)?;
        file.flush()?;

        let path = file.into_temp_path();
        let owned = path.to_path_buf();
        self.paths.push(path);
        Ok(owned)
    }

    /// Create an empty file for an external program to write into.
    pub fn reserve(&mut self, prefix: &str) -> Result<PathBuf> {
        self.create(prefix, b"")
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.paths.iter().map(Deref::deref).collect()
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            if self.unlink {
                let shown = path.display().to_string();
                if let Err(e) = path.close() {
                    warn!(path = %shown, error = %e, "failed to remove temporary file");
                }
            } else {
                match path.keep() {
                    Ok(kept) => warn!(path = %kept.display(), "keeping temporary file"),
                    Err(e) => warn!(error = %e, "failed to keep temporary file"),
                }
            }
        }
    }
}
