//! Per-invocation scratch directory

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const WORK_DIR_PREFIX: &str = "commonforms_";
pub const INPUT_FILE_NAME: &str = "input.pdf";
pub const OUTPUT_FILE_NAME: &str = "output.pdf";

/// Uniquely named directory holding `input.pdf` and `output.pdf` for one
/// invocation.
///
/// Call [`WorkDir::release`] when done; dropping the value removes the
/// directory as well, so early returns and panics do not leak it.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl WorkDir {
    /// Create a new work directory under `root`, or under the system temp
    /// directory when `root` is `None`.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORK_DIR_PREFIX);

        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| Error::WorkDir { source })?;

        let input_path = dir.path().join(INPUT_FILE_NAME);
        let output_path = dir.path().join(OUTPUT_FILE_NAME);

        tracing::debug!(path = %dir.path().display(), "Created work directory");

        Ok(Self {
            dir,
            input_path,
            output_path,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the decoded request PDF to `input.pdf`
    pub fn write_input(&self, data: &[u8]) -> Result<()> {
        std::fs::write(&self.input_path, data)?;
        Ok(())
    }

    /// Read the PDF produced by the conversion routine
    pub fn read_output(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.output_path)?)
    }

    /// Remove the directory and everything in it. Failures are logged and
    /// otherwise ignored.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove work directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(Some(root.path())).unwrap();

        assert!(work_dir.path().is_dir());
        assert!(work_dir.path().starts_with(root.path()));
        let name = work_dir.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(WORK_DIR_PREFIX));
        assert_eq!(work_dir.input_path(), work_dir.path().join("input.pdf"));
        assert_eq!(work_dir.output_path(), work_dir.path().join("output.pdf"));
    }

    #[test]
    fn test_unique_per_invocation() {
        let root = tempfile::tempdir().unwrap();
        let first = WorkDir::create(Some(root.path())).unwrap();
        let second = WorkDir::create(Some(root.path())).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_release_removes_files() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(Some(root.path())).unwrap();
        work_dir.write_input(b"%PDF-1.7").unwrap();
        std::fs::write(work_dir.output_path(), b"%PDF-1.7 filled").unwrap();
        let path = work_dir.path().to_path_buf();

        work_dir.release();

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let work_dir = WorkDir::create(Some(root.path())).unwrap();
            work_dir.write_input(b"%PDF-1.7").unwrap();
            work_dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(Some(root.path())).unwrap();
        std::fs::remove_dir_all(work_dir.path()).unwrap();

        work_dir.release();
    }

    #[test]
    fn test_read_output_missing() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(Some(root.path())).unwrap();
        assert!(matches!(work_dir.read_output(), Err(Error::Io(_))));
    }

    #[test]
    fn test_create_in_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        let result = WorkDir::create(Some(&missing));
        assert!(matches!(result, Err(Error::WorkDir { .. })));
    }
}
