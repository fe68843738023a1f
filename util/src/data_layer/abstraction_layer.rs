use std::path::{Path, PathBuf};

use errors::*;

/// `AbstractionLayer` is the filesystem facility used by a job to read its input and to
/// create and commit its output.
pub trait AbstractionLayer {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> Result<bool>;

    fn is_file(&self, path: &Path) -> Result<bool>;

    /// Creates a single directory. Fails if the directory already exists.
    fn create_dir(&self, path: &Path) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}
