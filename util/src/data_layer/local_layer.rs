use std::fs::{self, DirEntry, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use errors::*;

use data_layer::abstraction_layer::AbstractionLayer;

// LocalAbstractionLayer handles data interaction on the local file system.
#[derive(Default)]
pub struct LocalAbstractionLayer;

impl LocalAbstractionLayer {
    pub fn new() -> Self {
        LocalAbstractionLayer
    }

    fn open_file(&self, path: &Path) -> Result<File> {
        debug!("Opening file: {}", path.to_string_lossy());
        File::open(&path).chain_err(|| format!("unable to open file {:?}", path))
    }
}

impl AbstractionLayer for LocalAbstractionLayer {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        debug!("Reading file: {:?}", path);

        let mut file = self.open_file(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .chain_err(|| format!("Error reading file {:?}", path))?;

        Ok(bytes)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        debug!("Writing file: {}", path.to_string_lossy());
        let mut file = File::create(&path).chain_err(|| format!("unable to create file {:?}", path))?;

        file.write_all(data)
            .chain_err(|| format!("unable to write content to {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(path).chain_err(|| format!("Unable to read directory {:?}", path))?;
        let mut pathbufs: Vec<PathBuf> = vec![];
        for entry in entries {
            let entry: DirEntry = entry.chain_err(|| "Error reading directory entry")?;
            pathbufs.push(entry.path())
        }
        pathbufs.sort();
        Ok(pathbufs)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.exists())
    }

    fn is_file(&self, path: &Path) -> Result<bool> {
        Ok(path.is_file())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        debug!("Creating directory: {:?}", path);
        fs::create_dir(path).chain_err(|| format!("Unable to create directory {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        debug!("Creating directories: {:?}", path);
        fs::create_dir_all(path).chain_err(|| "Unable to create directories")
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        debug!("Renaming {:?} to {:?}", from, to);
        fs::rename(from, to).chain_err(|| format!("Unable to rename {:?} to {:?}", from, to))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        debug!("Removing directory: {:?}", path);
        fs::remove_dir_all(path).chain_err(|| format!("Unable to remove directory {:?}", path))
    }
}
