use std::fmt::Display;
use std::path::{Path, PathBuf};

use util::data_layer::AbstractionLayer;

use errors::*;
use serialise::{output_part_name, serialise_records};

/// Name of the marker file written into a committed output directory.
pub const SUCCESS_MARKER: &str = "_SUCCESS";
const STAGING_PREFIX: &str = "_temporary-";

/// `OutputCommitter` writes the output of a job so that it appears all at once or not at all.
///
/// Parts are written into a staging directory next to the output directory, which is renamed
/// into place on `commit`. `abort` removes the staging directory.
pub struct OutputCommitter<'a> {
    data_layer: &'a dyn AbstractionLayer,
    output_dir: PathBuf,
    staging_dir: PathBuf,
}

impl<'a> OutputCommitter<'a> {
    /// Creates a committer for `output_dir`.
    ///
    /// Returns an `OutputCollision` error if the output directory or its staging directory
    /// already exists.
    pub fn new(data_layer: &'a dyn AbstractionLayer, output_dir: &Path) -> Result<Self> {
        let dir_name = output_dir
            .file_name()
            .chain_err(|| format!("Output path {:?} has no directory name", output_dir))?;
        let mut staging_name = STAGING_PREFIX.to_owned();
        staging_name.push_str(&dir_name.to_string_lossy());
        let staging_dir = output_dir.with_file_name(staging_name);

        let committer = OutputCommitter {
            data_layer,
            output_dir: output_dir.to_path_buf(),
            staging_dir,
        };
        committer.check_collision(&committer.output_dir)?;
        committer.check_collision(&committer.staging_dir)?;

        Ok(committer)
    }

    fn check_collision(&self, path: &Path) -> Result<()> {
        if self.data_layer.exists(path)? {
            return Err(ErrorKind::OutputCollision(path.to_string_lossy().into_owned()).into());
        }
        Ok(())
    }

    /// Creates the staging directory, and any missing parent of the output directory.
    pub fn setup(&self) -> Result<()> {
        if let Some(parent) = self.staging_dir.parent() {
            self.data_layer
                .create_dir_all(parent)
                .chain_err(|| "Unable to create output root")?;
        }
        self.data_layer.create_dir(&self.staging_dir).chain_err(|| {
            ErrorKind::OutputCollision(self.staging_dir.to_string_lossy().into_owned())
        })
    }

    /// Writes the records of one reduce partition to the staging directory.
    pub fn write_part<K: Display, V: Display>(&self, partition: u64, pairs: &[(K, V)]) -> Result<()> {
        let part_path = self.staging_dir.join(output_part_name(partition));
        debug!("Writing {} records to {:?}", pairs.len(), part_path);

        self.data_layer
            .write_file(&part_path, serialise_records(pairs).as_bytes())
            .chain_err(|| format!("Unable to write output part {}", partition))?;
        Ok(())
    }

    /// Marks the staged output as complete and moves it to the output directory.
    pub fn commit(&self) -> Result<()> {
        self.data_layer
            .write_file(&self.staging_dir.join(SUCCESS_MARKER), &[])
            .chain_err(|| "Unable to write success marker")?;

        self.check_collision(&self.output_dir)?;
        self.data_layer
            .rename(&self.staging_dir, &self.output_dir)
            .chain_err(|| "Unable to commit job output")?;

        info!("Committed output to {:?}", self.output_dir);
        Ok(())
    }

    /// Removes anything staged so far. Never touches the output directory.
    pub fn abort(&self) {
        match self.data_layer.exists(&self.staging_dir) {
            Ok(true) => {
                if let Err(err) = self.data_layer.remove_dir_all(&self.staging_dir) {
                    warn!("Unable to remove staging directory {:?}: {}", self.staging_dir, err);
                }
            }
            Ok(false) => {}
            Err(err) => warn!("Unable to check staging directory {:?}: {}", self.staging_dir, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use util::data_layer::LocalAbstractionLayer;

    fn test_dir(name: &str) -> PathBuf {
        let path = env::temp_dir().join("wordcount-output").join(name);
        if path.exists() {
            fs::remove_dir_all(&path).unwrap();
        }
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn commit_moves_parts_into_place() {
        let dir = test_dir("commit_moves_parts_into_place");
        let output_dir = dir.join("output").join("run-1");
        let layer = LocalAbstractionLayer::new();

        let committer = OutputCommitter::new(&layer, &output_dir).unwrap();
        committer.setup().unwrap();
        committer
            .write_part(0, &[("cat".to_owned(), 1u64), ("the".to_owned(), 2u64)])
            .unwrap();
        assert!(!output_dir.exists());

        committer.commit().unwrap();

        assert!(!committer.staging_dir.exists());
        assert!(output_dir.join(SUCCESS_MARKER).is_file());
        assert_eq!(
            "cat\t1\nthe\t2\n",
            fs::read_to_string(output_dir.join("part-r-00000")).unwrap()
        );
    }

    #[test]
    fn existing_output_is_a_collision() {
        let dir = test_dir("existing_output_is_a_collision");
        let output_dir = dir.join("run-1");
        fs::create_dir_all(&output_dir).unwrap();
        let layer = LocalAbstractionLayer::new();

        match OutputCommitter::new(&layer, &output_dir) {
            Err(err) => match *err.kind() {
                ErrorKind::OutputCollision(_) => {}
                ref kind => panic!("unexpected error kind: {:?}", kind),
            },
            Ok(_) => panic!("expected an output collision"),
        }
    }

    #[test]
    fn abort_removes_staged_parts() {
        let dir = test_dir("abort_removes_staged_parts");
        let output_dir = dir.join("run-1");
        let layer = LocalAbstractionLayer::new();

        let committer = OutputCommitter::new(&layer, &output_dir).unwrap();
        committer.setup().unwrap();
        committer.write_part(0, &[("dog".to_owned(), 3u64)]).unwrap();
        committer.abort();

        assert!(!committer.staging_dir.exists());
        assert!(!output_dir.exists());
    }
}
