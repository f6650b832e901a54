//! Directory-backed object store for offline runs. Buckets are
//! subdirectories of the root, keys are paths inside them.

use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::storage::ObjectStore;

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.bucket_path(bucket).join(key)
    }
}

fn io_error(operation: &str, path: &Path, err: std::io::Error) -> PipelineError {
    PipelineError::object_store(operation, format!("{}: {}", path.display(), err))
}

impl ObjectStore for LocalObjectStore {
    fn list_buckets(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error("list_buckets", &self.root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| io_error("list_buckets", &self.root, err))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        return Ok(names);
    }

    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let path = self.bucket_path(bucket);
        debug!("Creating local bucket {} ({})", path.display(), region);
        fs::create_dir_all(&path).map_err(|err| io_error("create_bucket", &path, err))
    }

    fn head_bucket(&self, bucket: &str) -> Result<()> {
        let path = self.bucket_path(bucket);
        if path.is_dir() {
            Ok(())
        } else {
            Err(PipelineError::object_store(
                "head_bucket",
                format!("no such bucket: {}", bucket),
            ))
        }
    }

    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        self.head_bucket(bucket)?;

        let target = self.object_path(bucket, key);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|err| io_error("upload_file", dir, err))?;
        }
        fs::copy(path, &target).map_err(|err| io_error("upload_file", path, err))?;

        Ok(())
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        let path = self.object_path(bucket, key);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("head_object", &path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_listed_after_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().join("store"));

        assert!(store.list_buckets().unwrap().is_empty());
        assert!(store.head_bucket("abc-wikidata").is_err());

        store.create_bucket("abc-wikidata", "eu-west-1").unwrap();
        store.create_bucket("abc-wikidata", "eu-west-1").unwrap();

        assert_eq!(store.list_buckets().unwrap(), vec!["abc-wikidata"]);
        assert!(store.head_bucket("abc-wikidata").is_ok());
    }

    #[test]
    fn uploaded_objects_report_their_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().join("store"));
        let local = dir.path().join("raw.txt");
        fs::write(&local, "hello").unwrap();

        store.create_bucket("abc-wikidata", "eu-west-1").unwrap();
        assert_eq!(
            store.head_object("abc-wikidata", "datalake/raw/raw.txt").unwrap(),
            None
        );

        store
            .upload_file("abc-wikidata", "datalake/raw/raw.txt", &local)
            .unwrap();

        assert_eq!(
            store.head_object("abc-wikidata", "datalake/raw/raw.txt").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn upload_to_missing_bucket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let local = dir.path().join("raw.txt");
        fs::write(&local, "hello").unwrap();

        let result = store.upload_file("nope-wikidata", "datalake/raw/raw.txt", &local);
        assert!(matches!(result, Err(PipelineError::ObjectStore { .. })));
    }
}
