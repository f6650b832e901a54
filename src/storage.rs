use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

pub mod local;
pub mod s3;

pub const RAW_DIR: &str = "raw-views";
pub const RAW_PREFIX: &str = "datalake/raw/";
pub const VIEWS_PREFIX: &str = "datalake/views/";

/// Blocking access to a bucket/key blob store.
pub trait ObjectStore {
    fn list_buckets(&self) -> Result<Vec<String>>;

    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;

    /// Errors unless the bucket exists and is reachable.
    fn head_bucket(&self, bucket: &str) -> Result<()>;

    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;

    /// Size in bytes, or `None` if there is no such object.
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>>;
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn raw_file_name(date: NaiveDate) -> String {
    format!("raw-views-{}.txt", day(date))
}

pub fn views_file_name(date: NaiveDate) -> String {
    format!("views-{}.json", day(date))
}

pub fn raw_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(RAW_DIR)
}

pub fn views_dir(work_dir: &Path) -> PathBuf {
    work_dir.join("data").join("views")
}

pub fn raw_key(date: NaiveDate) -> String {
    format!("{}{}", RAW_PREFIX, raw_file_name(date))
}

pub fn views_key(date: NaiveDate) -> String {
    format!("{}{}", VIEWS_PREFIX, views_file_name(date))
}

pub fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|err| PipelineError::file_io(dir.display().to_string(), err))?;
    info!("Created directory {}", dir.display());
    Ok(())
}

/// Overwrites `path` with exactly `content`.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|err| PipelineError::file_io(path.display().to_string(), err))
}

pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|err| PipelineError::file_io(path.display().to_string(), err))
}
