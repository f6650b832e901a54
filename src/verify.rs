//! Self-checks run after each pipeline step. They log every check and
//! return false on the first failure instead of raising.

use chrono::NaiveDate;
use log::{error, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::report::transform::ArticleRecord;
use crate::storage::{self, ObjectStore};

pub const BUCKET_SUFFIX: &str = "-wikidata";
const BUCKET_PLACEHOLDER: &str = "<>";
const MIN_BUCKET_STEM: usize = 3;

pub fn verify_raw_file(
    base_dir: &Path,
    file_path: &Path,
    date: NaiveDate,
    content: &str,
) -> bool {
    info!("Checking folder {}...", base_dir.display());
    if !base_dir.is_dir() {
        error!("Required folder does not exist");
        return false;
    }

    info!("Checking file {}...", file_path.display());
    if !file_path.is_file() {
        error!("File does not exist");
        return false;
    }

    let expected_name = storage::raw_file_name(date);
    let name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name != expected_name {
        error!("Incorrect file name. Expected: {}", expected_name);
        return false;
    }
    info!("File name matches expected format: {}", expected_name);

    match fs::read(file_path) {
        Ok(bytes) if bytes == content.as_bytes() => info!("File content matches expected data"),
        Ok(_) => {
            error!("File content does not match expected content");
            return false;
        }
        Err(err) => {
            error!("Error during verification: {}", err);
            return false;
        }
    }

    if !file_path.starts_with(base_dir) {
        error!("File not saved in correct directory");
        return false;
    }
    info!("File is in the correct directory");

    return true;
}

pub fn verify_bucket_name(bucket_name: &str) -> bool {
    info!("Checking bucket name format...");

    if bucket_name.is_empty() || bucket_name == BUCKET_PLACEHOLDER {
        error!("Bucket name cannot be empty or default '{}'", BUCKET_PLACEHOLDER);
        return false;
    }

    let stem = match bucket_name.strip_suffix(BUCKET_SUFFIX) {
        Some(stem) => stem,
        None => {
            error!("Bucket name must end with '{}'", BUCKET_SUFFIX);
            return false;
        }
    };

    if stem.chars().count() < MIN_BUCKET_STEM {
        error!("Bucket name too short (excluding '{}')", BUCKET_SUFFIX);
        return false;
    }

    info!("Bucket name format is correct");
    return true;
}

fn verify_upload(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    local_file: &Path,
    prefix: &str,
    expected_key: &str,
) -> bool {
    info!("Checking if {} exists in bucket {}...", key, bucket);
    let remote_size = match store.head_object(bucket, key) {
        Ok(Some(size)) => size,
        Ok(None) => {
            error!("File not found in bucket");
            return false;
        }
        Err(err) => {
            error!("File not found in bucket: {}", err);
            return false;
        }
    };

    if !key.starts_with(prefix) {
        error!("Incorrect prefix. Must be '{}'", prefix);
        return false;
    }

    let local_size = match storage::file_size(local_file) {
        Ok(size) => size,
        Err(err) => {
            error!("Error during upload verification: {}", err);
            return false;
        }
    };
    if local_size != remote_size {
        error!(
            "File size mismatch between local ({}) and bucket ({})",
            local_size, remote_size
        );
        return false;
    }
    info!("File sizes match: {} bytes", local_size);

    if key != expected_key {
        error!("Incorrect key format. Expected: {}", expected_key);
        return false;
    }

    info!("All upload checks passed for {}", key);
    return true;
}

pub fn verify_raw_upload(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    local_file: &Path,
    date: NaiveDate,
) -> bool {
    verify_upload(
        store,
        bucket,
        key,
        local_file,
        storage::RAW_PREFIX,
        &storage::raw_key(date),
    )
}

pub fn verify_views_upload(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    local_file: &Path,
    date: NaiveDate,
) -> bool {
    verify_upload(
        store,
        bucket,
        key,
        local_file,
        storage::VIEWS_PREFIX,
        &storage::views_key(date),
    )
}

/// The views file holds `expected_count` lines, each a five-field record.
pub fn verify_views_file(file_path: &Path, expected_count: usize) -> bool {
    let content = match fs::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) => {
            error!("Can't read {}: {}", file_path.display(), err);
            return false;
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() != expected_count {
        error!(
            "Expected {} records, found {} lines",
            expected_count,
            lines.len()
        );
        return false;
    }

    for (number, line) in lines.iter().enumerate() {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                error!("Line {} is not valid JSON: {}", number + 1, err);
                return false;
            }
        };

        let fields = value.as_object().map(|object| object.len()).unwrap_or(0);
        if fields != 5 || serde_json::from_value::<ArticleRecord>(value).is_err() {
            error!("Line {} is not an article record", number + 1);
            return false;
        }
    }

    info!("Views file holds {} records", expected_count);
    return true;
}
