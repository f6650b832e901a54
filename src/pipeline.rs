use log::{error, info, warn};
use reqwest::blocking::Client;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::report::{fetch, transform};
use crate::storage::{self, ObjectStore};
use crate::verify;

/// What a run left behind.
pub struct RunSummary {
    pub status: u16,
    pub raw_file: PathBuf,
    pub raw_key: String,
    pub views_file: PathBuf,
    pub views_key: String,
    pub records: usize,
    pub bucket_created: bool,
}

fn report_check(passed: bool, step: &str) {
    if passed {
        info!("{} completed successfully", step);
    } else {
        warn!("{} needs correction", step);
    }
}

/// Creates the bucket unless it is already listed, then checks it is reachable.
/// Returns whether a bucket was created.
pub fn ensure_bucket(store: &dyn ObjectStore, bucket: &str, region: &str) -> Result<bool> {
    if !verify::verify_bucket_name(bucket) {
        return Err(PipelineError::InvalidBucketName {
            name: bucket.to_string(),
        });
    }

    let created = if store.list_buckets()?.iter().any(|name| name == bucket) {
        info!("Using existing bucket: {}", bucket);
        false
    } else {
        store.create_bucket(bucket, region)?;
        info!("Created new bucket: {}", bucket);
        true
    };

    if let Err(err) = store.head_bucket(bucket) {
        error!("Cannot access bucket: {}", err);
        return Err(err);
    }
    info!("Bucket is accessible");

    return Ok(created);
}

pub fn run(config: &Config, client: &Client, store: &dyn ObjectStore) -> Result<RunSummary> {
    let date = config.date;

    let report = fetch::get(&config.api_base, date, client)?;

    let raw_dir = storage::raw_dir(&config.work_dir);
    storage::create_dir(&raw_dir)?;

    let raw_file = raw_dir.join(storage::raw_file_name(date));
    storage::write_file(&raw_file, &report.body)?;
    info!("Saved raw views to {}", raw_file.display());
    report_check(
        verify::verify_raw_file(&raw_dir, &raw_file, date, &report.body),
        "Saving raw views",
    );

    let bucket_created = ensure_bucket(store, &config.bucket, &config.region)?;

    let raw_key = storage::raw_key(date);
    store.upload_file(&config.bucket, &raw_key, &raw_file)?;
    info!("Uploaded raw views to s3://{}/{}", config.bucket, raw_key);
    report_check(
        verify::verify_raw_upload(store, &config.bucket, &raw_key, &raw_file, date),
        "Uploading raw views",
    );

    let (records, json_lines) = transform::process(&report)?;

    let views_dir = storage::views_dir(&config.work_dir);
    storage::create_dir(&views_dir)?;

    let views_file = views_dir.join(storage::views_file_name(date));
    storage::write_file(&views_file, &json_lines)?;
    report_check(
        verify::verify_views_file(&views_file, records.len()),
        "Writing views",
    );

    let views_key = storage::views_key(date);
    store.upload_file(&config.bucket, &views_key, &views_file)?;
    info!(
        "Uploaded processed data to s3://{}/{}",
        config.bucket, views_key
    );
    report_check(
        verify::verify_views_upload(store, &config.bucket, &views_key, &views_file, date),
        "Uploading views",
    );

    return Ok(RunSummary {
        status: report.status,
        raw_file,
        raw_key,
        views_file,
        views_key,
        records: records.len(),
        bucket_created,
    });
}
