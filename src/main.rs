use config::Config;
use log::{error, info};
use reqwest::blocking::Client;
use std::{env, process};
use storage::local::LocalObjectStore;
use storage::s3::S3ObjectStore;
use storage::ObjectStore;

extern crate log;
extern crate pretty_env_logger;

mod config;
mod error;
mod pipeline;
mod report;
mod storage;
mod verify;

fn init_logger() {
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| String::from("info"));
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

fn try_main() -> error::Result<pipeline::RunSummary> {
    let config = Config::from_env()?;
    info!(
        "Processing top page views for {}",
        config.date.format("%Y-%m-%d")
    );

    let store: Box<dyn ObjectStore> = match &config.local_store {
        Some(root) => {
            info!("Using local object store at {}", root.display());
            Box::new(LocalObjectStore::new(root))
        }
        None => Box::new(S3ObjectStore::new(&config.region)?),
    };

    let client = Client::builder().build()?;

    pipeline::run(&config, &client, store.as_ref())
}

fn main() {
    dotenvy::dotenv().ok();
    init_logger();

    match try_main() {
        Ok(summary) => {
            info!(
                "Done: status={} records={} bucket_created={}",
                summary.status, summary.records, summary.bucket_created
            );
            info!("  {} -> {}", summary.raw_file.display(), summary.raw_key);
            info!("  {} -> {}", summary.views_file.display(), summary.views_key);
        }
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}
