//! S3 object store. The SDK is async only, so each call is driven to
//! completion on a private current-thread runtime.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use log::debug;
use std::path::Path;
use tokio::runtime::{Builder, Runtime};

use crate::error::{PipelineError, Result};
use crate::storage::ObjectStore;

// S3 rejects an explicit constraint for its default region
const DEFAULT_S3_REGION: &str = "us-east-1";

pub struct S3ObjectStore {
    client: Client,
    runtime: Runtime,
}

fn sdk_error<E: std::error::Error>(operation: &str, err: E) -> PipelineError {
    PipelineError::object_store(operation, DisplayErrorContext(err).to_string())
}

impl S3ObjectStore {
    /// Uses the ambient AWS credentials chain.
    pub fn new(region: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| PipelineError::object_store("runtime", err.to_string()))?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );
        let client = Client::new(&sdk_config);

        Ok(Self { client, runtime })
    }
}

impl ObjectStore for S3ObjectStore {
    fn list_buckets(&self) -> Result<Vec<String>> {
        let output = self
            .runtime
            .block_on(self.client.list_buckets().send())
            .map_err(|err| sdk_error("list_buckets", err))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(|name| name.to_string()))
            .collect())
    }

    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        self.runtime
            .block_on(request.send())
            .map_err(|err| sdk_error("create_bucket", err))?;

        Ok(())
    }

    fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.runtime
            .block_on(self.client.head_bucket().bucket(bucket).send())
            .map_err(|err| sdk_error("head_bucket", err))?;

        Ok(())
    }

    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        self.runtime.block_on(async {
            let body = ByteStream::from_path(path)
                .await
                .map_err(|err| sdk_error("upload_file", err))?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|err| sdk_error("upload_file", err))?;

            debug!("PUT s3://{}/{} from {}", bucket, key, path.display());
            Ok::<(), PipelineError>(())
        })
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        let result = self
            .runtime
            .block_on(self.client.head_object().bucket(bucket).key(key).send());

        match result {
            Ok(output) => Ok(Some(output.content_length().unwrap_or(0).max(0) as u64)),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|service_err| service_err.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(None)
                } else {
                    Err(sdk_error("head_object", err))
                }
            }
        }
    }
}
