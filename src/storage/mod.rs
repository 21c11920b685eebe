//! Object-storage side of the pipeline: the bucket client seam, the S3
//! implementation and the create/delete lifecycle around one bucket.

mod lifecycle;
mod s3;

pub use lifecycle::{
    BucketLifecycle, BucketState, CreationPolicy, CreationReport, DEFAULT_FIXED_DELAY,
    DEFAULT_RETRY_INTERVAL, RetryPolicy,
};
pub use s3::S3BucketClient;

use crate::error::StorageFailure;
use crate::naming::BucketName;
use async_trait::async_trait;

/// Single-attempt operations on one bucket. Retrying is the caller's job.
#[async_trait]
pub trait BucketClient: Send + Sync {
    fn bucket(&self) -> &BucketName;

    async fn create_bucket(&self) -> Result<(), StorageFailure>;

    async fn delete_bucket(&self) -> Result<(), StorageFailure>;
}
