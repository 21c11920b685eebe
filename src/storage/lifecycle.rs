use super::BucketClient;
use crate::error::{ProvisionError, Result};
use crate::naming::BucketName;
use log::{debug, info, warn};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_FIXED_DELAY: Duration = Duration::from_secs(5);

/// Retry schedule for bucket creation. With no bound set it retries until
/// the bucket exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    /// Upper bound on the time spent retrying, measured from the first attempt.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    fn allows_another(&self, attempts: u32, elapsed: Duration) -> bool {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return false;
        }
        if self
            .deadline
            .is_some_and(|deadline| elapsed + self.interval > deadline)
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationPolicy {
    /// Attempt immediately and retry every failure on a fixed interval.
    Retry(RetryPolicy),
    /// Wait once for the new credential to propagate, then attempt once.
    FixedDelay(Duration),
}

impl Default for CreationPolicy {
    fn default() -> Self {
        CreationPolicy::Retry(RetryPolicy::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    NotCreated,
    Creating,
    Created,
    Deleted,
}

impl fmt::Display for BucketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketState::NotCreated => write!(f, "not created"),
            BucketState::Creating => write!(f, "being created"),
            BucketState::Created => write!(f, "created"),
            BucketState::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationReport {
    pub attempts: u32,
    /// Wall-clock time from the first attempt to success.
    pub elapsed: Duration,
}

/// Drives one bucket through `NotCreated -> Creating -> Created -> Deleted`.
pub struct BucketLifecycle<C> {
    client: C,
    state: BucketState,
}

impl<C: BucketClient> BucketLifecycle<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: BucketState::NotCreated,
        }
    }

    pub fn state(&self) -> BucketState {
        self.state
    }

    pub fn bucket(&self) -> &BucketName {
        self.client.bucket()
    }

    /// Creates the bucket according to `policy`. Waits between attempts end
    /// early with [`ProvisionError::Cancelled`] once `shutdown` completes.
    pub async fn create<S>(&mut self, policy: &CreationPolicy, shutdown: S) -> Result<CreationReport>
    where
        S: Future<Output = ()>,
    {
        self.expect_state(BucketState::NotCreated, "create it")?;
        self.state = BucketState::Creating;

        let result = match policy {
            CreationPolicy::Retry(retry) => self.create_with_retry(retry, shutdown).await,
            CreationPolicy::FixedDelay(delay) => self.create_after_delay(*delay, shutdown).await,
        };

        self.state = match &result {
            Ok(_) => BucketState::Created,
            Err(_) => BucketState::NotCreated,
        };
        result
    }

    async fn create_with_retry<S>(&self, policy: &RetryPolicy, shutdown: S) -> Result<CreationReport>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let started = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("creating bucket [{}], attempt {}", self.bucket(), attempts);

            let failure = match self.client.create_bucket().await {
                Ok(()) => {
                    return Ok(CreationReport {
                        attempts,
                        elapsed: started.elapsed(),
                    });
                }
                Err(failure) => failure,
            };
            warn!(
                "attempt {} to create bucket [{}] failed: {}",
                attempts,
                self.bucket(),
                failure
            );

            if !policy.allows_another(attempts, started.elapsed()) {
                return Err(ProvisionError::RetriesExhausted {
                    bucket: self.bucket().to_string(),
                    attempts,
                    last: failure,
                });
            }

            tokio::select! {
                _ = &mut shutdown => {
                    return Err(ProvisionError::Cancelled {
                        bucket: self.bucket().to_string(),
                        attempts,
                    });
                }
                _ = sleep(policy.interval) => {}
            }
        }
    }

    async fn create_after_delay<S>(&self, delay: Duration, shutdown: S) -> Result<CreationReport>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("waiting {:?} before creating bucket [{}]", delay, self.bucket());
        tokio::select! {
            _ = &mut shutdown => {
                return Err(ProvisionError::Cancelled {
                    bucket: self.bucket().to_string(),
                    attempts: 0,
                });
            }
            _ = sleep(delay) => {}
        }

        let started = Instant::now();
        self.client
            .create_bucket()
            .await
            .map_err(ProvisionError::TransientStorage)?;
        Ok(CreationReport {
            attempts: 1,
            elapsed: started.elapsed(),
        })
    }

    /// Deletes the bucket. One attempt; on failure the bucket stays `Created`.
    pub async fn delete(&mut self) -> Result<()> {
        self.expect_state(BucketState::Created, "delete it")?;
        self.client
            .delete_bucket()
            .await
            .map_err(ProvisionError::FatalStorage)?;
        self.state = BucketState::Deleted;
        info!("bucket [{}] deleted", self.bucket());
        Ok(())
    }

    fn expect_state(&self, expected: BucketState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ProvisionError::InvalidState {
                bucket: self.bucket().to_string(),
                state: self.state.to_string(),
                operation,
            })
        }
    }
}
