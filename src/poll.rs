use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::PollConfig;
use crate::error::{BabelsyncError, Result};
use crate::job::JobStatus;
use crate::sync::SyncApi;

/// Wait-then-query schedule for an in-flight sync job. The interval is fixed;
/// the attempt budget bounds the total wait so a stuck job cannot hang a run
/// forever.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }
}

/// Poll a sync job until it reaches a terminal state. Returns the output
/// video URL on completion.
///
/// The cancellation token is honored both between queries and during the
/// inter-query wait, so an aborted run stops promptly instead of sleeping
/// out its interval.
pub async fn poll_job(
    api: &dyn SyncApi,
    job_id: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<String> {
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(BabelsyncError::Cancelled);
        }

        let job = api.job_status(job_id).await?;
        debug!(
            "Sync job {} status after attempt {}/{}: {:?}",
            job_id, attempt, policy.max_attempts, job.status
        );

        match job.status {
            JobStatus::Completed => {
                let output_url = job
                    .output_url
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        BabelsyncError::remote(
                            "sync",
                            format!("job {} completed without an output URL", job_id),
                        )
                    })?;
                info!("Sync job {} completed: {}", job_id, output_url);
                return Ok(output_url);
            }
            JobStatus::Failed => {
                let reason = job
                    .failure_reason
                    .unwrap_or_else(|| "unspecified".to_string());
                return Err(BabelsyncError::JobFailed {
                    job_id: job_id.to_string(),
                    reason,
                });
            }
            JobStatus::Queued | JobStatus::Processing => {
                if attempt < policy.max_attempts {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(BabelsyncError::Cancelled),
                        _ = tokio::time::sleep(policy.interval) => {}
                    }
                }
            }
        }
    }

    Err(BabelsyncError::JobTimeout {
        job_id: job_id.to_string(),
        attempts: policy.max_attempts,
    })
}
