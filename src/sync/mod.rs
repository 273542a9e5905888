// Voice-clone / lip-sync service client
//
// The remote service accepts the source video and the translated script,
// synthesizes the speech with a cloned voice, and renders a lip-synced video
// as an asynchronous job tracked by an opaque job id.

pub mod http;

use async_trait::async_trait;

pub use http::HttpSyncClient;

use crate::error::Result;
use crate::job::{JobRequest, SyncJob};

/// Client for the voice-clone/lip-sync service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// Submit a rendering job for the request's video and the translated
    /// transcript. Returns the opaque job id assigned by the service.
    async fn submit_job(&self, request: &JobRequest, transcript: &str) -> Result<String>;

    /// Query the current state of a previously submitted job.
    async fn job_status(&self, job_id: &str) -> Result<SyncJob>;
}
