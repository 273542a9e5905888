use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BabelsyncError, Result};

/// A single translation run as requested by the user. Immutable after
/// submission; one instance per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// URL of the source video
    pub video_url: String,
    /// Language the spoken audio should be translated into
    pub target_language: String,
    /// Source language hint, detected by the remote service when omitted
    pub source_language: Option<String>,
    /// Voice to clone for the generated speech
    pub voice_id: Option<String>,
    /// Optional window of the video to process
    pub segment: Option<SegmentRange>,
}

/// Time window of the source video to process, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl JobRequest {
    pub fn new(video_url: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            target_language: target_language.into(),
            source_language: None,
            voice_id: None,
            segment: None,
        }
    }

    /// Validate the request before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.video_url.trim().is_empty() {
            return Err(BabelsyncError::InputValidation(
                "video URL must not be empty".to_string(),
            ));
        }

        if self.target_language.trim().is_empty() {
            return Err(BabelsyncError::InputValidation(
                "target language must not be empty".to_string(),
            ));
        }

        if let Some(segment) = &self.segment {
            if segment.start_secs < 0.0 {
                return Err(BabelsyncError::InputValidation(format!(
                    "segment start must not be negative (got {})",
                    segment.start_secs
                )));
            }
            if segment.end_secs <= segment.start_secs {
                return Err(BabelsyncError::InputValidation(format!(
                    "segment end ({}) must be after segment start ({})",
                    segment.end_secs, segment.start_secs
                )));
            }
        }

        Ok(())
    }
}

/// Output of the translation service: the transcript already translated into
/// the target language. Consumed immediately by the sync job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub transcript: String,
    pub detected_source_language: Option<String>,
}

/// Lifecycle of a sync job on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Parse a remote status string. The service reports upper-case values
    /// but casing is not guaranteed across API versions.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_uppercase().as_str() {
            "QUEUED" | "PENDING" => Ok(Self::Queued),
            "PROCESSING" | "RUNNING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" | "REJECTED" | "CANCELED" => Ok(Self::Failed),
            other => Err(BabelsyncError::remote(
                "sync",
                format!("unrecognized job status '{}'", other),
            )),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Snapshot of a sync job as reported by one status query.
#[derive(Debug, Clone)]
pub struct SyncJob {
    pub id: String,
    pub status: JobStatus,
    pub output_url: Option<String>,
    pub failure_reason: Option<String>,
}

/// Persisted record of one completed run. Only the job id and output URL are
/// required; the remaining metadata is filled in by the workflow when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub job_id: String,
    pub output_video_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lipsync_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ResultRecord {
    pub fn new(job_id: impl Into<String>, output_video_url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            output_video_url: output_video_url.into(),
            video_url: None,
            target_language: None,
            source_language: None,
            transcript: None,
            lipsync_model: None,
            sync_mode: None,
            created_at: None,
        }
    }
}
