use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::error::{BabelsyncError, Result};
use crate::job::{JobRequest, JobStatus, SyncJob};
use crate::sync::SyncApi;

const SERVICE_NAME: &str = "sync";

/// Job submission body for the generation endpoint.
#[derive(Debug, Clone, Serialize)]
struct GenerationRequest {
    video_url: String,
    script: String,
    model: String,
    tts_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<String>,
    sync_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    segment_secs: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerationResponse {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusResponse {
    id: String,
    status: String,
    #[serde(default)]
    output_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the voice-clone/lip-sync service.
pub struct HttpSyncClient {
    client: Client,
    config: SyncConfig,
}

impl HttpSyncClient {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn generations_url(&self) -> String {
        format!(
            "{}/v2/generations",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn status_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.generations_url(), job_id)
    }
}

#[async_trait]
impl SyncApi for HttpSyncClient {
    async fn submit_job(&self, request: &JobRequest, transcript: &str) -> Result<String> {
        let body = GenerationRequest {
            video_url: request.video_url.clone(),
            script: transcript.to_string(),
            model: self.config.lipsync_model.clone(),
            tts_model: self.config.tts_model.clone(),
            voice_id: request
                .voice_id
                .clone()
                .or_else(|| self.config.voice_id.clone()),
            sync_mode: self.config.sync_mode.as_str().to_string(),
            segment_secs: request
                .segment
                .map(|segment| [segment.start_secs, segment.end_secs]),
        };

        let url = self.generations_url();
        debug!("Submitting sync job to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BabelsyncError::remote(SERVICE_NAME, format!("submission failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BabelsyncError::remote(
                SERVICE_NAME,
                format!("{}: {}", status, error_text),
            ));
        }

        let generation: GenerationResponse = response.json().await.map_err(|e| {
            BabelsyncError::remote(SERVICE_NAME, format!("failed to parse response: {}", e))
        })?;

        if generation.id.trim().is_empty() {
            return Err(BabelsyncError::remote(
                SERVICE_NAME,
                "submission returned an empty job id",
            ));
        }

        info!("Sync job submitted with id: {}", generation.id);
        Ok(generation.id)
    }

    async fn job_status(&self, job_id: &str) -> Result<SyncJob> {
        let url = self.status_url(job_id);
        debug!("Querying sync job status: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                BabelsyncError::remote(SERVICE_NAME, format!("status query failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BabelsyncError::remote(
                SERVICE_NAME,
                format!("{}: {}", status, error_text),
            ));
        }

        let status_response: StatusResponse = response.json().await.map_err(|e| {
            BabelsyncError::remote(SERVICE_NAME, format!("failed to parse status: {}", e))
        })?;

        Ok(SyncJob {
            id: status_response.id,
            status: JobStatus::parse(&status_response.status)?,
            output_url: status_response.output_url,
            failure_reason: status_response.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::job::SegmentRange;

    fn test_client() -> HttpSyncClient {
        let mut config = Config::default().sync;
        config.endpoint = "https://api.example.com/".to_string();
        HttpSyncClient::new(config).unwrap()
    }

    #[test]
    fn test_status_url() {
        let client = test_client();
        assert_eq!(
            client.status_url("job-42"),
            "https://api.example.com/v2/generations/job-42"
        );
    }

    #[test]
    fn test_generation_request_includes_segment_window() {
        let mut request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        request.segment = Some(SegmentRange {
            start_secs: 1.5,
            end_secs: 9.0,
        });

        let body = GenerationRequest {
            video_url: request.video_url.clone(),
            script: "Hola".to_string(),
            model: "lipsync-2".to_string(),
            tts_model: "eleven_multilingual_v2".to_string(),
            voice_id: None,
            sync_mode: "bounce".to_string(),
            segment_secs: request.segment.map(|s| [s.start_secs, s.end_secs]),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["segment_secs"][0], 1.5);
        assert_eq!(json["segment_secs"][1], 9.0);
        assert!(json.get("voice_id").is_none());
    }

    #[test]
    fn test_status_response_maps_to_sync_job() {
        let raw = r#"{"id": "job-42", "status": "COMPLETED", "output_url": "https://example/out.mp4"}"#;
        let parsed: StatusResponse = serde_json::from_str(raw).unwrap();
        let job = SyncJob {
            id: parsed.id,
            status: JobStatus::parse(&parsed.status).unwrap(),
            output_url: parsed.output_url,
            failure_reason: parsed.error,
        };
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output_url.as_deref(), Some("https://example/out.mp4"));
        assert!(job.failure_reason.is_none());
    }

    fn client_for(server: &mockito::ServerGuard) -> HttpSyncClient {
        let mut config = Config::default().sync;
        config.endpoint = server.url();
        config.api_key = "sk-456".to_string();
        HttpSyncClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_submit_job_returns_job_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/generations")
            .match_header("authorization", "Bearer sk-456")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "job-9"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let job_id = client.submit_job(&request, "Hola mundo").await.unwrap();

        assert_eq!(job_id, "job-9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_job_error_status_maps_to_remote_service() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/generations")
            .with_status(422)
            .with_body("script rejected")
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let err = client.submit_job(&request, "Hola mundo").await.unwrap_err();

        assert!(matches!(err, BabelsyncError::RemoteService { .. }));
        let message = err.to_string();
        assert!(message.contains("422"));
        assert!(message.contains("script rejected"));
    }

    #[tokio::test]
    async fn test_submit_job_rejects_blank_job_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/generations")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "  "}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let err = client.submit_job(&request, "Hola mundo").await.unwrap_err();

        assert!(matches!(err, BabelsyncError::RemoteService { .. }));
        assert!(err.to_string().contains("empty job id"));
    }

    #[tokio::test]
    async fn test_job_status_maps_failure_reason() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/generations/job-9")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "job-9", "status": "FAILED", "error": "face not detected"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let job = client.job_status("job-9").await.unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.failure_reason.as_deref(), Some("face not detected"));
    }

    #[tokio::test]
    async fn test_job_status_error_status_maps_to_remote_service() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/generations/job-missing")
            .with_status(404)
            .with_body("no such generation")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.job_status("job-missing").await.unwrap_err();

        assert!(matches!(err, BabelsyncError::RemoteService { .. }));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("no such generation"));
    }
}
