use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{BabelsyncError, Result};
use crate::job::{JobRequest, TranslationResult};
use crate::translate::TranslationApi;

const SERVICE_NAME: &str = "translation";

/// Request body for the combined transcription+translation endpoint.
#[derive(Debug, Clone, Serialize)]
struct TranslateRequest {
    video_url: String,
    target_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<String>,
    transcription_model: String,
    translation_model: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslateResponse {
    transcript: String,
    #[serde(default)]
    detected_language: Option<String>,
}

/// HTTP client for the transcription/translation service.
pub struct HttpTranslationClient {
    client: Client,
    config: TranslateConfig,
}

impl HttpTranslationClient {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1/video-translations",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TranslationApi for HttpTranslationClient {
    async fn translate(&self, request: &JobRequest) -> Result<TranslationResult> {
        let body = TranslateRequest {
            video_url: request.video_url.clone(),
            target_language: request.target_language.clone(),
            source_language: request.source_language.clone(),
            transcription_model: self.config.transcription_model.clone(),
            translation_model: self.config.translation_model.clone(),
        };

        let url = self.endpoint_url();
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BabelsyncError::remote(SERVICE_NAME, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BabelsyncError::remote(
                SERVICE_NAME,
                format!("{}: {}", status, error_text),
            ));
        }

        let translate_response: TranslateResponse = response.json().await.map_err(|e| {
            BabelsyncError::remote(SERVICE_NAME, format!("failed to parse response: {}", e))
        })?;

        let transcript = translate_response.transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(BabelsyncError::remote(
                SERVICE_NAME,
                "empty transcript received",
            ));
        }

        info!(
            "Received translated transcript ({} chars) for language '{}'",
            transcript.len(),
            request.target_language
        );

        Ok(TranslationResult {
            transcript,
            detected_source_language: translate_response.detected_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_endpoint_url_strips_trailing_slash() {
        let mut config = Config::default().translate;
        config.endpoint = "https://api.example.com/".to_string();
        let client = HttpTranslationClient::new(config).unwrap();
        assert_eq!(
            client.endpoint_url(),
            "https://api.example.com/v1/video-translations"
        );
    }

    #[test]
    fn test_request_body_omits_missing_source_language() {
        let body = TranslateRequest {
            video_url: "https://example.com/in.mp4".to_string(),
            target_language: "Spanish".to_string(),
            source_language: None,
            transcription_model: "whisper-1".to_string(),
            translation_model: "gpt-3.5-turbo".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("source_language").is_none());
        assert_eq!(json["target_language"], "Spanish");
    }

    #[test]
    fn test_response_parses_without_detected_language() {
        let raw = r#"{"transcript": "Hola mundo"}"#;
        let parsed: TranslateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.transcript, "Hola mundo");
        assert!(parsed.detected_language.is_none());
    }

    fn client_for(server: &mockito::ServerGuard) -> HttpTranslationClient {
        let mut config = Config::default().translate;
        config.endpoint = server.url();
        config.api_key = "tk-123".to_string();
        HttpTranslationClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_translate_success_returns_transcript() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/video-translations")
            .match_header("authorization", "Bearer tk-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"transcript": "Hola mundo", "detected_language": "en"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let result = client.translate(&request).await.unwrap();

        assert_eq!(result.transcript, "Hola mundo");
        assert_eq!(result.detected_source_language.as_deref(), Some("en"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_translate_error_status_maps_to_remote_service() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/video-translations")
            .with_status(503)
            .with_body("model overloaded")
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let err = client.translate(&request).await.unwrap_err();

        assert!(matches!(err, BabelsyncError::RemoteService { .. }));
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_translate_blank_transcript_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/video-translations")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"transcript": "   "}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = JobRequest::new("https://example.com/in.mp4", "Spanish");
        let err = client.translate(&request).await.unwrap_err();

        assert!(matches!(err, BabelsyncError::RemoteService { .. }));
        assert!(err.to_string().contains("empty transcript"));
    }
}
