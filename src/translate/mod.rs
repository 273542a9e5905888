// Translation service client
//
// The remote service transcribes the source video's speech and translates the
// transcript into the target language in one synchronous call. The trait seam
// exists so the workflow can be exercised against mock clients in tests.

pub mod http;

use async_trait::async_trait;

pub use http::HttpTranslationClient;

use crate::error::Result;
use crate::job::{JobRequest, TranslationResult};

/// Client for the transcription/translation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// Transcribe and translate the request's video. Blocks until the remote
    /// returns the translated transcript or a terminal failure; no automatic
    /// retry beyond the HTTP client's own behavior.
    async fn translate(&self, request: &JobRequest) -> Result<TranslationResult>;
}
