use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::job::{JobRequest, ResultRecord};
use crate::poll::{poll_job, PollPolicy};
use crate::store::ResultStore;
use crate::sync::{HttpSyncClient, SyncApi};
use crate::translate::{HttpTranslationClient, TranslationApi};

/// Translation job orchestrator. Runs the linear pipeline: validate the
/// request, fetch the translated transcript, submit the lip-sync job, poll it
/// to completion, and persist the result record.
pub struct Workflow {
    config: Config,
    translation: Box<dyn TranslationApi>,
    sync: Box<dyn SyncApi>,
    store: ResultStore,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate_credentials()?;

        let translation = Box::new(HttpTranslationClient::new(config.translate.clone())?);
        let sync = Box::new(HttpSyncClient::new(config.sync.clone())?);
        let store = ResultStore::new(&config.results.path);

        Ok(Self {
            config,
            translation,
            sync,
            store,
        })
    }

    /// Construct a workflow over caller-supplied clients.
    pub fn with_clients(
        config: Config,
        translation: Box<dyn TranslationApi>,
        sync: Box<dyn SyncApi>,
    ) -> Self {
        let store = ResultStore::new(&config.results.path);
        Self {
            config,
            translation,
            sync,
            store,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Execute one translation run end to end. Returns the persisted result
    /// record on success; every failure propagates as an error for the
    /// caller to surface.
    pub async fn run(
        &self,
        request: JobRequest,
        cancel: &CancellationToken,
    ) -> Result<ResultRecord> {
        request.validate()?;

        info!(
            "Starting translation run: {} -> {}",
            request.video_url, request.target_language
        );

        let translation = self.translation.translate(&request).await?;
        info!("Transcript translated to {}", request.target_language);

        let job_id = self.sync.submit_job(&request, &translation.transcript).await?;

        let policy = PollPolicy::from_config(&self.config.poll);
        let output_video_url = poll_job(self.sync.as_ref(), &job_id, &policy, cancel).await?;

        let mut record = ResultRecord::new(&job_id, &output_video_url);
        record.video_url = Some(request.video_url.clone());
        record.target_language = Some(request.target_language.clone());
        record.source_language = request
            .source_language
            .clone()
            .or(translation.detected_source_language.clone());
        record.transcript = Some(translation.transcript.clone());
        record.lipsync_model = Some(self.config.sync.lipsync_model.clone());
        record.sync_mode = Some(self.config.sync.sync_mode.as_str().to_string());
        record.created_at = Some(Utc::now());

        self.store.upsert(record.clone()).await?;

        info!(
            "Translation run completed: job {} -> {}",
            job_id, output_video_url
        );
        Ok(record)
    }
}
