//! Babelsync - Automated Video Translation and Lip-Sync Workflow
//!
//! Main entry point. Wires the CLI onto the workflow: a `run` executes the
//! full translate -> lip-sync -> poll -> record pipeline against the remote
//! services; the remaining commands inspect job status, recorded results, and
//! configuration.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use babelsync::cli::{Args, Commands, ConfigAction, ResultsAction};
use babelsync::config::{Config, SyncMode};
use babelsync::error::BabelsyncError;
use babelsync::job::{JobRequest, SegmentRange};
use babelsync::store::ResultStore;
use babelsync::sync::{HttpSyncClient, SyncApi};
use babelsync::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Commands::Run {
            video_url,
            target_lang,
            source_lang,
            voice_id,
            sync_mode,
            segment_start,
            segment_end,
        } => {
            if let Some(mode) = sync_mode {
                config.sync.sync_mode = SyncMode::parse(&mode)?;
            }

            let mut request = JobRequest::new(video_url, target_lang);
            request.source_language = source_lang;
            request.voice_id = voice_id;
            request.segment = build_segment(segment_start, segment_end)?;

            let workflow = Workflow::new(config)?;

            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling run");
                    ctrl_c_token.cancel();
                }
            });

            let spinner = run_spinner();
            let result = workflow.run(request, &cancel).await;
            spinner.finish_and_clear();

            let record = result?;
            println!("Job ID:      {}", record.job_id);
            println!("Output URL:  {}", record.output_video_url);
        }
        Commands::Status { job_id } => {
            config.sync.validate_api_key()?;
            let client = HttpSyncClient::new(config.sync)?;
            let job = client.job_status(&job_id).await?;

            println!("Job ID:  {}", job.id);
            println!("Status:  {:?}", job.status);
            if let Some(url) = job.output_url {
                println!("Output:  {}", url);
            }
            if let Some(reason) = job.failure_reason {
                println!("Reason:  {}", reason);
            }
        }
        Commands::Results { action } => {
            let store = ResultStore::new(&config.results.path);

            match action {
                ResultsAction::List => {
                    let records = store.load().await?;

                    if records.is_empty() {
                        println!("No recorded results in {}", store.path().display());
                    } else {
                        println!("{:<30} {:<12} {:<50}", "Job ID", "Language", "Output URL");
                        println!("{}", "-".repeat(92));
                        for record in records {
                            println!(
                                "{:<30} {:<12} {:<50}",
                                record.job_id,
                                record.target_language.as_deref().unwrap_or("-"),
                                record.output_video_url
                            );
                        }
                    }
                }
                ResultsAction::Show { job_id } => match store.get(&job_id).await? {
                    Some(record) => {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    }
                    None => {
                        println!("No result recorded for job {}", job_id);
                    }
                },
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => {
                Config::default().save_to_file(&path)?;
                println!("Wrote default configuration to {}", path.display());
                println!(
                    "Set the API keys in the file or via the {} / {} environment variables",
                    babelsync::config::ENV_TRANSCRIPTION_API_KEY,
                    babelsync::config::ENV_SYNC_API_KEY
                );
            }
            ConfigAction::Show => {
                // Keys come from the environment or the file; never echo them.
                let mut display = config.clone();
                display.translate.api_key = mask_key(&display.translate.api_key);
                display.sync.api_key = mask_key(&display.sync.api_key);
                print!("{}", toml::to_string_pretty(&display)?);
            }
        },
    }

    info!("Babelsync command completed");
    Ok(())
}

/// Pair the optional segment bounds; either both or neither must be given.
fn build_segment(
    start: Option<f64>,
    end: Option<f64>,
) -> std::result::Result<Option<SegmentRange>, BabelsyncError> {
    match (start, end) {
        (Some(start_secs), Some(end_secs)) => Ok(Some(SegmentRange {
            start_secs,
            end_secs,
        })),
        (None, None) => Ok(None),
        _ => Err(BabelsyncError::InputValidation(
            "segment-start and segment-end must be given together".to_string(),
        )),
    }
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    }
}

/// Spinner shown while a run is in flight; the pipeline can poll for minutes.
fn run_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    spinner.set_message("Translating and lip-syncing");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".babelsync").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "babelsync.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
