use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a video and lip-sync the result
    Run {
        /// URL of the source video
        #[arg(long)]
        video_url: String,

        /// Target language for the translated speech
        #[arg(short, long)]
        target_lang: String,

        /// Source language hint (detected automatically when omitted)
        #[arg(short, long)]
        source_lang: Option<String>,

        /// Voice to clone for the generated speech
        #[arg(long)]
        voice_id: Option<String>,

        /// Audio fitting mode: loop, bounce, cut_off, silence, remap
        #[arg(long)]
        sync_mode: Option<String>,

        /// Start of the video window to process, in seconds
        #[arg(long)]
        segment_start: Option<f64>,

        /// End of the video window to process, in seconds
        #[arg(long)]
        segment_end: Option<f64>,
    },

    /// Query the current status of a sync job
    Status {
        /// Job id returned when the job was submitted
        #[arg(short, long)]
        job_id: String,
    },

    /// Inspect recorded run results
    Results {
        #[command(subcommand)]
        action: ResultsAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ResultsAction {
    /// List all recorded results
    List,

    /// Show the result for a single job
    Show {
        /// Job id to look up
        #[arg(short, long)]
        job_id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "babelsync.toml")]
        path: PathBuf,
    },

    /// Print the effective configuration
    Show,
}
