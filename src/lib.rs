//! Babelsync - Automated Video Translation and Lip-Sync Workflow
//!
//! Orchestrates two remote services to produce a translated, lip-synced video
//! from a source video URL and a target language: a transcription/translation
//! service that returns the translated transcript, and a voice-clone/lip-sync
//! service whose asynchronous rendering job is polled to completion. Each
//! completed run is recorded in a local JSON results file.

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod poll;
pub mod store;
pub mod sync;
pub mod translate;
pub mod workflow;
