use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{BabelsyncError, Result};
use crate::job::ResultRecord;

/// Persistent record of completed runs, one JSON file holding a list of
/// records keyed by job id. Writes go through a temp file in the same
/// directory followed by a rename, so a crashed writer can never leave the
/// file half-written, and the read-modify-write cycle holds an advisory
/// lock on a sibling `.lock` file so concurrent writers cannot drop each
/// other's records.
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty store, not an error.
    pub async fn load(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<ResultRecord> = serde_json::from_str(&content)?;
        Ok(records)
    }

    /// Look up a record by job id.
    pub async fn get(&self, job_id: &str) -> Result<Option<ResultRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|record| record.job_id == job_id))
    }

    /// Insert or replace the record for its job id. Records for other job
    /// ids are preserved, including those written by concurrent runs.
    pub async fn upsert(&self, record: ResultRecord) -> Result<()> {
        let path = self.path.clone();
        let total = tokio::task::spawn_blocking(move || upsert_blocking(&path, record))
            .await
            .map_err(|e| BabelsyncError::Io(std::io::Error::other(e)))??;

        info!(
            "Recorded {} result(s) in {}",
            total,
            self.path.display()
        );
        Ok(())
    }
}

/// The whole read-modify-write cycle, run on the blocking pool with the
/// store lock held.
fn upsert_blocking(path: &Path, record: ResultRecord) -> Result<usize> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    // Released when lock_file drops at the end of this function.
    lock_file.lock_exclusive()?;

    let mut records: Vec<ResultRecord> = if path.exists() {
        serde_json::from_str(&fs::read_to_string(path)?)?
    } else {
        Vec::new()
    };

    match records
        .iter_mut()
        .find(|existing| existing.job_id == record.job_id)
    {
        Some(existing) => {
            debug!("Replacing existing result record for job {}", record.job_id);
            *existing = record;
        }
        None => records.push(record),
    }

    write_atomic(path, &parent, &records)?;
    Ok(records.len())
}

fn write_atomic(path: &Path, parent: &Path, records: &[ResultRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(records)?;

    let temp = NamedTempFile::new_in(parent)?;
    fs::write(temp.path(), content)?;
    temp.persist(path).map_err(|e| BabelsyncError::Io(e.error))?;

    Ok(())
}
