//! Result artifact files
//!
//! A human-readable artifact is always left on disk describing what
//! happened, success or failure, so an operator never has to parse logs to
//! learn the outcome.

use std::path::{Path, PathBuf};

use freeseat_core::{InstanceSnapshot, ProviderError};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

pub const INSTANCE_CREATED_FILE: &str = "INSTANCE_CREATED";
pub const UNHANDLED_ERROR_FILE: &str = "UNHANDLED_ERROR.log";
pub const IMAGE_LIST_FILE: &str = "images_list.json";

/// Writes run artifacts into one directory
#[derive(Debug, Clone)]
pub struct FileRecorder {
    dir: PathBuf,
}

impl FileRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append the instance details block to `INSTANCE_CREATED`
    pub async fn write_instance_details(&self, instance: &InstanceSnapshot) -> Result<()> {
        let details = format!(
            "Instance ID: {}\nDisplay Name: {}\nAvailability Domain: {}\nShape: {}\nState: {}\n\n",
            instance.id,
            instance.display_name,
            instance.availability_domain,
            instance.shape,
            instance.lifecycle_state,
        );
        self.append(INSTANCE_CREATED_FILE, &details).await
    }

    /// Append a note that a launch was accepted before the listing caught up
    pub async fn write_pending_note(&self) -> Result<()> {
        let note = "Launch accepted; the instance was not visible in the listing yet. \
                    Re-run to record its details.\n\n";
        self.append(INSTANCE_CREATED_FILE, note).await
    }

    /// Overwrite `UNHANDLED_ERROR.log` with the classified error payload
    pub async fn write_failure(&self, error: &ProviderError) -> Result<()> {
        let status = error
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let body = format!(
            "The run ended on an unhandled provider error.\n\n\
             status: {status}\ncode: {}\nmessage: {}\n\n\
             Fix the cause and re-run freeseat; an existing instance is never duplicated.\n",
            error.code, error.message,
        );
        tokio::fs::write(self.dir.join(UNHANDLED_ERROR_FILE), body).await?;
        Ok(())
    }

    /// Overwrite `images_list.json` with the filtered image candidates
    pub async fn write_image_list(&self, images: &serde_json::Value) -> Result<()> {
        let body = serde_json::to_string_pretty(images)?;
        tokio::fs::write(self.dir.join(IMAGE_LIST_FILE), body).await?;
        Ok(())
    }

    async fn append(&self, file_name: &str, data: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file_name))
            .await?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
