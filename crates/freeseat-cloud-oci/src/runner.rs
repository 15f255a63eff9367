//! CLI process execution
//!
//! The provider shells out to the `oci` CLI; this trait is the seam that
//! lets tests inject canned outputs instead of spawning processes.

use std::process::Stdio;

use async_trait::async_trait;

use crate::error::{OciError, Result};

/// Captured result of one CLI invocation
#[derive(Debug, Clone)]
pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CliRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CliOutput>;
}

/// Production runner backed by tokio process spawning
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCliRunner;

#[async_trait]
impl CliRunner for TokioCliRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CliOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    OciError::CliNotFound
                } else {
                    OciError::Io(err)
                }
            })?;

        Ok(CliOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
