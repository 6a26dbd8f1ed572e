//! Manual folder sync: discover PDFs, upload them one by one and wait for the
//! remote service to finish processing each.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use thiserror::Error;

use crate::config::Config;
use crate::gemini::{FileService, FileState, GeminiError, RemoteFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub path: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Maximum number of status re-fetches; `None` waits forever.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(2), max_attempts: None }
    }
}

impl PollPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        let default = Self::default();
        Self {
            interval: cfg
                .get_u64("POLL_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(default.interval),
            max_attempts: cfg
                .get_u64("POLL_MAX_ATTEMPTS")
                .and_then(|n| u32::try_from(n).ok()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Ready(RemoteFile),
    /// Remote processing ended in FAILED.
    Failed { file_name: String },
    /// Upload or status call raised an error.
    Errored { file_name: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub folder_created: bool,
    pub outcomes: Vec<UploadOutcome>,
}

impl SyncReport {
    /// Handles that finished processing, in discovery order.
    pub fn uploaded(&self) -> Vec<&RemoteFile> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                UploadOutcome::Ready(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.uploaded().len()
    }
}

pub fn is_pdf_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// PDF files directly inside `folder`, sorted by file name.
pub fn discover(folder: &Path) -> io::Result<Vec<UploadCandidate>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !is_pdf_name(&file_name) || !entry.file_type()?.is_file() {
            continue;
        }
        out.push(UploadCandidate { path: entry.path(), file_name });
    }
    out.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(out)
}

#[derive(Debug, Error)]
enum PollError {
    #[error("{0}")]
    Remote(#[from] GeminiError),
    #[error("still {} after {attempts} status checks", state.as_str())]
    Exhausted { attempts: u32, state: FileState },
}

async fn upload_and_wait<S>(
    service: &S,
    candidate: &UploadCandidate,
    poll: PollPolicy,
) -> Result<RemoteFile, PollError>
where
    S: FileService + ?Sized,
{
    let mut file = service.upload_file(&candidate.path, &candidate.file_name).await?;

    print!("{}", "⏳ Processing".dimmed());
    let _ = io::stdout().flush();
    let mut attempts = 0u32;
    while file.state.is_processing() {
        if poll.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(PollError::Exhausted { attempts, state: file.state });
        }
        print!(".");
        let _ = io::stdout().flush();
        tokio::time::sleep(poll.interval).await;
        attempts += 1;
        file = service.get_file(&file.name).await?;
        tracing::debug!(name = %file.name, state = file.state.as_str(), attempts, "polled file state");
    }
    Ok(file)
}

fn classify(file_name: &str, file: RemoteFile) -> UploadOutcome {
    match file.state {
        FileState::Failed => UploadOutcome::Failed { file_name: file_name.to_string() },
        FileState::Active => UploadOutcome::Ready(file),
        _ => {
            tracing::warn!(file = file_name, state = file.state.as_str(), "unexpected terminal state, treating as ready");
            UploadOutcome::Ready(file)
        }
    }
}

/// Upload every PDF in `folder`, strictly one after another.
///
/// A missing folder is created and yields an empty report. Errors for a single
/// file are recorded in its outcome and never abort the batch.
pub async fn sync_manuals<S>(service: &S, folder: &Path, poll: PollPolicy) -> Result<SyncReport>
where
    S: FileService + ?Sized,
{
    if !folder.exists() {
        fs::create_dir_all(folder)
            .with_context(|| format!("failed to create {}", folder.display()))?;
        tracing::info!(folder = %folder.display(), "manuals folder created");
        return Ok(SyncReport { folder_created: true, outcomes: Vec::new() });
    }

    let candidates = discover(folder)
        .with_context(|| format!("failed to list {}", folder.display()))?;
    tracing::info!(folder = %folder.display(), count = candidates.len(), "manuals discovered");
    println!("🚀 Uploading manuals...");

    let mut report = SyncReport::default();
    for candidate in &candidates {
        println!("📤 Uploading: {}...", candidate.file_name);
        let outcome = match upload_and_wait(service, candidate, poll).await {
            Ok(file) => classify(&candidate.file_name, file),
            Err(e) => {
                tracing::error!(file = %candidate.file_name, error = %e, "upload failed");
                UploadOutcome::Errored { file_name: candidate.file_name.clone(), message: e.to_string() }
            }
        };
        match &outcome {
            UploadOutcome::Ready(file) => {
                println!("\n{} {} ready. URI: {}", "✅".green(), candidate.file_name, file.uri)
            }
            UploadOutcome::Failed { file_name } => {
                println!("\n{} {}", "❌ Processing failed:".red(), file_name)
            }
            UploadOutcome::Errored { file_name, message } => {
                println!("\n{} {}: {}", "❌ Upload failed:".red(), file_name, message)
            }
        }
        report.outcomes.push(outcome);
    }
    Ok(report)
}
