//! Upload driver: walks the registration cards one by one and pushes each
//! through the three dynamic-forms calls.
//!
//! Every file runs through an explicit state machine:
//!
//! ```text
//! Pending ──probe──▶ OptionsOk ──upload_document──▶ Uploaded ──upload_mapping──▶ Mapped
//!    │                   │                              │
//!    └───────────────────┴──────────────────────────────┴──────▶ Failed
//! ```
//!
//! # Responsibilities
//! - Resolve each file's property id; files without one are skipped with a warning
//!   and no HTTP call is made for them.
//! - Issue the calls strictly in order, awaiting each before the next.
//! - Isolate failures: an error moves only the current file to `Failed`, and the
//!   driver continues with the next file. Nothing is retried or rolled back.
//!
//! # Navigation
//! - Main entrypoint: [`upload_all`]
//! - Output: [`UploadReport`]

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::contract::{ApiError, DynamicFormsApi, Step};
use crate::inputs::{property_name, PropertyMap};

/// Progress of a single registration card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Pending,
    OptionsOk,
    Uploaded { file_name: String },
    Mapped { file_name: String },
    Failed { step: Step, reason: String },
}

impl FileState {
    /// The call that moves this state forward, or `None` once terminal.
    pub fn next_step(&self) -> Option<Step> {
        match self {
            FileState::Pending => Some(Step::Probe),
            FileState::OptionsOk => Some(Step::UploadDocument),
            FileState::Uploaded { .. } => Some(Step::UploadMapping),
            FileState::Mapped { .. } | FileState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_step().is_none()
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub property_name: String,
    pub property_id: String,
    pub path: PathBuf,
    /// Filename assigned by the server, set once the PDF upload succeeded.
    pub server_file_name: Option<String>,
    pub state: FileState,
}

impl UploadRecord {
    pub fn new(property_name: String, property_id: String, path: PathBuf) -> Self {
        Self {
            property_name,
            property_id,
            path,
            server_file_name: None,
            state: FileState::Pending,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.state, FileState::Mapped { .. })
    }
}

/// A PDF that had no property id in the property map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub property_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub records: Vec<UploadRecord>,
    pub skipped: Vec<SkippedFile>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_mapped()).count()
    }

    pub fn failed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.state, FileState::Failed { .. }))
            .count()
    }
}

/// Process every file in order and report what happened to each.
///
/// Never fails as a whole: per-file errors end up in the report.
pub async fn upload_all<A>(
    api: &A,
    files: &[PathBuf],
    property_map: &PropertyMap,
    mappings: &[Value],
) -> UploadReport
where
    A: DynamicFormsApi + ?Sized,
{
    info!(files = files.len(), "[UPLOAD] Starting registration card upload");
    let mut report = UploadReport::default();

    for path in files {
        let name = property_name(path).unwrap_or_else(|| path.display().to_string());

        let Some(property_id) = property_map.lookup(&name) else {
            warn!(
                property = %name,
                "[UPLOAD] Skipping \"{}\" - no property_id found in property map", name
            );
            report.skipped.push(SkippedFile {
                property_name: name,
                path: path.clone(),
            });
            continue;
        };

        let record = UploadRecord::new(name, property_id.to_string(), path.clone());
        report.records.push(upload_file(api, record, mappings).await);
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped.len(),
        "[UPLOAD] Finished registration card upload"
    );
    report
}

/// Drive one record from its current state to a terminal state.
pub async fn upload_file<A>(api: &A, mut record: UploadRecord, mappings: &[Value]) -> UploadRecord
where
    A: DynamicFormsApi + ?Sized,
{
    info!(
        property = %record.property_name,
        property_id = %record.property_id,
        "[UPLOAD] Processing: {} ({})", record.property_name, record.property_id
    );

    while let Some(step) = record.state.next_step() {
        match advance(api, &record, mappings).await {
            Ok(next) => {
                log_transition(&record, &next);
                if let FileState::Uploaded { file_name } = &next {
                    record.server_file_name = Some(file_name.clone());
                }
                record.state = next;
            }
            Err(e) => {
                error!(
                    property = %record.property_name,
                    property_id = %record.property_id,
                    %step,
                    error = %e,
                    "[UPLOAD][ERROR] Error processing {}", record.property_name
                );
                record.state = FileState::Failed {
                    step,
                    reason: e.to_string(),
                };
            }
        }
    }
    record
}

async fn advance<A>(api: &A, record: &UploadRecord, mappings: &[Value]) -> Result<FileState, ApiError>
where
    A: DynamicFormsApi + ?Sized,
{
    match &record.state {
        FileState::Pending => {
            api.probe(&record.property_id).await?;
            Ok(FileState::OptionsOk)
        }
        FileState::OptionsOk => {
            let file_name = api
                .upload_document(&record.property_id, &record.path)
                .await?;
            Ok(FileState::Uploaded { file_name })
        }
        FileState::Uploaded { file_name } => {
            api.upload_mapping(&record.property_id, file_name, mappings)
                .await?;
            Ok(FileState::Mapped {
                file_name: file_name.clone(),
            })
        }
        terminal => Ok(terminal.clone()),
    }
}

fn log_transition(record: &UploadRecord, next: &FileState) {
    let property = record.property_name.as_str();
    match next {
        FileState::OptionsOk => info!(property, "[UPLOAD] OPTIONS request successful"),
        FileState::Uploaded { file_name } => {
            info!(property, file_name = %file_name, "[UPLOAD] PDF uploaded, got filename: {}", file_name)
        }
        FileState::Mapped { .. } => info!(property, "[UPLOAD] Mapping uploaded for {}", property),
        _ => {}
    }
}

/// File name of `path`, used in summaries.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
