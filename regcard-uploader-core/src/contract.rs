//! # contract: seams between the upload workflow and the outside world
//!
//! The driver never talks to HTTP or to the terminal directly. It goes through
//! two traits defined here:
//!
//! - [`DynamicFormsApi`]: the three per-property calls against the reporting
//!   API's `dynamic-forms` endpoint (probe, document upload, mapping upload).
//! - [`SettingsPrompt`]: interactive input needed to resolve a run's
//!   configuration (environment selection and bearer token).
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so tests can script every call
//!   and assert which calls were (not) made.
//! - Mocks are exported behind the default `test-export-mocks` feature so the
//!   CLI crate's tests can use them as well.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::Environment;

/// One of the three calls made for every registration card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    UploadDocument,
    UploadMapping,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Probe => "OPTIONS probe",
            Step::UploadDocument => "PDF upload",
            Step::UploadMapping => "mapping upload",
        };
        f.write_str(name)
    }
}

/// Failure of a single dynamic-forms call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `body` is kept verbatim for the log.
    #[error("{step} returned HTTP {status}: {body}")]
    Status { step: Step, status: u16, body: String },

    #[error("{step} request failed: {message}")]
    Transport { step: Step, message: String },

    #[error("{step} response could not be decoded: {message}")]
    Decode { step: Step, message: String },

    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client for `{base}/{property_id}/dynamic-forms`.
///
/// Implementors own the base URL and bearer token; callers only pass the
/// per-property arguments. Calls are awaited one at a time by the driver.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DynamicFormsApi: Send + Sync {
    /// Capability check (`OPTIONS`). An error means the property or endpoint
    /// is unreachable or the token is not authorised for it.
    async fn probe(&self, property_id: &str) -> Result<(), ApiError>;

    /// Upload the PDF at `path` as a `REGISTRATION_CARD` document (`POST`, multipart).
    ///
    /// Returns the filename the server assigned to the stored document.
    async fn upload_document(&self, property_id: &str, path: &Path) -> Result<String, ApiError>;

    /// Attach `mappings` to the uploaded document `file_name` (`PUT`, full replace).
    ///
    /// Implementor generates a fresh form identifier for every call.
    async fn upload_mapping(
        &self,
        property_id: &str,
        file_name: &str,
        mappings: &[serde_json::Value],
    ) -> Result<(), ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("no interactive terminal available to ask for {0}")]
    NotInteractive(&'static str),

    #[error("prompt failed: {0}")]
    Interaction(String),
}

/// Source of the interactive parts of a run's configuration.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait SettingsPrompt {
    /// Ask the operator which environment to upload to.
    fn select_environment(&self, choices: &[Environment]) -> Result<Environment, PromptError>;

    /// Ask the operator for the bearer token.
    fn bearer_token(&self) -> Result<String, PromptError>;
}
