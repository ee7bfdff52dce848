#![doc = "HTTP client for the reporting API's dynamic-forms endpoint: implements the core `DynamicFormsApi` contract with reqwest."]
//
//! # Dynamic-forms client (CLI <-> reporting API)
//!
//! This module wires the [`DynamicFormsApi`] trait from
//! [`regcard-uploader-core::contract`] to the real HTTP endpoint
//! `{base}/{property_id}/dynamic-forms`.
//!
//! - `probe` → `OPTIONS`
//! - `upload_document` → `POST`, multipart (`type=REGISTRATION_CARD`, `file`)
//! - `upload_mapping` → `PUT`, JSON [`DynamicFormPayload`]
//!
//! Every request carries `Authorization: Bearer <token>`. Non-success responses
//! are turned into [`ApiError::Status`] with the response body preserved, so the
//! driver can log what the server said.

use async_trait::async_trait;
use regcard_uploader_core::config::RunConfig;
use regcard_uploader_core::contract::{ApiError, DynamicFormsApi, Step};
use regcard_uploader_core::payload::{DynamicFormPayload, UploadedDocument, REGISTRATION_CARD};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::path::Path;

pub struct DynamicFormsClient {
    http: Client,
    base_url: String,
    token: String,
}

impl DynamicFormsClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("regcard-uploader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::info!(
            base_url,
            token_set = !token.is_empty(),
            "Initialized DynamicFormsClient"
        );
        Ok(DynamicFormsClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.base_url, &config.token)
    }

    pub fn endpoint(&self, property_id: &str) -> String {
        format!("{}/{}/dynamic-forms", self.base_url, property_id)
    }
}

fn transport(step: Step) -> impl FnOnce(reqwest::Error) -> ApiError {
    move |e| ApiError::Transport {
        step,
        message: e.to_string(),
    }
}

/// Pass through 2xx responses; everything else becomes `ApiError::Status` with the body text.
async fn ensure_success(step: Step, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(%step, status = status.as_u16(), body = %body, "API returned non-success status");
    Err(ApiError::Status {
        step,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DynamicFormsApi for DynamicFormsClient {
    async fn probe(&self, property_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(property_id);
        tracing::info!(property_id, url = %url, "Sending OPTIONS probe");

        let response = self
            .http
            .request(Method::OPTIONS, &url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport(Step::Probe))?;
        ensure_success(Step::Probe, response).await?;
        Ok(())
    }

    async fn upload_document(&self, property_id: &str, path: &Path) -> Result<String, ApiError> {
        let url = self.endpoint(property_id);
        let io_error = |source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "registration_card.pdf".to_string());

        tracing::info!(property_id, file = %file_name, bytes = length, "Uploading registration card PDF");

        let part = Part::stream_with_length(file, length)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(transport(Step::UploadDocument))?;
        let form = Form::new().text("type", REGISTRATION_CARD).part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(transport(Step::UploadDocument))?;
        let response = ensure_success(Step::UploadDocument, response).await?;

        let uploaded: UploadedDocument =
            response.json().await.map_err(|e| ApiError::Decode {
                step: Step::UploadDocument,
                message: e.to_string(),
            })?;
        tracing::info!(property_id, filename = %uploaded.filename, "Server stored registration card");
        Ok(uploaded.filename)
    }

    async fn upload_mapping(
        &self,
        property_id: &str,
        file_name: &str,
        mappings: &[Value],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(property_id);
        let payload = DynamicFormPayload::registration_card(property_id, file_name, mappings);
        tracing::info!(
            property_id,
            file_name,
            form_id = %payload.id,
            mappings = mappings.len(),
            "Uploading field mapping"
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(transport(Step::UploadMapping))?;
        ensure_success(Step::UploadMapping, response).await?;
        Ok(())
    }
}
