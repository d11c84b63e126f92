//! HTTP client for the document-processing service
//!
//! [`DocumentClient`] speaks the service's REST surface:
//!
//! - `POST /process` — multipart submission, returns a task id to poll
//! - `GET /task/{id}` — one status snapshot of a queued task
//! - `POST /upload` — legacy synchronous submission, returns the result inline
//! - `POST /reprocess` — re-run extraction for a stored document with new fields
//! - `GET /health` — service liveness
//!
//! It also implements [`StatusQuery`], so it plugs directly into
//! [`TaskPoller`](crate::poller::TaskPoller).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::poller::{GENERIC_FAILURE_MESSAGE, StatusQuery};
use crate::types::{CachedDocument, DocumentUpload, TaskId, TaskSnapshot};

/// Wire shape of a successful `POST /process` response
#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    task_id: Option<String>,
}

/// Wire shape of a `POST /upload` response (legacy synchronous path)
#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    chunks: Option<serde_json::Value>,
    #[serde(default, rename = "previewUrl")]
    preview_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Wire shape of an error body (`{"detail": "..."}`, FastAPI-style)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for submitting documents and querying task status
#[derive(Clone)]
pub struct DocumentClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl DocumentClient {
    /// Create a client from endpoint configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL does not parse, or
    /// [`Error::Network`] if the underlying HTTP client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn multipart_form(upload: &DocumentUpload) -> Result<Form> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime_type())
            .map_err(Error::Network)?;
        Ok(Form::new()
            .part("file", part)
            .text("document_type", upload.document_type.as_str().to_string()))
    }

    /// Map a non-success response to an error, extracting the server's
    /// message when the body carries one.
    async fn error_from_response(response: Response) -> Error {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .detail
                .or(body.error)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Submit a document for asynchronous processing (`POST /process`)
    ///
    /// Validates the upload, sends it as a multipart form with `file` and
    /// `document_type` fields, and returns the task id to poll.
    pub async fn submit_for_processing(&self, upload: &DocumentUpload) -> Result<TaskId> {
        upload.validate()?;
        let url = self.endpoint("/process")?;
        tracing::info!(
            file = %upload.file_name,
            document_type = %upload.document_type,
            "submitting document for processing"
        );

        let form = Self::multipart_form(upload)?;
        let response = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: ProcessResponse = response.json().await?;
        let task_id = body.task_id.ok_or_else(|| {
            Error::MalformedResponse("no task id received from server".to_string())
        })?;
        tracing::debug!(task_id = %task_id, "task queued");
        Ok(TaskId::new(task_id))
    }

    /// Submit a document on the legacy synchronous path (`POST /upload`)
    ///
    /// Smaller workloads are processed inline; the response carries the
    /// finished document instead of a task id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Processing`] when the server answers with
    /// `success: false` (its `error` message when present, a generic one
    /// otherwise).
    pub async fn upload_sync(&self, upload: &DocumentUpload) -> Result<CachedDocument> {
        upload.validate()?;
        let url = self.endpoint("/upload")?;
        tracing::info!(
            file = %upload.file_name,
            document_type = %upload.document_type,
            "uploading document for synchronous processing"
        );

        let form = Self::multipart_form(upload)?;
        let response = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: UploadResponse = response.json().await?;
        if !body.success {
            return Err(Error::Processing(
                body.error
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ));
        }
        match (body.id, body.markdown) {
            (Some(id), Some(markdown)) => Ok(CachedDocument {
                id,
                markdown,
                chunks: body.chunks,
                document_type: upload.document_type.clone(),
                preview_url: body.preview_url,
            }),
            _ => Err(Error::MalformedResponse(
                "upload response missing id or markdown".to_string(),
            )),
        }
    }

    /// Fetch one status snapshot of a task (`GET /task/{id}`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] on 404 and [`Error::Api`] on other
    /// non-success statuses.
    pub async fn task_status(&self, task_id: &TaskId) -> Result<TaskSnapshot> {
        if task_id.is_empty() {
            return Err(Error::Validation("task id must not be empty".to_string()));
        }
        // Push the id as a path segment so reserved characters get
        // percent-encoded instead of misrouting the request
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Other("base URL cannot have path segments".to_string()))?
            .pop_if_empty()
            .push("task")
            .push(task_id.as_str());
        let response = self.authorize(self.http.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::TaskNotFound(task_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Re-run extraction for a stored document with new fields (`POST /reprocess`)
    pub async fn reprocess(&self, document_id: &str, fields: &serde_json::Value) -> Result<()> {
        let url = self.endpoint("/reprocess")?;
        tracing::info!(document_id = %document_id, "requesting document reprocess");
        let response = self
            .authorize(self.http.post(url))
            .json(&serde_json::json!({
                "document_id": document_id,
                "fields": fields,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    /// Check service liveness (`GET /health`)
    pub async fn health(&self) -> Result<()> {
        let url = self.endpoint("/health")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl StatusQuery for DocumentClient {
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskSnapshot> {
        DocumentClient::task_status(self, task_id).await
    }
}
