//! Core types for docproc-client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// File extensions the processing service accepts
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Opaque identifier for a server-side processing task
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-reported processing task status
///
/// `Pending` and `Processing` are non-terminal: the poller keeps querying.
/// `Completed` and `Failed` end the poll session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, waiting for a worker to pick it up
    Pending,
    /// A worker is extracting the document
    Processing,
    /// Finished successfully, result payload available
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// Returns true if no further status transition will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One observed snapshot of a server-side task
///
/// Returned by `GET /task/{id}`. The server owns the task and mutates it;
/// the client only observes successive snapshots. `result` is present only
/// when `status` is `completed`, `error` only when `failed`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier (some server versions omit it from the body)
    #[serde(default)]
    pub task_id: Option<TaskId>,

    /// Current task status
    pub status: TaskStatus,

    /// Extraction result, present when completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DocumentResult>,

    /// Failure message, present when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the task was created on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the task status last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Extraction result carried by a completed task
///
/// The markdown rendition is the one field every server version provides;
/// everything else is opaque structured data passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Markdown rendition of the document
    pub markdown: String,

    /// Derived chunks (opaque, shape varies by extraction backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<serde_json::Value>,

    /// Structured fields extracted from the document (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// URL of a rendered preview, when the server produced one
    #[serde(
        default,
        rename = "previewUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_url: Option<String>,
}

/// Client-selected document classifier
///
/// Influences server-side extraction behavior; the polling core treats it as
/// an opaque string. The server falls back to `"unknown"` when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(pub String);

impl DocumentType {
    /// Create a new DocumentType
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        Self("unknown".to_string())
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file prepared for submission to the processing service
#[derive(Clone, Debug)]
pub struct DocumentUpload {
    /// Original file name, extension included
    pub file_name: String,
    /// Raw file content
    pub bytes: Vec<u8>,
    /// Client-selected document classifier
    pub document_type: DocumentType,
}

impl DocumentUpload {
    /// Create an upload from a file name and its content
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        document_type: DocumentType,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            document_type,
        }
    }

    /// Validate the upload before any request is issued
    ///
    /// Checks that a file is actually present (non-empty name and content)
    /// and that the extension is one the service accepts.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(Error::Validation(
                "please select a file to upload".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(Error::Validation(format!(
                "file {} is empty",
                self.file_name
            )));
        }
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(Error::Validation(format!(
                "unsupported file type for {} (allowed: {})",
                self.file_name,
                ALLOWED_EXTENSIONS.join(", ")
            ))),
        }
    }

    /// MIME type derived from the file extension
    pub fn mime_type(&self) -> &'static str {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("pdf") => "application/pdf",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

/// Terminal outcome of one poll session
///
/// A session resolves exactly one of these (or errors out, see
/// [`TaskPoller::run`](crate::poller::TaskPoller::run)) and is never reused.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// The server reported `completed` with a result payload
    Completed(DocumentResult),
    /// The server reported `failed`
    Failed {
        /// Server-provided failure message, or a generic default
        message: String,
    },
    /// The attempt ceiling was exhausted without a terminal status
    TimedOut,
    /// The session was cancelled before reaching a terminal status
    Cancelled,
}

/// Terminal outcome of an end-to-end processing run (submit, poll, cache)
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessingOutcome {
    /// Processing succeeded; the cached snapshot was written
    Completed(CachedDocument),
    /// The server reported that processing failed
    Failed {
        /// Server-provided failure message, or a generic default
        message: String,
    },
    /// Polling gave up after the attempt ceiling
    TimedOut,
    /// The run was cancelled
    Cancelled,
}

/// Client-persisted snapshot of the last successfully processed document
///
/// Single-slot: each successful run overwrites the previous entry. A later,
/// separate page/process reads it back to configure extraction fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
    /// Document (or task) identifier
    pub id: String,

    /// Markdown rendition of the document
    pub markdown: String,

    /// Derived chunks, when the server provided them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<serde_json::Value>,

    /// Document classifier selected at submission time
    pub document_type: DocumentType,

    /// Preview URL, when the server provided one
    #[serde(
        default,
        rename = "previewUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_url: Option<String>,
}

/// Event emitted during a processing run
///
/// Consumers subscribe via
/// [`DocumentProcessor::subscribe`](crate::processor::DocumentProcessor::subscribe)
/// and render progress however they like; the library itself holds no
/// presentation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A document was submitted and the server queued a task
    Submitted {
        /// Task identifier assigned by the server
        task_id: TaskId,
        /// Name of the submitted file
        file_name: String,
    },

    /// One status query completed
    StatusChecked {
        /// Task being polled
        task_id: TaskId,
        /// 1-based attempt number within the session
        attempt: u32,
        /// Status the server reported
        status: TaskStatus,
    },

    /// The task completed successfully
    Completed {
        /// Task that completed
        task_id: TaskId,
    },

    /// The task failed on the server
    Failed {
        /// Task that failed
        task_id: TaskId,
        /// Failure message
        error: String,
    },

    /// Polling exhausted its attempt budget
    TimedOut {
        /// Task that timed out
        task_id: TaskId,
        /// Number of queries issued before giving up
        attempts: u32,
    },

    /// The poll session was cancelled
    Cancelled {
        /// Task whose session was cancelled
        task_id: TaskId,
    },

    /// The completed document was written to the cache
    CacheWritten {
        /// Cached document identifier
        id: String,
    },
}
