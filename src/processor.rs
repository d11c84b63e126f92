//! End-to-end processing orchestration
//!
//! [`DocumentProcessor`] ties the pieces together: validate the upload,
//! submit it, poll the resulting task to a terminal outcome, and persist the
//! finished document to the single-slot cache. Consumers subscribe to
//! [`Event`]s for progress and render the returned outcome themselves; no
//! presentation state lives here.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

use crate::cache::DocumentCache;
use crate::client::DocumentClient;
use crate::config::{Config, PollConfig};
use crate::error::{Error, Result};
use crate::poller::TaskPoller;
use crate::types::{
    CachedDocument, DocumentType, DocumentUpload, Event, PollOutcome, ProcessingOutcome, TaskId,
};

/// Capacity of the broadcast event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Orchestrates submit, poll, and cache for document processing runs
///
/// Cloneable: all shared state is behind `Arc`, so clones observe the same
/// active sessions and event channel.
#[derive(Clone)]
pub struct DocumentProcessor {
    client: DocumentClient,
    cache: DocumentCache,
    poll_config: PollConfig,
    event_tx: broadcast::Sender<Event>,
    /// Active poll sessions and their cancellation tokens, keyed by task.
    /// Guards the one-session-per-task invariant and powers `cancel`.
    active_sessions: Arc<Mutex<HashMap<TaskId, CancellationToken>>>,
}

impl DocumentProcessor {
    /// Create a processor from configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = DocumentClient::new(&config.http)?;
        let cache = DocumentCache::new(&config.cache);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client,
            cache,
            poll_config: config.poll,
            event_tx,
            active_sessions: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Subscribe to processing lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The underlying HTTP client, for direct endpoint access
    /// (health checks, reprocessing)
    pub fn client(&self) -> &DocumentClient {
        &self.client
    }

    /// The document cache written on successful runs
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Submit a document and poll the resulting task to completion
    ///
    /// The asynchronous path: `POST /process`, then `GET /task/{id}` on the
    /// configured cadence. On success the finished document is written to the
    /// cache before the outcome is returned.
    pub async fn process(&self, upload: DocumentUpload) -> Result<ProcessingOutcome> {
        upload.validate()?;
        let task_id = self.client.submit_for_processing(&upload).await?;
        self.event_tx
            .send(Event::Submitted {
                task_id: task_id.clone(),
                file_name: upload.file_name.clone(),
            })
            .ok();
        self.poll_task(task_id, upload.document_type).await
    }

    /// Submit a document on the legacy synchronous path
    ///
    /// `POST /upload` processes smaller workloads inline; the finished
    /// document is cached and returned directly, no polling involved.
    pub async fn process_sync(&self, upload: DocumentUpload) -> Result<CachedDocument> {
        upload.validate()?;
        let document = self.client.upload_sync(&upload).await?;
        self.cache.store(&document)?;
        self.event_tx
            .send(Event::CacheWritten {
                id: document.id.clone(),
            })
            .ok();
        Ok(document)
    }

    /// Poll an already-submitted task to its terminal outcome
    ///
    /// At most one session may be active per task; a second call for the same
    /// task fails with [`Error::AlreadyPolling`] while the first is running.
    pub async fn poll_task(
        &self,
        task_id: TaskId,
        document_type: DocumentType,
    ) -> Result<ProcessingOutcome> {
        let cancel = self.register_session(&task_id).await?;

        let poller = TaskPoller::new(self.client.clone(), self.poll_config.clone())
            .with_cancellation(cancel)
            .with_events(self.event_tx.clone());
        let result = poller.run(&task_id).await;

        self.active_sessions.lock().await.remove(&task_id);

        match result? {
            PollOutcome::Completed(doc_result) => {
                let document = CachedDocument {
                    id: task_id.to_string(),
                    markdown: doc_result.markdown,
                    chunks: doc_result.chunks,
                    document_type,
                    preview_url: doc_result.preview_url,
                };
                self.cache.store(&document)?;
                self.event_tx
                    .send(Event::Completed {
                        task_id: task_id.clone(),
                    })
                    .ok();
                self.event_tx
                    .send(Event::CacheWritten {
                        id: document.id.clone(),
                    })
                    .ok();
                Ok(ProcessingOutcome::Completed(document))
            }
            PollOutcome::Failed { message } => {
                self.event_tx
                    .send(Event::Failed {
                        task_id,
                        error: message.clone(),
                    })
                    .ok();
                Ok(ProcessingOutcome::Failed { message })
            }
            PollOutcome::TimedOut => {
                self.event_tx
                    .send(Event::TimedOut {
                        task_id,
                        attempts: self.poll_config.max_attempts,
                    })
                    .ok();
                Ok(ProcessingOutcome::TimedOut)
            }
            PollOutcome::Cancelled => {
                self.event_tx.send(Event::Cancelled { task_id }).ok();
                Ok(ProcessingOutcome::Cancelled)
            }
        }
    }

    /// Cancel the active poll session for a task, if any
    ///
    /// Returns true if a session was found and cancelled. The session itself
    /// resolves [`ProcessingOutcome::Cancelled`] to its caller.
    pub async fn cancel(&self, task_id: &TaskId) -> bool {
        match self.active_sessions.lock().await.get(task_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every active poll session
    pub async fn cancel_all(&self) {
        for token in self.active_sessions.lock().await.values() {
            token.cancel();
        }
    }

    async fn register_session(&self, task_id: &TaskId) -> Result<CancellationToken> {
        let mut sessions = self.active_sessions.lock().await;
        if sessions.contains_key(task_id) {
            return Err(Error::AlreadyPolling(task_id.to_string()));
        }
        let token = CancellationToken::new();
        sessions.insert(task_id.clone(), token.clone());
        Ok(token)
    }
}
