//! # docproc-client
//!
//! Client library for asynchronous document-processing services: submit a
//! file, poll the server-side task until it finishes, and hand the result to
//! whatever comes next.
//!
//! ## Design Philosophy
//!
//! docproc-client is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to lifecycle events; the library
//!   holds no presentation state
//! - **Testable at the seams** - The poll loop runs over an injected
//!   [`StatusQuery`](poller::StatusQuery) capability, not a hard-wired HTTP call
//! - **Sensible defaults** - A 5-second cadence with a 60-attempt ceiling
//!   (5 minutes overall), overridable through [`Config`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use docproc_client::{Config, DocumentProcessor, DocumentType, DocumentUpload, ProcessingOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = DocumentProcessor::new(Config::default())?;
//!
//!     // Watch progress
//!     let mut events = processor.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let upload = DocumentUpload::new(
//!         "invoice.pdf",
//!         std::fs::read("invoice.pdf")?,
//!         DocumentType::new("invoice"),
//!     );
//!     match processor.process(upload).await? {
//!         ProcessingOutcome::Completed(doc) => println!("{}", doc.markdown),
//!         ProcessingOutcome::Failed { message } => eprintln!("failed: {message}"),
//!         ProcessingOutcome::TimedOut => eprintln!("processing timed out"),
//!         ProcessingOutcome::Cancelled => eprintln!("cancelled"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Single-slot cache for the last processed document
pub mod cache;
/// HTTP client for the processing service
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Task status polling loop
pub mod poller;
/// End-to-end processing orchestration
pub mod processor;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use cache::DocumentCache;
pub use client::DocumentClient;
pub use config::{CacheConfig, Config, HttpConfig, PollConfig};
pub use error::{Error, Result};
pub use poller::{StatusQuery, TaskPoller};
pub use processor::DocumentProcessor;
pub use types::{
    CachedDocument, DocumentResult, DocumentType, DocumentUpload, Event, PollOutcome,
    ProcessingOutcome, TaskId, TaskSnapshot, TaskStatus,
};
