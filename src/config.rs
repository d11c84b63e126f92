//! Configuration types for docproc-client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level client configuration
///
/// Groups the HTTP endpoint settings, the polling cadence, and the
/// result-cache location. Every field has a sensible default; a zero-config
/// `Config::default()` targets a local service on port 8000.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP endpoint configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Task status polling configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Completed-document cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP endpoint configuration for the document-processing service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the processing service (default: "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached as an `Authorization` header to every request
    /// (None = requests are sent unauthenticated)
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout (default: 30 seconds)
    ///
    /// This bounds a single HTTP round trip, not the overall polling loop;
    /// the loop is bounded separately by `PollConfig`.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            request_timeout: default_request_timeout(),
        }
    }
}

/// Task status polling configuration
///
/// The defaults give a 5-minute overall ceiling: 60 attempts at a fixed
/// 5-second cadence. The poll loop is guaranteed to terminate within
/// `max_attempts * interval` wall-clock time plus one query latency.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed delay between status queries (default: 5 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub interval: Duration,

    /// Maximum number of status queries before giving up (default: 60)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retry transport-level failures on the normal poll cadence (default: false)
    ///
    /// By default only `pending`/`processing` statuses keep the loop going and
    /// a network failure ends the session immediately. Enabling this treats a
    /// failed query like a non-terminal status: the attempt still counts
    /// against `max_attempts` and the loop sleeps for `interval` before the
    /// next try.
    #[serde(default)]
    pub retry_transport_errors: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_max_attempts(),
            retry_transport_errors: false,
        }
    }
}

/// Completed-document cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path of the single-slot cache file (default: "./document_data.json")
    ///
    /// Overwritten on every successful run; a later page/process reads it back.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_max_attempts() -> u32 {
    60
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./document_data.json")
}

// Duration serialization helper (seconds as u64)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
