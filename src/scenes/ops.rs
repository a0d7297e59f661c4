//! Operation interfaces consumed by scenes
//!
//! Each scene kind talks to its resource through one narrow trait. Targets
//! are resolved before the call, so implementations only ever see concrete
//! names and ARNs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::SystemTime;

use crate::common::Result;

/// Publishes messages to a topic
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the message ID
    async fn publish(&self, topic_arn: &str, message: &[u8]) -> Result<String>;
}

/// Invokes a function synchronously
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Returns the function's response payload
    async fn invoke(&self, function_arn: &str, payload: &[u8]) -> Result<Vec<u8>>;
}

/// Sends messages to a queue
#[async_trait]
pub trait QueueSender: Send + Sync {
    /// `queue` is the queue URL for logical ID targets and the queue name
    /// for ARN targets. Returns the message ID.
    async fn send_message(&self, queue: &str, body: &str) -> Result<String>;
}

/// Writes records to a stream
#[async_trait]
pub trait StreamWriter: Send + Sync {
    async fn put_record(&self, stream_name: &str, data: &[u8]) -> Result<()>;
}

/// Reads records written to a table or stream
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch_recent_records(&self, source: &str, window: &FetchWindow) -> Result<Vec<Record>>;
}

/// Searches a function's log output
#[async_trait]
pub trait LogSearcher: Send + Sync {
    /// `filter` is a literal term every returned line must contain
    async fn search_logs(
        &self,
        function_name: &str,
        filter: Option<&str>,
        window: &FetchWindow,
    ) -> Result<Vec<LogLine>>;
}

/// Which records a fetch should consider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Ignore anything written before this instant
    pub since: SystemTime,
    /// Maximum number of records (or log pages) to read
    pub limit: usize,
}

/// A record read from a table or stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub data: Vec<u8>,
}

impl Record {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Decode the record as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.data)?)
    }
}

impl From<Vec<u8>> for Record {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&str> for Record {
    fn from(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
        }
    }
}

/// One message from a function's log output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine(pub String);

impl LogLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Decode a JSON-formatted log message
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl From<&str> for LogLine {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}
