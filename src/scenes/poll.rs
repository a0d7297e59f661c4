//! Polling scenes
//!
//! A poll makes one fetch-and-check per attempt. Fetch failures are retried
//! by the runner unless they are fatal; an empty fetch is simply "not yet".

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

use super::ops::{FetchWindow, LogLine, LogSearcher, Record, RecordFetcher};
use crate::common::{Error, Result};
use crate::playbook::{retry_unless_fatal, Outcome, Scene};
use crate::stack::{ResourceRegistry, Target};

/// How far before the first attempt to start reading
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(60);

/// Records (or log pages) read per attempt
pub const DEFAULT_LIMIT: usize = 20;

/// Start of the fetch window. Fixed at the first attempt.
fn window_start(since: &mut Option<SystemTime>, lookback: Duration) -> SystemTime {
    *since.get_or_insert_with(|| {
        let now = SystemTime::now();
        now.checked_sub(lookback).unwrap_or(now)
    })
}

/// Poll an arbitrary condition
pub struct Poll {
    label: String,
    check: Box<dyn FnMut() -> Result<bool> + Send>,
}

impl Poll {
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: FnMut() -> Result<bool> + Send + 'static,
    {
        Self {
            label: label.into(),
            check: Box::new(check),
        }
    }
}

#[async_trait]
impl Scene for Poll {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn attempt(&mut self, _registry: &ResourceRegistry) -> Result<Outcome> {
        match (self.check)() {
            Ok(done) => Ok(Outcome::from(done)),
            Err(e) => retry_unless_fatal(e),
        }
    }
}

/// Options for [`WaitRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordQuery {
    pub lookback: Duration,
    pub limit: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RecordQuery {
    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::Config("record query limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// Wait until a record written to a table or stream satisfies a predicate
pub struct WaitRecord {
    fetcher: Arc<dyn RecordFetcher>,
    source: Target,
    query: RecordQuery,
    since: Option<SystemTime>,
    predicate: Box<dyn FnMut(&Record) -> bool + Send>,
}

impl WaitRecord {
    pub fn new<F>(
        fetcher: Arc<dyn RecordFetcher>,
        source: Target,
        query: RecordQuery,
        predicate: F,
    ) -> Result<Self>
    where
        F: FnMut(&Record) -> bool + Send + 'static,
    {
        query.validate()?;
        Ok(Self {
            fetcher,
            source,
            query,
            since: None,
            predicate: Box::new(predicate),
        })
    }
}

#[async_trait]
impl Scene for WaitRecord {
    fn label(&self) -> String {
        format!("Wait for record in {}", self.source)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let source = match self.source.name(registry) {
            Ok(name) => name,
            Err(e) => return retry_unless_fatal(e),
        };
        let window = FetchWindow {
            since: window_start(&mut self.since, self.query.lookback),
            limit: self.query.limit,
        };

        let records = match self.fetcher.fetch_recent_records(&source, &window).await {
            Ok(records) => records,
            Err(e) => return retry_unless_fatal(e),
        };
        trace!(source = %source, count = records.len(), "Fetched records");

        if records.is_empty() {
            return Ok(Outcome::Pending);
        }
        let found = records.iter().any(|r| (self.predicate)(r));
        debug!(source = %source, count = records.len(), found, "Checked records");
        Ok(Outcome::from(found))
    }
}

/// Options for [`WaitLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Literal term every matching log line must contain
    pub filter: Option<String>,
    pub lookback: Duration,
    /// Log pages read per attempt
    pub query_limit: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            filter: None,
            lookback: DEFAULT_LOOKBACK,
            query_limit: DEFAULT_LIMIT,
        }
    }
}

impl LogQuery {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.query_limit == 0 {
            return Err(Error::Config("log query limit must be at least 1".into()));
        }
        match self.filter.as_deref() {
            Some("") => Err(Error::Config("log filter must not be empty".into())),
            Some(f) if f.contains('"') => Err(Error::Config(format!(
                "log filter must not contain quotes: {f}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Wait until a function logs a line satisfying a predicate
pub struct WaitLog {
    searcher: Arc<dyn LogSearcher>,
    function: Target,
    query: LogQuery,
    since: Option<SystemTime>,
    predicate: Box<dyn FnMut(&LogLine) -> bool + Send>,
}

impl WaitLog {
    pub fn new<F>(
        searcher: Arc<dyn LogSearcher>,
        function: Target,
        query: LogQuery,
        predicate: F,
    ) -> Result<Self>
    where
        F: FnMut(&LogLine) -> bool + Send + 'static,
    {
        query.validate()?;
        Ok(Self {
            searcher,
            function,
            query,
            since: None,
            predicate: Box::new(predicate),
        })
    }
}

#[async_trait]
impl Scene for WaitLog {
    fn label(&self) -> String {
        match &self.query.filter {
            Some(filter) => format!("Wait for logs of {} matching \"{filter}\"", self.function),
            None => format!("Wait for logs of {}", self.function),
        }
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let function = match self.function.name(registry) {
            Ok(name) => name,
            Err(e) => return retry_unless_fatal(e),
        };
        let window = FetchWindow {
            since: window_start(&mut self.since, self.query.lookback),
            limit: self.query.query_limit,
        };

        let lines = match self
            .searcher
            .search_logs(&function, self.query.filter.as_deref(), &window)
            .await
        {
            Ok(lines) => lines,
            Err(e) => return retry_unless_fatal(e),
        };

        if lines.is_empty() {
            return Ok(Outcome::Pending);
        }
        let found = lines.iter().any(|l| (self.predicate)(l));
        debug!(function = %function, count = lines.len(), found, "Checked log lines");
        Ok(Outcome::from(found))
    }
}
