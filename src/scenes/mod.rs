//! Concrete scene catalogue
//!
//! Actions fire once, polls retry until their predicate holds and pauses
//! just wait. Cloud calls go through the traits in [`ops`] so tests can
//! swap in fakes.

mod action;
pub mod ops;
mod pause;
mod poll;

pub use action::{AdLib, Invoke, Publish, PutRecord, SendMessage};
pub use ops::{
    FetchWindow, Invoker, LogLine, LogSearcher, Publisher, QueueSender, Record, RecordFetcher,
    StreamWriter,
};
pub use pause::Pause;
pub use poll::{LogQuery, Poll, RecordQuery, WaitLog, WaitRecord, DEFAULT_LIMIT, DEFAULT_LOOKBACK};
