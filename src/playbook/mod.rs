//! Playbook execution engine
//!
//! A playbook is an ordered list of [`Scene`]s. The runner attempts each
//! scene until it reports completion, pacing retries with a fresh
//! [`BackoffTimer`] per scene, and stops at the first failure.

mod observer;
mod runner;
mod scene;
mod timer;

pub use observer::{ConsoleObserver, PlaybookObserver, StepInfo, StepReport, TracingObserver};
pub use runner::{Playbook, PlaybookConfig, DEFAULT_INTERVAL};
pub use scene::{retry_unless_fatal, Outcome, Scene};
pub use timer::{default_timer_factory, BackoffTimer, ExponentialBackoff, TimerFactory};
