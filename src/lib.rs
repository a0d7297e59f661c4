//! stackprobe - integration test playbooks for deployed cloud stacks
//!
//! A playbook is an ordered list of scenes run against a deployed stack.
//! Scenes address resources through [`Target`]s, which the
//! [`ResourceRegistry`] resolves to physical names and ARNs.

pub mod cli;
pub mod commands;
pub mod common;
pub mod playbook;
pub mod scenes;
pub mod stack;
pub mod testing;

// Re-export commonly used types
pub use common::{Error, Result};
pub use playbook::{BackoffTimer, ExponentialBackoff, Outcome, Playbook, PlaybookConfig, Scene};
pub use stack::{ResourceRegistry, StackDescriber, Target};
