//! Error types for stackprobe
//!
//! Errors fall into two groups: configuration mistakes that no amount of
//! retrying can fix (see [`Error::is_fatal`]), and operational failures that
//! a polling scene may absorb while it waits for the stack to settle.

use std::io;
use thiserror::Error;

use crate::playbook::StepInfo;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stackprobe
#[derive(Error, Debug)]
pub enum Error {
    // === Stack Errors ===
    #[error("Stack '{stack}' does not exist in region '{region}'")]
    StackNotFound { stack: String, region: String },

    #[error("Failed to describe stack '{stack}': {message}")]
    StackDescribe { stack: String, message: String },

    // === Resource Errors ===
    #[error("Resource '{logical_id}' not found in stack '{stack}'")]
    ResourceNotFound { logical_id: String, stack: String },

    #[error("Resource '{logical_id}' has unsupported type '{resource_type}'")]
    UnsupportedResourceType {
        logical_id: String,
        resource_type: String,
    },

    #[error("Invalid ARN '{arn}': expected 6 to 8 ':'-separated segments, got {segments}")]
    InvalidArn { arn: String, segments: usize },

    #[error("Invalid CDK manifest: {0}")]
    ManifestParse(String),

    // === Operation Errors ===
    #[error("{operation} failed: {message}")]
    Operation { operation: String, message: String },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    // === Playbook Errors ===
    #[error("Failed playbook step {step}: {source}")]
    StepFailed {
        step: StepInfo,
        #[source]
        source: Box<Error>,
    },

    #[error("Retry limit exceeded at step {step} after {attempts} attempts{}", last_error_suffix(.last_error))]
    RetryExhausted {
        step: StepInfo,
        attempts: usize,
        last_error: Option<String>,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {e})"),
        None => String::new(),
    }
}

impl Error {
    /// Create a resource not found error
    pub fn resource_not_found(logical_id: &str, stack: &str) -> Self {
        Self::ResourceNotFound {
            logical_id: logical_id.to_string(),
            stack: stack.to_string(),
        }
    }

    /// Create an unsupported resource type error
    pub fn unsupported_resource_type(logical_id: &str, resource_type: &str) -> Self {
        Self::UnsupportedResourceType {
            logical_id: logical_id.to_string(),
            resource_type: resource_type.to_string(),
        }
    }

    /// Create an operation failed error
    pub fn operation<E: std::fmt::Display>(operation: &str, err: E) -> Self {
        Self::Operation {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    /// Create a stack describe error
    pub fn stack_describe<E: std::fmt::Display>(stack: &str, err: E) -> Self {
        Self::StackDescribe {
            stack: stack.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether retrying cannot possibly help.
    ///
    /// A polling scene that hits one of these aborts the playbook instead of
    /// waiting for its backoff budget to run out.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::StackNotFound { .. }
            | Error::UnsupportedResourceType { .. }
            | Error::InvalidArn { .. }
            | Error::ManifestParse(_)
            | Error::Config(_)
            | Error::ConfigParse(_)
            | Error::FileRead { .. } => true,
            Error::StepFailed { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Whether a step never succeeded within its retry budget, as opposed to
    /// explicitly failing
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Error::RetryExhausted { .. })
    }

    /// The playbook step this error is attached to, if any
    pub fn step(&self) -> Option<&StepInfo> {
        match self {
            Error::StepFailed { step, .. } | Error::RetryExhausted { step, .. } => Some(step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> StepInfo {
        StepInfo::new(2, 3, "Publish to topic")
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::unsupported_resource_type("Bucket", "AWS::S3::Bucket").is_fatal());
        assert!(Error::InvalidArn {
            arn: "arn:aws".into(),
            segments: 2
        }
        .is_fatal());
        assert!(!Error::resource_not_found("Table", "Stack").is_fatal());
        assert!(!Error::operation("publish", "throttled").is_fatal());
    }

    #[test]
    fn test_step_failed_message_carries_position() {
        let err = Error::StepFailed {
            step: step(),
            source: Box::new(Error::operation("publish", "access denied")),
        };
        let msg = err.to_string();
        assert!(msg.contains("[2/3] Publish to topic"), "{msg}");
        assert!(msg.contains("access denied"), "{msg}");
        assert_eq!(err.step().map(|s| s.position), Some(2));
    }

    #[test]
    fn test_retry_exhausted_is_distinct() {
        let err = Error::RetryExhausted {
            step: step(),
            attempts: 4,
            last_error: Some("no records yet".into()),
        };
        assert!(err.is_retry_exhausted());
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("last error: no records yet"));

        let bare = Error::RetryExhausted {
            step: step(),
            attempts: 4,
            last_error: None,
        };
        assert!(bare.to_string().ends_with("after 4 attempts"));
    }
}
