//! The scene contract driven by the playbook runner

use async_trait::async_trait;

use crate::common::{Error, Result};
use crate::stack::ResourceRegistry;

/// Result of one successful `attempt` call.
#[derive(Debug)]
pub enum Outcome {
    /// The scene is complete; move on.
    Done,
    /// Nothing observable yet; ask the timer for a wait and try again.
    Pending,
    /// The attempt failed in a way that may clear up on its own. Treated like
    /// `Pending`, but the error is reported and kept for the exhaustion error.
    Retry(Error),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }
}

impl From<bool> for Outcome {
    fn from(done: bool) -> Self {
        if done {
            Outcome::Done
        } else {
            Outcome::Pending
        }
    }
}

/// One step of a playbook.
///
/// Returning `Err` ends the playbook immediately: actions report every
/// failure that way, polls only the ones where [`Error::is_fatal`] holds.
#[async_trait]
pub trait Scene: Send {
    /// Human readable description used in logs and errors
    fn label(&self) -> String;

    /// Make one attempt at completing the scene
    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome>;
}

/// Classify an error raised while polling: fatal errors end the playbook,
/// everything else becomes a retry.
pub fn retry_unless_fatal(err: Error) -> Result<Outcome> {
    if err.is_fatal() {
        Err(err)
    } else {
        Ok(Outcome::Retry(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_bool() {
        assert!(Outcome::from(true).is_done());
        assert!(matches!(Outcome::from(false), Outcome::Pending));
    }

    #[test]
    fn test_retry_unless_fatal() {
        let transient = retry_unless_fatal(Error::operation("fetch records", "throttled"));
        assert!(matches!(transient, Ok(Outcome::Retry(_))));

        let fatal = retry_unless_fatal(Error::unsupported_resource_type("Bucket", "AWS::S3::Bucket"));
        assert!(fatal.is_err());
    }
}
