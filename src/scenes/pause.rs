//! Fixed-duration pause scene

use async_trait::async_trait;
use std::time::Duration;

use crate::common::Result;
use crate::playbook::{Outcome, Scene};
use crate::stack::ResourceRegistry;

/// Sleep for a fixed duration, then complete
#[derive(Debug, Clone, Copy)]
pub struct Pause {
    duration: Duration,
}

impl Pause {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn seconds(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }
}

#[async_trait]
impl Scene for Pause {
    fn label(&self) -> String {
        if self.duration.subsec_nanos() == 0 {
            format!("Pausing {} seconds", self.duration.as_secs())
        } else {
            format!("Pausing {:?}", self.duration)
        }
    }

    async fn attempt(&mut self, _registry: &ResourceRegistry) -> Result<Outcome> {
        tokio::time::sleep(self.duration).await;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_then_completes() {
        let registry = ResourceRegistry::empty("S", "us-east-1", "1");
        let mut pause = Pause::seconds(3);
        assert_eq!(pause.label(), "Pausing 3 seconds");

        let started = Instant::now();
        assert!(pause.attempt(&registry).await.unwrap().is_done());
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_sub_second_label() {
        assert_eq!(Pause::new(Duration::from_millis(500)).label(), "Pausing 500ms");
        assert_eq!(Pause::new(Duration::from_millis(1500)).label(), "Pausing 1.5s");
    }
}
