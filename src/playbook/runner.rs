//! Playbook runner
//!
//! Drives scenes strictly in order. Each scene is attempted until it is
//! done, its backoff timer runs dry, or it fails outright; the first
//! failure ends the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use super::observer::{PlaybookObserver, StepInfo, StepReport, TracingObserver};
use super::scene::{Outcome, Scene};
use super::timer::{default_timer_factory, BackoffTimer, TimerFactory};
use crate::common::{Error, Result};
use crate::stack::ResourceRegistry;

/// Pause between scenes unless configured otherwise
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Pacing and reporting for a playbook run
#[derive(Clone)]
pub struct PlaybookConfig {
    interval: Duration,
    timer_factory: TimerFactory,
    observer: Arc<dyn PlaybookObserver>,
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timer_factory: default_timer_factory(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl PlaybookConfig {
    /// Set the pause inserted after every scene except the last
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set how each scene's backoff timer is built
    pub fn with_timer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn BackoffTimer> + Send + Sync + 'static,
    {
        self.timer_factory = Arc::new(factory);
        self
    }

    /// Set the receiver of step events
    pub fn with_observer(mut self, observer: Arc<dyn PlaybookObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// An ordered list of scenes run as one test
pub struct Playbook {
    scenes: Vec<Box<dyn Scene>>,
    config: PlaybookConfig,
}

impl Playbook {
    /// Create a playbook with the default configuration
    pub fn new(scenes: Vec<Box<dyn Scene>>) -> Self {
        Self::with_config(scenes, PlaybookConfig::default())
    }

    pub fn with_config(scenes: Vec<Box<dyn Scene>>, config: PlaybookConfig) -> Self {
        Self { scenes, config }
    }

    /// Append a scene
    pub fn push<S: Scene + 'static>(&mut self, scene: S) {
        self.scenes.push(Box::new(scene));
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Labels of all scenes, in order
    pub fn labels(&self) -> Vec<String> {
        self.scenes.iter().map(|s| s.label()).collect()
    }

    /// Run every scene in order.
    ///
    /// Returns the first failure wrapped with the failing scene's position:
    /// [`Error::StepFailed`] for an explicit error, [`Error::RetryExhausted`]
    /// when the scene never completed within its backoff budget.
    pub async fn play(&mut self, registry: &ResourceRegistry) -> Result<()> {
        let total = self.scenes.len();
        let observer = Arc::clone(&self.config.observer);

        for (index, scene) in self.scenes.iter_mut().enumerate() {
            let step = StepInfo::new(index + 1, total, scene.label());
            observer.scene_started(&step);

            let started = Instant::now();
            let mut timer = (self.config.timer_factory)();
            let mut attempts = 0usize;
            let mut last_error: Option<Error> = None;

            loop {
                attempts += 1;
                let outcome = match scene.attempt(registry).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let err = Error::StepFailed {
                            step: step.clone(),
                            source: Box::new(e),
                        };
                        let report = StepReport {
                            attempts,
                            elapsed: started.elapsed(),
                        };
                        observer.scene_finished(&step, &report, Some(&err));
                        return Err(err);
                    }
                };

                match outcome {
                    Outcome::Done => break,
                    Outcome::Pending => {}
                    Outcome::Retry(e) => {
                        observer.attempt_failed(&step, attempts, &e);
                        last_error = Some(e);
                    }
                }

                match timer.wait_time() {
                    Some(wait) => {
                        debug!(step = %step, attempts, wait_ms = wait.as_millis() as u64, "Waiting before retry");
                        sleep(wait).await;
                    }
                    None => {
                        let err = Error::RetryExhausted {
                            step: step.clone(),
                            attempts,
                            last_error: last_error.map(|e| e.to_string()),
                        };
                        let report = StepReport {
                            attempts,
                            elapsed: started.elapsed(),
                        };
                        observer.scene_finished(&step, &report, Some(&err));
                        return Err(err);
                    }
                }
            }

            let report = StepReport {
                attempts,
                elapsed: started.elapsed(),
            };
            observer.scene_finished(&step, &report, None);

            if index + 1 < total {
                sleep(self.config.interval).await;
            }
        }

        Ok(())
    }

    /// Run the playbook on a private current-thread runtime, blocking the
    /// calling thread until it finishes.
    ///
    /// Fails with [`Error::Config`] when called from inside a tokio runtime.
    pub fn play_blocking(&mut self, registry: &ResourceRegistry) -> Result<()> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Config(
                "play_blocking called from within an async runtime; use play().await".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.play(registry))
    }
}
