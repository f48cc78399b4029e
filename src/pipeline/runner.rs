//! Periodic cycle scheduler.
//!
//! One cycle runs immediately at startup, then one per interval. Cycles
//! are awaited in sequence and never overlap. A failed cycle is logged and
//! the loop carries on.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::error::{AppError, Result};
use crate::pipeline::cycle::{Notification, Watcher};

/// Where the runner is. `FailedSkip` is the outcome of a tick that was
/// skipped; the runner is back to `Idle` once it has been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Waiting for the next tick
    Idle,
    /// A cycle is in progress
    Running,
    /// The last cycle was skipped after an error
    FailedSkip,
}

/// Drives a `Watcher` on a fixed interval.
pub struct Runner {
    watcher: Arc<Watcher>,
    interval: Duration,
    state: CycleState,
}

impl Runner {
    /// A zero interval is rejected.
    pub fn new(watcher: Arc<Watcher>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AppError::config("cycle interval must be > 0"));
        }
        Ok(Self {
            watcher,
            interval,
            state: CycleState::Idle,
        })
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Run one cycle and log its outcome. Never fails.
    ///
    /// Returns `Idle` or `FailedSkip`; either way the runner is idle
    /// afterwards.
    pub async fn tick(&mut self) -> CycleState {
        self.state = CycleState::Running;

        let outcome = match self.watcher.run_cycle().await {
            Ok(report) => {
                match &report.notification {
                    Notification::Sent => log::info!("Notification sent."),
                    Notification::Failed(reason) => {
                        log::warn!("Notification failed, snapshot advanced anyway: {reason}")
                    }
                    Notification::Skipped => {}
                }
                log::info!(
                    "Cycle complete: {} posts, {} added, {} removed",
                    report.extracted,
                    report.diff.added.len(),
                    report.diff.removed.len()
                );
                CycleState::Idle
            }
            Err(e) if e.is_cycle_skip() => {
                log::warn!("Skipping this run: {e}");
                CycleState::FailedSkip
            }
            Err(e) => {
                log::error!("Cycle aborted without saving: {e}");
                CycleState::FailedSkip
            }
        };

        self.state = CycleState::Idle;
        outcome
    }

    /// Cold-start cycle, then one cycle per interval, forever.
    pub async fn run_forever(&mut self) {
        log::info!(
            "Watching {} every {}s",
            self.watcher.source_url(),
            self.interval.as_secs()
        );
        self.tick().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{self, HealthResponse, HealthState};
    use crate::models::{ExtractorConfig, Post};
    use crate::pipeline::testing::{FakeFetcher, MemoryStore, RecordingNotifier, Response, page};
    use crate::services::PostExtractor;

    struct Harness {
        fetcher: Arc<FakeFetcher>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        runner: Runner,
    }

    fn harness(fetcher: FakeFetcher, interval: Duration) -> Harness {
        let fetcher = Arc::new(fetcher);
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = Watcher::new(
            "https://results.example/",
            fetcher.clone(),
            PostExtractor::new(&ExtractorConfig::default()).unwrap(),
            store.clone(),
            notifier.clone(),
        );
        Harness {
            fetcher,
            store,
            notifier,
            runner: Runner::new(Arc::new(watcher), interval).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_tick_success_returns_idle() {
        let mut h = harness(
            FakeFetcher::page(page(&[("Exam X", "/x")])),
            Duration::from_secs(5),
        );

        assert_eq!(h.runner.tick().await, CycleState::Idle);
        assert_eq!(h.runner.state(), CycleState::Idle);
        assert_eq!(h.store.current(), vec![Post::new("Exam X", "/x")]);
        assert_eq!(h.notifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_tick_failure_returns_failed_skip() {
        let mut h = harness(FakeFetcher::down(), Duration::from_secs(5));

        assert_eq!(h.runner.tick().await, CycleState::FailedSkip);
        assert_eq!(h.runner.state(), CycleState::Idle);
        assert_eq!(h.store.saves(), 0);

        h.fetcher.set(Response::Page(page(&[("Exam X", "/x")])));
        assert_eq!(h.runner.tick().await, CycleState::Idle);
        assert_eq!(h.store.saves(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_then_interval() {
        let mut h = harness(
            FakeFetcher::page(page(&[("Exam X", "/x")])),
            Duration::from_secs(5),
        );

        // Cycles at t=0 (cold start), t=5 and t=10.
        let _ = tokio::time::timeout(Duration::from_secs(12), h.runner.run_forever()).await;

        assert_eq!(h.fetcher.calls(), 3);
        assert_eq!(h.store.saves(), 3);
        // Only the first cycle saw anything new.
        assert_eq!(h.notifier.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_failing_cycles() {
        let mut h = harness(FakeFetcher::down(), Duration::from_secs(5));

        let _ = tokio::time::timeout(Duration::from_secs(12), h.runner.run_forever()).await;

        assert_eq!(h.fetcher.calls(), 3);
        assert_eq!(h.store.saves(), 0);
        assert_eq!(h.runner.state(), CycleState::Idle);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let watcher = Watcher::new(
            "https://results.example/",
            Arc::new(FakeFetcher::down()),
            PostExtractor::new(&ExtractorConfig::default()).unwrap(),
            Arc::new(MemoryStore::default()),
            Arc::new(RecordingNotifier::default()),
        );

        let result = Runner::new(Arc::new(watcher), Duration::ZERO);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_health_answers_while_cycle_hangs() {
        let h = harness(FakeFetcher::hanging(), Duration::from_secs(5));
        let fetcher = h.fetcher.clone();
        let mut runner = h.runner;
        let loop_task = tokio::spawn(async move { runner.run_forever().await });
        tokio::task::yield_now().await;

        let listener = health::bind("127.0.0.1", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(health::serve(listener, HealthState::passive()));

        let response = tokio::time::timeout(
            Duration::from_secs(5),
            reqwest::get(format!("http://{addr}/health")),
        )
        .await
        .expect("health endpoint blocked by the cycle loop")
        .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: HealthResponse = serde_json::from_str(&response.text().await.unwrap()).unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(fetcher.calls(), 1);
        assert!(!loop_task.is_finished());
        loop_task.abort();
    }
}
