//! The session poll loop and its owner
//!
//! A [`SessionPoller`] owns at most one running loop. Starting a new loop
//! cancels the previous one; stopping is idempotent. Every loop carries a
//! generation number, and a loop whose generation is no longer current never
//! touches shared state or invokes callbacks again.

use crate::client::MatchmakingTransport;
use crate::error::{MatchmakingError, Result};
use crate::metrics::MetricsCollector;
use crate::polling::backoff::{FailureOutcome, PollOptions, PollState};
use crate::polling::timer::{PollTimer, TokioTimer};
use crate::types::{QueueSession, SessionId, SessionStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Receives every successfully fetched session state
pub type UpdateCallback = Arc<dyn Fn(QueueSession) + Send + Sync>;

/// Receives failed ticks that will be retried, with the current retry count
pub type ErrorCallback = Arc<dyn Fn(&MatchmakingError, u32) + Send + Sync>;

/// Callbacks for one poll loop
#[derive(Clone)]
pub struct PollCallbacks {
    on_update: UpdateCallback,
    on_error: Option<ErrorCallback>,
}

impl PollCallbacks {
    pub fn new<F>(on_update: F) -> Self
    where
        F: Fn(QueueSession) + Send + Sync + 'static,
    {
        Self {
            on_update: Arc::new(on_update),
            on_error: None,
        }
    }

    /// Observe failed ticks. Purely advisory: the loop behaves the same
    /// with or without it.
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&MatchmakingError, u32) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }
}

impl std::fmt::Debug for PollCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollCallbacks")
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

/// Where the poll loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollPhase {
    /// Nothing has been polled yet
    Idle,
    /// Waiting for the next regular tick
    Polling,
    /// Waiting to retry after a failed tick
    Backoff,
    /// Stopped by the caller, a terminal status or the retry budget
    Stopped,
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollPhase::Idle => write!(f, "idle"),
            PollPhase::Polling => write!(f, "polling"),
            PollPhase::Backoff => write!(f, "backoff"),
            PollPhase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Point-in-time view of the poll loop state
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    pub phase: PollPhase,
    pub session_id: Option<SessionId>,
    pub current_interval: Duration,
    pub retry_count: u32,
    pub last_status: Option<SessionStatus>,
}

impl Default for PollSnapshot {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            session_id: None,
            current_interval: Duration::ZERO,
            retry_count: 0,
            last_status: None,
        }
    }
}

struct ActiveLoop {
    generation: u64,
    session_id: SessionId,
    handle: JoinHandle<()>,
}

struct Shared {
    generation: AtomicU64,
    active: Mutex<Option<ActiveLoop>>,
    snapshot: Mutex<PollSnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Apply `update` only if the loop is still the current one
    fn update_snapshot(&self, generation: u64, update: impl FnOnce(&mut PollSnapshot)) {
        let mut snapshot = lock(&self.snapshot);
        if self.is_current(generation) {
            update(&mut snapshot);
        }
    }

    /// Release the active slot if it still belongs to `generation`
    fn finish(&self, generation: u64) -> bool {
        let mut active = lock(&self.active);
        if matches!(active.as_ref(), Some(current) if current.generation == generation) {
            active.take();
            true
        } else {
            false
        }
    }
}

/// Polls one queue session at a time
pub struct SessionPoller {
    transport: Arc<dyn MatchmakingTransport>,
    timer: Arc<dyn PollTimer>,
    metrics: Option<Arc<MetricsCollector>>,
    shared: Arc<Shared>,
}

impl SessionPoller {
    pub fn new(transport: Arc<dyn MatchmakingTransport>) -> Self {
        Self {
            transport,
            timer: Arc::new(TokioTimer),
            metrics: None,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                active: Mutex::new(None),
                snapshot: Mutex::new(PollSnapshot::default()),
            }),
        }
    }

    /// Replace the timer used to wait between ticks
    pub fn with_timer(mut self, timer: Arc<dyn PollTimer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start tracking `session_id`, replacing any loop already running
    ///
    /// Returns as soon as the first tick is scheduled (after
    /// `options.initial_interval`). Only invalid input is reported here;
    /// fetch failures go to the error callback and the backoff schedule.
    /// Must be called from within a Tokio runtime.
    pub fn start_polling(
        &self,
        session_id: &str,
        callbacks: PollCallbacks,
        options: PollOptions,
    ) -> Result<()> {
        if session_id.trim().is_empty() {
            return Err(MatchmakingError::validation("session id must not be empty"));
        }
        options.validate()?;
        let runtime = Handle::try_current().map_err(|_| MatchmakingError::Configuration {
            message: "polling requires a running Tokio runtime".to_string(),
        })?;

        // Hold the slot while spawning so a loop that ends early cannot
        // release it before it is recorded
        let mut active = lock(&self.shared.active);
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = active.take() {
            previous.handle.abort();
            info!(
                "Cancelled polling of session {} in favour of {}",
                previous.session_id, session_id
            );
        }

        *lock(&self.shared.snapshot) = PollSnapshot {
            phase: PollPhase::Polling,
            session_id: Some(session_id.to_string()),
            current_interval: options.initial_interval,
            retry_count: 0,
            last_status: None,
        };

        let poll_loop = PollLoop {
            session_id: session_id.to_string(),
            generation,
            options,
            callbacks,
            transport: self.transport.clone(),
            timer: self.timer.clone(),
            metrics: self.metrics.clone(),
            shared: self.shared.clone(),
        };
        let handle = runtime.spawn(poll_loop.run());

        *active = Some(ActiveLoop {
            generation,
            session_id: session_id.to_string(),
            handle,
        });

        if let Some(metrics) = &self.metrics {
            metrics.set_polling_active(true);
        }

        info!(
            "Started polling session {} (interval {:?}, max {:?}, max retries {})",
            session_id, options.initial_interval, options.max_interval, options.max_retries
        );
        Ok(())
    }

    /// Cancel the running loop, if any. Safe to call in any state.
    pub fn stop_polling(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);

        let stopped = lock(&self.shared.active).take();
        if let Some(active) = stopped {
            active.handle.abort();
            info!("Stopped polling session {}", active.session_id);
        }

        let mut snapshot = lock(&self.shared.snapshot);
        if snapshot.phase != PollPhase::Idle {
            snapshot.phase = PollPhase::Stopped;
        }
        drop(snapshot);

        if let Some(metrics) = &self.metrics {
            metrics.set_polling_active(false);
        }
    }

    /// Stop polling only if the running loop tracks `session_id`
    pub fn stop_session(&self, session_id: &str) -> bool {
        let tracks_session = matches!(
            lock(&self.shared.active).as_ref(),
            Some(active) if active.session_id == session_id
        );
        if tracks_session {
            self.stop_polling();
        }
        tracks_session
    }

    /// True while a loop is scheduled or in flight
    pub fn is_polling(&self) -> bool {
        lock(&self.shared.active).is_some()
    }

    /// Session tracked by the running loop
    pub fn active_session(&self) -> Option<SessionId> {
        lock(&self.shared.active)
            .as_ref()
            .map(|active| active.session_id.clone())
    }

    pub fn snapshot(&self) -> PollSnapshot {
        lock(&self.shared.snapshot).clone()
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        if let Some(active) = lock(&self.shared.active).take() {
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            active.handle.abort();
            debug!("Poller dropped; cancelled polling of {}", active.session_id);
        }
    }
}

/// State moved into the spawned task
struct PollLoop {
    session_id: SessionId,
    generation: u64,
    options: PollOptions,
    callbacks: PollCallbacks,
    transport: Arc<dyn MatchmakingTransport>,
    timer: Arc<dyn PollTimer>,
    metrics: Option<Arc<MetricsCollector>>,
    shared: Arc<Shared>,
}

impl PollLoop {
    async fn run(self) {
        let mut state = PollState::new(self.options);
        let mut delay = self.options.initial_interval;
        let mut last_elapsed = 0u64;

        loop {
            self.timer.sleep(delay).await;
            if !self.shared.is_current(self.generation) {
                return;
            }

            debug!("Polling status of session {}", self.session_id);
            let result = self.transport.get_session_status(&self.session_id).await;
            if !self.shared.is_current(self.generation) {
                return;
            }

            match result {
                Ok(mut session) => {
                    state.record_success();
                    self.record(|m| m.record_poll(true));

                    // Elapsed time never runs backwards while the session lives
                    session.elapsed_seconds = session.elapsed_seconds.max(last_elapsed);
                    last_elapsed = session.elapsed_seconds;

                    let status = session.status;
                    let terminal = status.is_terminal();
                    self.shared.update_snapshot(self.generation, |snapshot| {
                        snapshot.phase = if terminal {
                            PollPhase::Stopped
                        } else {
                            PollPhase::Polling
                        };
                        snapshot.current_interval = state.current_interval();
                        snapshot.retry_count = 0;
                        snapshot.last_status = Some(status);
                    });

                    if terminal {
                        self.shared.finish(self.generation);
                        self.record(|m| {
                            m.record_terminal_status(status);
                            m.set_polling_active(false);
                        });
                        info!(
                            "Session {} reached terminal status {}; polling stopped",
                            self.session_id, status
                        );
                        (self.callbacks.on_update)(session);
                        return;
                    }

                    debug!(
                        "Session {} is {} (position {}, ~{}s left)",
                        self.session_id,
                        status,
                        session.queue_position,
                        session.estimated_wait_seconds
                    );
                    (self.callbacks.on_update)(session);
                    delay = state.current_interval();
                }
                Err(err) => {
                    self.record(|m| m.record_poll(false));

                    match state.record_failure() {
                        FailureOutcome::GiveUp { retry_count } => {
                            let give_up = MatchmakingError::MaxRetriesExceeded {
                                session_id: self.session_id.clone(),
                                retries: retry_count,
                            };
                            error!("{} (last error: {})", give_up, err);

                            self.shared.update_snapshot(self.generation, |snapshot| {
                                snapshot.phase = PollPhase::Stopped;
                                snapshot.retry_count = retry_count;
                            });
                            self.shared.finish(self.generation);
                            self.record(|m| {
                                m.record_give_up();
                                m.set_polling_active(false);
                            });
                            return;
                        }
                        FailureOutcome::Retry {
                            delay: next,
                            retry_count,
                        } => {
                            warn!(
                                "Polling session {} failed (attempt {}): {}. Retrying in {:?}",
                                self.session_id, retry_count, err, next
                            );

                            self.shared.update_snapshot(self.generation, |snapshot| {
                                snapshot.phase = PollPhase::Backoff;
                                snapshot.current_interval = next;
                                snapshot.retry_count = retry_count;
                            });
                            if let Some(on_error) = &self.callbacks.on_error {
                                on_error(&err, retry_count);
                            }
                            delay = next;
                        }
                    }
                }
            }
        }
    }

    fn record(&self, f: impl FnOnce(&MetricsCollector)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
