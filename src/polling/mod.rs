//! Session polling engine
//!
//! Tracks one queue session by fetching its status on a schedule. Failures
//! back off exponentially; terminal statuses and an exhausted retry budget
//! end the loop. The next tick is scheduled only after the previous one has
//! finished, so requests for a session never overlap.

pub mod backoff;
pub mod poller;
pub mod timer;

// Re-export commonly used types
pub use backoff::{FailureOutcome, PollOptions, PollState, BACKOFF_FACTOR};
pub use poller::{ErrorCallback, PollCallbacks, PollPhase, PollSnapshot, SessionPoller, UpdateCallback};
pub use timer::{PollTimer, TokioTimer};
