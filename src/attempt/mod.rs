// src/attempt/mod.rs

//! The timed exam-attempt flow.
//!
//! Attempt guard → question loader → timer + answer store → grader → submitter.
//! Storage is reached only through [`ExamBackend`], and the caller's identity is
//! passed in as a [`UserContext`](crate::models::user::UserContext).

pub mod answers;
pub mod backend;
pub mod driver;
pub mod error;
pub mod grader;
pub mod guard;
pub mod loader;
pub mod options;
pub mod session;
pub mod submitter;
pub mod timer;

pub use backend::{BackendError, ExamBackend};
pub use driver::{AttemptCommand, AttemptEvent, AttemptOutcome, drive};
pub use error::{AttemptError, Denial, LoadError, SubmitError};
pub use session::AttemptSession;
pub use submitter::{SubmissionReceipt, SubmitTrigger};
pub use timer::{ExamTimer, IntervalTicker, Ticker, TimerEvent, TimerState};
