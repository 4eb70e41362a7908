// src/attempt/error.rs

use std::fmt;

use uuid::Uuid;

use crate::models::exam::ExamStatus;

use super::backend::BackendError;

/// Why the attempt guard refused entry. Terminal for the screen instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    AlreadyAttempted,
    NotActive { status: ExamStatus },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::AlreadyAttempted => write!(
                f,
                "You have already attempted this exam. You can only take an exam once."
            ),
            Denial::NotActive { status } => write!(
                f,
                "This exam is not active yet. Current status: {}",
                status
            ),
        }
    }
}

/// Failures while fetching the exam or its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    ExamNotFound,
    /// The exam has no linked questions.
    NoQuestions,
    /// Linked questions exist but some records could not be read.
    Unresolved { missing: usize },
    Query(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ExamNotFound => write!(f, "Exam not found"),
            LoadError::NoQuestions => write!(
                f,
                "This exam doesn't have any questions yet. Please contact your teacher."
            ),
            LoadError::Unresolved { missing } => write!(
                f,
                "{} question(s) of this exam could not be loaded. This could be due to permission issues or missing question records.",
                missing
            ),
            LoadError::Query(msg) => write!(f, "Failed to load exam: {}", msg),
        }
    }
}

impl From<BackendError> for LoadError {
    fn from(err: BackendError) -> Self {
        LoadError::Query(err.to_string())
    }
}

/// Failures of the final write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The storage uniqueness constraint rejected a second result.
    AlreadyAttempted,
    Backend(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::AlreadyAttempted => write!(f, "{}", Denial::AlreadyAttempted),
            SubmitError::Backend(msg) => write!(f, "Failed to submit exam: {}", msg),
        }
    }
}

impl From<BackendError> for SubmitError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::UniqueViolation => SubmitError::AlreadyAttempted,
            BackendError::Query(msg) => SubmitError::Backend(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Only students take exams.
    Unauthorized,
    Denied(Denial),
    Load(LoadError),
    Submit(SubmitError),
    UnknownQuestion(Uuid),
    /// Answers are frozen (time is up or submission started).
    InputClosed,
    /// Manual submission needs `request_submit` first.
    ConfirmationRequired,
    AlreadySubmitting,
    AlreadySubmitted,
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Unauthorized => write!(f, "Only students can take exams"),
            AttemptError::Denied(d) => write!(f, "{}", d),
            AttemptError::Load(e) => write!(f, "{}", e),
            AttemptError::Submit(e) => write!(f, "{}", e),
            AttemptError::UnknownQuestion(id) => write!(f, "Question {} is not part of this exam", id),
            AttemptError::InputClosed => write!(f, "Answers can no longer be changed"),
            AttemptError::ConfirmationRequired => write!(f, "Submission must be confirmed first"),
            AttemptError::AlreadySubmitting => write!(f, "Submission already in progress"),
            AttemptError::AlreadySubmitted => write!(f, "Exam already submitted"),
        }
    }
}

impl std::error::Error for AttemptError {}
impl std::error::Error for LoadError {}
impl std::error::Error for SubmitError {}

impl From<Denial> for AttemptError {
    fn from(d: Denial) -> Self {
        AttemptError::Denied(d)
    }
}

impl From<LoadError> for AttemptError {
    fn from(e: LoadError) -> Self {
        AttemptError::Load(e)
    }
}

impl From<SubmitError> for AttemptError {
    fn from(e: SubmitError) -> Self {
        match e {
            // A duplicate caught at write time is the same condition the guard reports.
            SubmitError::AlreadyAttempted => AttemptError::Denied(Denial::AlreadyAttempted),
            other => AttemptError::Submit(other),
        }
    }
}
