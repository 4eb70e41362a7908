// src/attempt/backend.rs

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{exam::Exam, exam_result::NewResult, question::QuestionLink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A second result for the same (exam, student) was rejected by storage.
    UniqueViolation,
    Query(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::UniqueViolation => write!(f, "duplicate exam result"),
            BackendError::Query(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return BackendError::UniqueViolation;
            }
        }
        BackendError::Query(err.to_string())
    }
}

/// Everything the attempt flow reads from and writes to storage.
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Exam record with subject and class names, `None` if it does not exist.
    async fn fetch_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, BackendError>;

    /// Id of the existing result for (exam, student), if any.
    async fn find_result_id(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, BackendError>;

    /// Link rows of an exam with their questions resolved where possible.
    async fn fetch_question_links(&self, exam_id: Uuid) -> Result<Vec<QuestionLink>, BackendError>;

    /// Inserts one result row and returns its id.
    async fn insert_result(&self, result: &NewResult) -> Result<Uuid, BackendError>;
}

#[async_trait]
impl<T: ExamBackend + ?Sized> ExamBackend for Arc<T> {
    async fn fetch_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, BackendError> {
        (**self).fetch_exam(exam_id).await
    }

    async fn find_result_id(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, BackendError> {
        (**self).find_result_id(exam_id, student_id).await
    }

    async fn fetch_question_links(&self, exam_id: Uuid) -> Result<Vec<QuestionLink>, BackendError> {
        (**self).fetch_question_links(exam_id).await
    }

    async fn insert_result(&self, result: &NewResult) -> Result<Uuid, BackendError> {
        (**self).insert_result(result).await
    }
}
