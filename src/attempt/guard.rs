// src/attempt/guard.rs

use uuid::Uuid;

use crate::models::{
    exam::{Exam, ExamStatus},
    user::UserContext,
};

use super::{
    backend::ExamBackend,
    error::{Denial, LoadError},
};

/// Outcome of the admission check.
#[derive(Debug, Clone)]
pub enum Admission {
    Allowed(Exam),
    Denied(Denial),
}

/// Decides whether `ctx` may start an attempt on `exam_id`.
///
/// An existing result denies entry before the exam status is even looked at.
/// Backend failures are returned as errors; the guard never admits on error.
pub async fn check_admission<B: ExamBackend + ?Sized>(
    backend: &B,
    ctx: &UserContext,
    exam_id: Uuid,
) -> Result<Admission, LoadError> {
    if let Some(result_id) = backend.find_result_id(exam_id, ctx.user_id).await? {
        tracing::info!(
            "Student {} already has result {} for exam {}",
            ctx.user_id,
            result_id,
            exam_id
        );
        return Ok(Admission::Denied(Denial::AlreadyAttempted));
    }

    check_active(backend, exam_id).await
}

/// The status half of the admission check, for the write path: a result may
/// only be recorded while the exam is active. Duplicates are left to the
/// storage uniqueness constraint.
pub async fn check_active<B: ExamBackend + ?Sized>(
    backend: &B,
    exam_id: Uuid,
) -> Result<Admission, LoadError> {
    let exam = backend
        .fetch_exam(exam_id)
        .await?
        .ok_or(LoadError::ExamNotFound)?;

    if exam.status != ExamStatus::Active {
        tracing::info!("Exam {} is not active (status: {})", exam_id, exam.status);
        return Ok(Admission::Denied(Denial::NotActive {
            status: exam.status,
        }));
    }

    Ok(Admission::Allowed(exam))
}
