// src/attempt/submitter.rs

use uuid::Uuid;

use crate::models::{
    exam_result::{AnswerSheet, GradingStatus, NewResult},
    question::Question,
    user::UserContext,
};

use super::{backend::ExamBackend, error::SubmitError, grader};

/// What started the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// Candidate confirmed the submit dialog.
    Manual,
    /// The countdown reached zero.
    TimerExpired,
}

/// A persisted attempt; `result_id` is where the result detail view goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub result_id: Uuid,
    pub score: u32,
    pub total_marks: u32,
    pub status: GradingStatus,
    pub trigger: SubmitTrigger,
}

/// Builds the result record: every question of the exam gets an entry, "" when
/// unanswered, and answers to questions outside the exam are dropped.
pub fn build_result(
    ctx: &UserContext,
    exam_id: Uuid,
    questions: &[Question],
    answers: &AnswerSheet,
) -> NewResult {
    let sheet: AnswerSheet = questions
        .iter()
        .map(|q| (q.id, answers.get(&q.id).cloned().unwrap_or_default()))
        .collect();

    let grade = grader::grade(questions, &sheet);

    NewResult {
        exam_id,
        student_id: ctx.user_id,
        answers: sheet,
        score: grade.score,
        total_marks: grade.total_marks,
        status: grade.status,
    }
}

/// Grades and writes exactly one result. Never retries; a duplicate rejected
/// by storage comes back as [`SubmitError::AlreadyAttempted`].
pub async fn submit<B: ExamBackend + ?Sized>(
    backend: &B,
    ctx: &UserContext,
    exam_id: Uuid,
    questions: &[Question],
    answers: &AnswerSheet,
    trigger: SubmitTrigger,
) -> Result<SubmissionReceipt, SubmitError> {
    let result = build_result(ctx, exam_id, questions, answers);

    tracing::info!(
        "Submitting exam {} for student {} ({:?}): score {}/{}, status {}",
        exam_id,
        ctx.user_id,
        trigger,
        result.score,
        result.total_marks,
        result.status
    );

    let result_id = backend.insert_result(&result).await.map_err(|e| {
        tracing::error!("Failed to submit exam {}: {}", exam_id, e);
        SubmitError::from(e)
    })?;

    tracing::info!("Exam {} submitted as result {}", exam_id, result_id);

    Ok(SubmissionReceipt {
        result_id,
        score: result.score,
        total_marks: result.total_marks,
        status: result.status,
        trigger,
    })
}
