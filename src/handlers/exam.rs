// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    attempt::{
        ExamBackend, SubmitTrigger,
        guard::{self, Admission},
        loader, submitter,
    },
    error::AppError,
    models::{
        exam::{AvailableExam, Exam, UpdateExamStatusRequest},
        exam_result::{ExamResult, SubmitAnswersRequest, SubmitAnswersResponse},
        question::PublicQuestion,
        user::UserContext,
    },
    store::PgStore,
    utils::jwt::Claims,
};

/// DTO for an admitted attempt: the exam header plus questions without answers.
#[derive(Debug, Serialize)]
pub struct ExamPaper {
    pub exam_id: Uuid,
    pub title: String,
    pub subject_name: Option<String>,
    pub class_name: Option<String>,
    pub duration_seconds: u32,
    pub total_marks: i32,
    pub questions: Vec<PublicQuestion>,
}

/// Lists active exams for the current student, flagging the ones already attempted.
pub async fn list_available(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;

    let exams = sqlx::query_as::<_, AvailableExam>(
        r#"
        SELECT
            e.id, e.title, e.description, e.duration, e.total_marks,
            e.start_time, e.end_time,
            s.name AS subject_name,
            EXISTS (
                SELECT 1 FROM exam_results r
                WHERE r.exam_id = e.id AND r.student_id = $1
            ) AS attempted
        FROM exams e
        LEFT JOIN subjects s ON s.id = e.subject_id
        WHERE e.status = 'active'
        ORDER BY e.start_time
        "#,
    )
    .bind(ctx.user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(exams))
}

/// Admits the student and returns the question paper.
///
/// * Denies with 403 if a result already exists or the exam is not active.
/// * 404 if the exam has no questions or some could not be loaded.
pub async fn start_attempt(
    State(store): State<PgStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;

    let exam = match guard::check_admission(&store, &ctx, exam_id).await? {
        Admission::Allowed(exam) => exam,
        Admission::Denied(denial) => return Err(AppError::Forbidden(denial.to_string())),
    };

    let questions = loader::load_question_set(&store, exam_id).await?;

    Ok(Json(ExamPaper {
        exam_id: exam.id,
        title: exam.title.clone(),
        subject_name: exam.subject_name.clone(),
        class_name: exam.class_name.clone(),
        duration_seconds: exam.duration_seconds(),
        total_marks: exam.total_marks,
        questions: questions.iter().map(PublicQuestion::from).collect(),
    }))
}

/// Grades and stores the student's answers.
///
/// * 403 unless the exam is active.
/// * The unique (exam, student) constraint turns a second submission into
///   409 Conflict.
pub async fn submit_attempt(
    State(store): State<PgStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;

    if let Admission::Denied(denial) = guard::check_active(&store, exam_id).await? {
        return Err(AppError::Forbidden(denial.to_string()));
    }

    let questions = loader::load_question_set(&store, exam_id).await?;
    let receipt = submitter::submit(
        &store,
        &ctx,
        exam_id,
        &questions,
        &req.answers,
        SubmitTrigger::Manual,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitAnswersResponse {
            result_id: receipt.result_id,
            score: receipt.score,
            total_marks: receipt.total_marks,
            status: receipt.status,
        }),
    ))
}

/// Loads an exam the caller may manage: its creator or an admin.
async fn managed_exam(store: &PgStore, ctx: &UserContext, exam_id: Uuid) -> Result<Exam, AppError> {
    let exam = store
        .fetch_exam(exam_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    if !exam.is_managed_by(ctx) {
        return Err(AppError::Forbidden(
            "You can only manage your own exams".to_string(),
        ));
    }
    Ok(exam)
}

/// Moves an exam forward through its lifecycle.
/// Teachers may only change their own exams; admins any.
pub async fn update_status(
    State(store): State<PgStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<Uuid>,
    Json(req): Json<UpdateExamStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let exam = managed_exam(&store, &ctx, exam_id).await?;

    if !exam.status.can_transition_to(req.status) {
        return Err(AppError::BadRequest(format!(
            "Cannot move exam from '{}' to '{}'",
            exam.status, req.status
        )));
    }

    sqlx::query("UPDATE exams SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(req.status.as_str())
        .bind(exam_id)
        .execute(store.pool())
        .await
        .map_err(|e| {
            tracing::error!("Failed to update exam status: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(
        "Exam {} moved from {} to {} by {}",
        exam_id,
        exam.status,
        req.status,
        ctx.user_id
    );

    Ok(StatusCode::OK)
}

/// Lists all results of an exam, newest first.
/// Teachers see results of their own exams only; admins any.
pub async fn list_exam_results(
    State(store): State<PgStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    managed_exam(&store, &ctx, exam_id).await?;
    let results = sqlx::query_as::<_, ExamResult>(
        r#"
        SELECT id, exam_id, student_id, score, total_marks, status, answers,
               feedback, graded_by, created_at, updated_at
        FROM exam_results
        WHERE exam_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(exam_id)
    .fetch_all(store.pool())
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exam results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}
