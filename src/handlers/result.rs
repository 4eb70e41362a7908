// src/handlers/result.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam_result::{ExamResult, GradeResultRequest, GradingStatus, ResultListEntry},
        user::Role,
    },
    utils::{html::clean_html, jwt::Claims},
};

async fn fetch_result(pool: &PgPool, id: Uuid) -> Result<ExamResult, AppError> {
    sqlx::query_as::<_, ExamResult>(
        r#"
        SELECT id, exam_id, student_id, score, total_marks, status, answers,
               feedback, graded_by, created_at, updated_at
        FROM exam_results
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch result {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Result not found".to_string()))
}

/// Lists the current student's results with exam titles.
pub async fn list_mine(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;

    let results = sqlx::query_as::<_, ResultListEntry>(
        r#"
        SELECT r.id, r.exam_id, e.title AS exam_title, r.score, r.total_marks,
               r.status, r.created_at
        FROM exam_results r
        JOIN exams e ON e.id = r.exam_id
        WHERE r.student_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(ctx.user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Result detail. Students only see their own results.
pub async fn get_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let result = fetch_result(&pool, id).await?;

    if ctx.role == Role::Student && result.student_id != ctx.user_id {
        // Same answer as a missing row, so ids of other students' results don't leak.
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(Json(result))
}

/// Manual grading of a pending result. Teacher/admin only.
///
/// * Allowed once: `pending → graded`.
/// * The score must lie within `0..=total_marks`.
/// * Feedback is sanitized before storage.
pub async fn grade_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GradeResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let ctx = claims.context()?;
    let result = fetch_result(&pool, id).await?;

    if result.status == GradingStatus::Graded {
        return Err(AppError::Conflict("Result already graded".to_string()));
    }

    if payload.score > result.total_marks {
        return Err(AppError::BadRequest(format!(
            "Score {} exceeds total marks {}",
            payload.score, result.total_marks
        )));
    }

    let feedback = payload.feedback.as_deref().map(clean_html);

    // The status condition keeps two graders from both succeeding.
    let updated = sqlx::query_as::<_, ExamResult>(
        r#"
        UPDATE exam_results
        SET score = $1, feedback = $2, status = 'graded', graded_by = $3, updated_at = NOW()
        WHERE id = $4 AND status = 'pending'
        RETURNING id, exam_id, student_id, score, total_marks, status, answers,
                  feedback, graded_by, created_at, updated_at
        "#,
    )
    .bind(payload.score)
    .bind(feedback)
    .bind(ctx.user_id)
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to grade result {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::Conflict("Result already graded".to_string()))?;

    tracing::info!("Result {} graded by {}: {}", id, ctx.user_id, updated.score);

    Ok(Json(updated))
}
