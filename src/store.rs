// src/store.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use crate::{
    attempt::backend::{BackendError, ExamBackend},
    models::{
        exam::Exam,
        exam_result::NewResult,
        question::{QuestionLink, QuestionRecord},
    },
};

/// Exam columns joined with subject and class names. Shared by every query
/// that returns an [`Exam`].
pub const EXAM_SELECT: &str = r#"
    SELECT
        e.id, e.title, e.description, e.duration, e.total_marks,
        e.start_time, e.end_time, e.status, e.subject_id, e.class_id,
        s.name AS subject_name, c.name AS class_name, e.created_by
    FROM exams e
    LEFT JOIN subjects s ON s.id = e.subject_id
    LEFT JOIN classes c ON c.id = e.class_id
"#;

/// PostgreSQL implementation of the attempt flow's storage.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `exam_questions` left-joined with `questions`; question columns are null
/// when the record cannot be resolved.
#[derive(FromRow)]
struct LinkRow {
    question_id: Uuid,
    position: i32,
    q_id: Option<Uuid>,
    text: Option<String>,
    question_type: Option<String>,
    options: Option<serde_json::Value>,
    marks: Option<i32>,
    correct_answer: Option<String>,
}

impl From<LinkRow> for QuestionLink {
    fn from(row: LinkRow) -> Self {
        let question = match (row.q_id, row.text, row.question_type, row.marks) {
            (Some(id), Some(text), Some(question_type), Some(marks)) => Some(QuestionRecord {
                id,
                text,
                question_type,
                options: row.options,
                marks,
                correct_answer: row.correct_answer,
            }),
            _ => None,
        };

        QuestionLink {
            question_id: row.question_id,
            position: row.position,
            question,
        }
    }
}

fn to_db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl ExamBackend for PgStore {
    async fn fetch_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, BackendError> {
        let query = format!("{} WHERE e.id = $1", EXAM_SELECT);
        let exam = sqlx::query_as::<_, Exam>(&query)
            .bind(exam_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(exam)
    }

    async fn find_result_id(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, BackendError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM exam_results WHERE exam_id = $1 AND student_id = $2",
        )
        .bind(exam_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn fetch_question_links(&self, exam_id: Uuid) -> Result<Vec<QuestionLink>, BackendError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT
                eq.question_id,
                eq.position,
                q.id AS q_id,
                q.text,
                q.type AS question_type,
                q.options,
                q.marks,
                q.correct_answer
            FROM exam_questions eq
            LEFT JOIN questions q ON q.id = eq.question_id
            WHERE eq.exam_id = $1
            ORDER BY eq.position, eq.created_at
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuestionLink::from).collect())
    }

    async fn insert_result(&self, result: &NewResult) -> Result<Uuid, BackendError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO exam_results (exam_id, student_id, score, total_marks, status, answers)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(result.exam_id)
        .bind(result.student_id)
        .bind(to_db_int(result.score))
        .bind(to_db_int(result.total_marks))
        .bind(result.status.as_str())
        .bind(Json(&result.answers))
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(q_id: Option<Uuid>) -> LinkRow {
        LinkRow {
            question_id: Uuid::new_v4(),
            position: 3,
            q_id,
            text: Some("What is 2 + 2?".to_string()),
            question_type: Some("mcq".to_string()),
            options: None,
            marks: Some(1),
            correct_answer: Some("1".to_string()),
        }
    }

    #[test]
    fn test_link_row_with_missing_question_is_unresolved() {
        let link = QuestionLink::from(row(None));
        assert!(link.question.is_none());
        assert_eq!(link.position, 3);
    }

    #[test]
    fn test_link_row_resolves_question() {
        let id = Uuid::new_v4();
        let link = QuestionLink::from(row(Some(id)));
        let question = link.question.unwrap();
        assert_eq!(question.id, id);
        assert_eq!(question.question_type, "mcq");
    }

    #[test]
    fn test_to_db_int_saturates() {
        assert_eq!(to_db_int(10), 10);
        assert_eq!(to_db_int(u32::MAX), i32::MAX);
    }
}
