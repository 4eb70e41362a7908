// src/models/exam_result.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

/// Per-question answers keyed by question id. Unanswered questions hold "".
pub type AnswerSheet = BTreeMap<Uuid, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingStatus {
    /// Every answer has a final score.
    Graded,
    /// At least one free-text answer awaits a teacher.
    Pending,
}

impl GradingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GradingStatus::Graded => "graded",
            GradingStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for GradingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graded" => Ok(GradingStatus::Graded),
            "pending" => Ok(GradingStatus::Pending),
            other => Err(format!("unknown grading status '{}'", other)),
        }
    }
}

impl TryFrom<String> for GradingStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'exam_results' table in the database.
/// At most one row per (exam_id, student_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub score: i32,
    pub total_marks: i32,
    #[sqlx(try_from = "String")]
    pub status: GradingStatus,
    pub answers: Json<AnswerSheet>,
    pub feedback: Option<String>,
    pub graded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The record the submitter writes for one finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewResult {
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub answers: AnswerSheet,
    pub score: u32,
    pub total_marks: u32,
    pub status: GradingStatus,
}

/// A student's result joined with the exam title, for the results list.
#[derive(Debug, Serialize, FromRow)]
pub struct ResultListEntry {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub exam_title: String,
    pub score: i32,
    pub total_marks: i32,
    #[sqlx(try_from = "String")]
    pub status: GradingStatus,
    pub created_at: DateTime<Utc>,
}

/// DTO for submitting an attempt over HTTP.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: AnswerSheet,
}

/// DTO for submission confirmation, pointing at the result detail view.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswersResponse {
    pub result_id: Uuid,
    pub score: u32,
    pub total_marks: u32,
    pub status: GradingStatus,
}

/// DTO for a teacher's manual grading of a pending result.
#[derive(Debug, Deserialize, Validate)]
pub struct GradeResultRequest {
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
}
