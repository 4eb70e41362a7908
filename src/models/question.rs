// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// How a question is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Single designated correct choice, auto-gradable.
    Objective,
    /// Needs a teacher's judgment.
    FreeText,
}

impl QuestionKind {
    /// Maps the stored `type` column. Only `mcq` (or `objective`) is
    /// auto-gradable; everything else goes to manual review.
    pub fn from_db(value: &str) -> Self {
        match value {
            "mcq" | "objective" => QuestionKind::Objective,
            _ => QuestionKind::FreeText,
        }
    }
}

/// Represents the 'questions' table in the database.
/// `options` is kept raw; see `attempt::options` for normalization.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: Uuid,
    pub text: String,

    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    pub question_type: String,

    pub options: Option<serde_json::Value>,
    pub marks: i32,
    pub correct_answer: Option<String>,
}

/// One `exam_questions` row with its question resolved, if it could be.
#[derive(Debug, Clone)]
pub struct QuestionLink {
    pub question_id: Uuid,
    pub position: i32,
    pub question: Option<QuestionRecord>,
}

/// Canonical shape of a choice after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
}

/// A question ready for an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub kind: QuestionKind,
    pub marks: u32,
    pub options: Vec<ChoiceOption>,
    pub correct_answer: Option<String>,
}

/// DTO for sending a question to the candidate (excludes the correct answer).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub text: String,
    pub kind: QuestionKind,
    pub marks: u32,
    pub options: Vec<ChoiceOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            kind: q.kind,
            marks: q.marks,
            options: q.options.clone(),
        }
    }
}
