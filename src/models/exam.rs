// src/models/exam.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::{Role, UserContext};

/// Exam lifecycle: `draft → scheduled → active → completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Scheduled => "scheduled",
            ExamStatus::Active => "active",
            ExamStatus::Completed => "completed",
        }
    }

    /// Transitions only move forward; a stage may be skipped.
    pub fn can_transition_to(self, next: ExamStatus) -> bool {
        next > self
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ExamStatus::Draft),
            "scheduled" => Ok(ExamStatus::Scheduled),
            "active" => Ok(ExamStatus::Active),
            "completed" => Ok(ExamStatus::Completed),
            other => Err(format!("unknown exam status '{}'", other)),
        }
    }
}

impl TryFrom<String> for ExamStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'exams' table, joined with subject and class names.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Allowed time in minutes.
    #[sqlx(rename = "duration")]
    pub duration_minutes: i32,

    pub total_marks: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    #[sqlx(try_from = "String")]
    pub status: ExamStatus,

    pub subject_id: Uuid,
    pub class_id: Uuid,
    pub subject_name: Option<String>,
    pub class_name: Option<String>,
    pub created_by: Uuid,
}

impl Exam {
    /// Countdown length for an attempt. Negative durations count as zero.
    pub fn duration_seconds(&self) -> u32 {
        u32::try_from(self.duration_minutes).unwrap_or(0).saturating_mul(60)
    }

    /// Lifecycle changes and result lists belong to the creator and admins.
    pub fn is_managed_by(&self, ctx: &UserContext) -> bool {
        ctx.role == Role::Admin || (ctx.role == Role::Teacher && self.created_by == ctx.user_id)
    }
}

/// Row of the student's exam list.
#[derive(Debug, Serialize, FromRow)]
pub struct AvailableExam {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(rename = "duration")]
    pub duration_minutes: i32,
    pub total_marks: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub subject_name: Option<String>,
    pub attempted: bool,
}

/// DTO for moving an exam through its lifecycle.
#[derive(Debug, Deserialize)]
pub struct UpdateExamStatusRequest {
    pub status: ExamStatus,
}
