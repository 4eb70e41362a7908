// src/attempt/answers.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::exam_result::AnswerSheet;

use super::error::AttemptError;

/// What the candidate currently has for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSlot<'a> {
    Unanswered,
    Answered(&'a str),
}

/// In-memory answers of one attempt plus the navigation cursor.
///
/// Navigation never touches stored answers, and an answer only ever belongs
/// to the question it was set for.
#[derive(Debug, Clone)]
pub struct AnswerStore {
    question_ids: Vec<Uuid>,
    answers: HashMap<Uuid, String>,
    cursor: usize,
}

impl AnswerStore {
    /// `question_ids` in display order.
    pub fn new(question_ids: Vec<Uuid>) -> Self {
        Self {
            question_ids,
            answers: HashMap::new(),
            cursor: 0,
        }
    }

    /// Overwrites any previous answer for the question.
    pub fn set(&mut self, question_id: Uuid, value: impl Into<String>) -> Result<(), AttemptError> {
        if !self.question_ids.contains(&question_id) {
            return Err(AttemptError::UnknownQuestion(question_id));
        }
        self.answers.insert(question_id, value.into());
        Ok(())
    }

    /// An empty string counts as unanswered (a cleared text box).
    pub fn get(&self, question_id: Uuid) -> AnswerSlot<'_> {
        match self.answers.get(&question_id) {
            Some(value) if !value.is_empty() => AnswerSlot::Answered(value),
            _ => AnswerSlot::Unanswered,
        }
    }

    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.question_ids
            .iter()
            .filter(|id| matches!(self.get(**id), AnswerSlot::Answered(_)))
            .count()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> Option<Uuid> {
        self.question_ids.get(self.cursor).copied()
    }

    /// Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        self.jump_to(self.cursor + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(index) => self.jump_to(index),
            None => false,
        }
    }

    /// Out-of-range indexes leave the cursor where it is.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.question_ids.len() && index != self.cursor {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Rounded percentage of the position through the exam, as the progress bar shows it.
    pub fn progress_percent(&self) -> u8 {
        if self.question_ids.is_empty() {
            return 0;
        }
        let pct = ((self.cursor + 1) * 100 + self.question_ids.len() / 2) / self.question_ids.len();
        pct.min(100) as u8
    }

    /// Every question of the exam, with "" for unanswered ones.
    pub fn snapshot(&self) -> AnswerSheet {
        self.question_ids
            .iter()
            .map(|id| {
                let value = match self.get(*id) {
                    AnswerSlot::Answered(v) => v.to_owned(),
                    AnswerSlot::Unanswered => String::new(),
                };
                (*id, value)
            })
            .collect()
    }
}
