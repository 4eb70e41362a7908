// src/attempt/grader.rs

use crate::models::{
    exam_result::{AnswerSheet, GradingStatus},
    question::{Question, QuestionKind},
};

/// Auto-grading outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub score: u32,
    pub total_marks: u32,
    pub status: GradingStatus,
}

/// Scores objective questions by exact match against the correct choice id.
///
/// `total_marks` counts every question whether answered or not. Free-text
/// questions score 0 here and leave the result pending.
pub fn grade(questions: &[Question], answers: &AnswerSheet) -> Grade {
    let mut score = 0u32;
    let mut total_marks = 0u32;
    let mut needs_review = false;

    for question in questions {
        total_marks = total_marks.saturating_add(question.marks);

        match question.kind {
            QuestionKind::Objective => {
                let given = answers.get(&question.id).map(String::as_str).unwrap_or("");
                let correct = question.correct_answer.as_deref();
                if !given.is_empty() && correct == Some(given) {
                    score = score.saturating_add(question.marks);
                }
            }
            QuestionKind::FreeText => needs_review = true,
        }
    }

    let status = if needs_review {
        GradingStatus::Pending
    } else {
        GradingStatus::Graded
    };

    Grade {
        score,
        total_marks,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn question(kind: QuestionKind, marks: u32, correct: Option<&str>) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "q".to_string(),
            kind,
            marks,
            options: Vec::new(),
            correct_answer: correct.map(str::to_owned),
        }
    }

    #[test]
    fn test_mixed_exam_scores_objective_only() {
        let q1 = question(QuestionKind::Objective, 2, Some("a"));
        let q2 = question(QuestionKind::Objective, 3, Some("b"));
        let q3 = question(QuestionKind::FreeText, 5, None);

        let mut answers = AnswerSheet::new();
        answers.insert(q1.id, "a".to_string());
        answers.insert(q2.id, "c".to_string());
        answers.insert(q3.id, "a long essay".to_string());

        let grade = grade(&[q1, q2, q3], &answers);
        assert_eq!(grade.score, 2);
        assert_eq!(grade.total_marks, 10);
        assert_eq!(grade.status, GradingStatus::Pending);
    }

    #[test]
    fn test_objective_only_exam_is_graded() {
        let q1 = question(QuestionKind::Objective, 4, Some("0"));
        let q2 = question(QuestionKind::Objective, 1, Some("2"));
        let mut answers = AnswerSheet::new();
        answers.insert(q1.id, "0".to_string());
        answers.insert(q2.id, "2".to_string());

        let grade = grade(&[q1, q2], &answers);
        assert_eq!(grade.score, 5);
        assert_eq!(grade.total_marks, 5);
        assert_eq!(grade.status, GradingStatus::Graded);
    }

    #[test]
    fn test_unanswered_and_keyless_questions_score_zero() {
        let q1 = question(QuestionKind::Objective, 2, Some("a"));
        let q2 = question(QuestionKind::Objective, 3, None);
        let mut answers = AnswerSheet::new();
        answers.insert(q2.id, "".to_string());

        let grade = grade(&[q1, q2], &answers);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.total_marks, 5);
        assert_eq!(grade.status, GradingStatus::Graded);
    }

    #[test]
    fn test_score_never_exceeds_total() {
        let questions: Vec<Question> = (0..6)
            .map(|i| {
                if i % 3 == 0 {
                    question(QuestionKind::FreeText, i, None)
                } else {
                    question(QuestionKind::Objective, i, Some("a"))
                }
            })
            .collect();

        for mask in 0u32..64 {
            let answers: AnswerSheet = questions
                .iter()
                .enumerate()
                .map(|(i, q)| {
                    let value = if mask & (1 << i) != 0 { "a" } else { "z" };
                    (q.id, value.to_string())
                })
                .collect();
            let grade = grade(&questions, &answers);
            assert!(grade.score <= grade.total_marks);
            assert_eq!(grade.total_marks, 15);
            assert_eq!(grade.status, GradingStatus::Pending);
        }
    }
}
