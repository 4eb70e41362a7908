// src/attempt/loader.rs

use uuid::Uuid;

use crate::models::question::{Question, QuestionKind, QuestionLink, QuestionRecord};

use super::{backend::ExamBackend, error::LoadError, options::normalize_options};

/// Loads the ordered, normalized question set of an exam.
pub async fn load_question_set<B: ExamBackend + ?Sized>(
    backend: &B,
    exam_id: Uuid,
) -> Result<Vec<Question>, LoadError> {
    tracing::debug!("Fetching questions for exam {}", exam_id);

    let links = backend.fetch_question_links(exam_id).await.map_err(|e| {
        tracing::error!("Failed to fetch questions for exam {}: {}", exam_id, e);
        LoadError::from(e)
    })?;

    let questions = resolve_links(links)?;
    tracing::debug!("Loaded {} questions for exam {}", questions.len(), exam_id);
    Ok(questions)
}

/// Orders link rows by position and converts them into questions.
///
/// A partial set is never returned: one unresolved link fails the whole load.
pub fn resolve_links(mut links: Vec<QuestionLink>) -> Result<Vec<Question>, LoadError> {
    if links.is_empty() {
        return Err(LoadError::NoQuestions);
    }

    links.sort_by_key(|link| link.position);

    let missing = links.iter().filter(|link| link.question.is_none()).count();
    if missing > 0 {
        for link in links.iter().filter(|link| link.question.is_none()) {
            tracing::warn!("Question {} could not be resolved", link.question_id);
        }
        return Err(LoadError::Unresolved { missing });
    }

    Ok(links
        .into_iter()
        .filter_map(|link| link.question)
        .map(question_from_record)
        .collect())
}

pub fn question_from_record(record: QuestionRecord) -> Question {
    let marks = u32::try_from(record.marks).unwrap_or_else(|_| {
        tracing::warn!(
            "Question {} has negative marks ({}), counting as 0",
            record.id,
            record.marks
        );
        0
    });

    Question {
        id: record.id,
        text: record.text,
        kind: QuestionKind::from_db(&record.question_type),
        marks,
        options: normalize_options(record.options.as_ref()),
        correct_answer: record.correct_answer,
    }
}
