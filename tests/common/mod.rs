// tests/common/mod.rs
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use exam_portal::{
    attempt::{BackendError, ExamBackend, Ticker},
    models::{
        exam::{Exam, ExamStatus},
        exam_result::NewResult,
        question::{QuestionLink, QuestionRecord},
    },
};
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

/// In-memory stand-in for the hosted backend. Enforces the one-result-per-
/// (exam, student) constraint like the real table does.
#[derive(Default)]
pub struct MemoryBackend {
    pub exams: Mutex<HashMap<Uuid, Exam>>,
    pub links: Mutex<HashMap<Uuid, Vec<QuestionLink>>>,
    pub results: Mutex<Vec<(Uuid, NewResult)>>,
    /// Number of upcoming inserts that fail with a transient error.
    pub failing_inserts: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn add_exam(&self, exam: Exam) {
        self.exams.lock().unwrap().insert(exam.id, exam);
    }

    pub fn link(&self, exam_id: Uuid, links: Vec<QuestionLink>) {
        self.links.lock().unwrap().insert(exam_id, links);
    }

    pub fn fail_next_inserts(&self, n: usize) {
        self.failing_inserts.store(n, Ordering::SeqCst);
    }

    pub fn stored_results(&self) -> Vec<NewResult> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Writes a result directly, as another tab or device would.
    pub fn insert_existing(&self, exam_id: Uuid, student_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.results.lock().unwrap().push((
            id,
            NewResult {
                exam_id,
                student_id,
                answers: Default::default(),
                score: 0,
                total_marks: 0,
                status: exam_portal::models::exam_result::GradingStatus::Graded,
            },
        ));
        id
    }
}

#[async_trait]
impl ExamBackend for MemoryBackend {
    async fn fetch_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, BackendError> {
        Ok(self.exams.lock().unwrap().get(&exam_id).cloned())
    }

    async fn find_result_id(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, BackendError> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .find(|(_, r)| r.exam_id == exam_id && r.student_id == student_id)
            .map(|(id, _)| *id))
    }

    async fn fetch_question_links(&self, exam_id: Uuid) -> Result<Vec<QuestionLink>, BackendError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(&exam_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_result(&self, result: &NewResult) -> Result<Uuid, BackendError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_inserts.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_inserts.store(failing - 1, Ordering::SeqCst);
            return Err(BackendError::Query("connection reset by peer".to_string()));
        }

        let mut results = self.results.lock().unwrap();
        if results
            .iter()
            .any(|(_, r)| r.exam_id == result.exam_id && r.student_id == result.student_id)
        {
            return Err(BackendError::UniqueViolation);
        }
        let id = Uuid::new_v4();
        results.push((id, result.clone()));
        Ok(id)
    }
}

/// Ticker fed by a channel; pends forever once the channel is drained and closed.
pub struct ChannelTicker(pub mpsc::UnboundedReceiver<()>);

impl ChannelTicker {
    /// A ticker with `n` ticks already queued.
    pub fn preloaded(n: u32) -> (Self, mpsc::UnboundedSender<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..n {
            tx.send(()).unwrap();
        }
        (Self(rx), tx)
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn exam(status: ExamStatus, duration_minutes: i32, total_marks: i32) -> Exam {
    let now = Utc::now();
    Exam {
        id: Uuid::new_v4(),
        title: "Physics midterm".to_string(),
        description: None,
        duration_minutes,
        total_marks,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(1),
        status,
        subject_id: Uuid::new_v4(),
        class_id: Uuid::new_v4(),
        subject_name: Some("Physics".to_string()),
        class_name: Some("10-A".to_string()),
        created_by: Uuid::new_v4(),
    }
}

pub fn record(kind: &str, marks: i32, options: Option<serde_json::Value>, correct: Option<&str>) -> QuestionRecord {
    QuestionRecord {
        id: Uuid::new_v4(),
        text: format!("{} question worth {}", kind, marks),
        question_type: kind.to_string(),
        options,
        marks,
        correct_answer: correct.map(str::to_owned),
    }
}

pub fn links(records: Vec<QuestionRecord>) -> Vec<QuestionLink> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, q)| QuestionLink {
            question_id: q.id,
            position: i as i32,
            question: Some(q),
        })
        .collect()
}

/// 30 minute active exam: two objective questions (2 marks, key "a"; 3 marks,
/// key "b") and one free-text question (5 marks).
pub struct Scenario {
    pub exam_id: Uuid,
    pub q1: Uuid,
    pub q2: Uuid,
    pub q3: Uuid,
}

pub fn scenario(backend: &MemoryBackend) -> Scenario {
    let exam = exam(ExamStatus::Active, 30, 10);
    let exam_id = exam.id;
    backend.add_exam(exam);

    let q1 = record(
        "mcq",
        2,
        Some(json!({"a": "Newton", "b": "Joule", "c": "Watt"})),
        Some("a"),
    );
    let q2 = record(
        "mcq",
        3,
        Some(json!(r#"[{"id":"a","text":"1 m/s"},{"id":"b","text":"9.8 m/s²"},{"id":"c","text":"0"}]"#)),
        Some("b"),
    );
    let q3 = record("descriptive", 5, None, None);

    let ids = Scenario {
        exam_id,
        q1: q1.id,
        q2: q2.id,
        q3: q3.id,
    };
    backend.link(exam_id, links(vec![q1, q2, q3]));
    ids
}
