// src/attempt/session.rs

use uuid::Uuid;

use crate::models::{
    exam::Exam,
    question::Question,
    user::{Role, UserContext},
};

use super::{
    answers::{AnswerSlot, AnswerStore},
    backend::ExamBackend,
    error::AttemptError,
    guard::{self, Admission},
    loader,
    submitter::{self, SubmissionReceipt, SubmitTrigger},
    timer::{ExamTimer, TimerEvent, TimerState},
};

/// One candidate's in-progress attempt on one exam.
///
/// Created only after the guard admitted the candidate and the full question
/// set loaded. Nothing is persisted until a submission succeeds; dropping the
/// session (or calling [`leave`](Self::leave)) discards everything.
pub struct AttemptSession<B> {
    backend: B,
    ctx: UserContext,
    exam: Exam,
    questions: Vec<Question>,
    answers: AnswerStore,
    timer: ExamTimer,
    confirm_pending: bool,
    submitting: bool,
    receipt: Option<SubmissionReceipt>,
}

impl<B: ExamBackend> AttemptSession<B> {
    /// Runs the attempt guard, then the question loader.
    pub async fn open(backend: B, ctx: UserContext, exam_id: Uuid) -> Result<Self, AttemptError> {
        if ctx.role != Role::Student {
            return Err(AttemptError::Unauthorized);
        }

        let exam = match guard::check_admission(&backend, &ctx, exam_id).await? {
            Admission::Allowed(exam) => exam,
            Admission::Denied(denial) => return Err(AttemptError::Denied(denial)),
        };

        let questions = loader::load_question_set(&backend, exam_id).await?;
        let answers = AnswerStore::new(questions.iter().map(|q| q.id).collect());
        let timer = ExamTimer::new(exam.duration_seconds());

        tracing::info!(
            "Student {} started exam {} ({} questions, {})",
            ctx.user_id,
            exam_id,
            questions.len(),
            timer.format_remaining()
        );

        Ok(Self {
            backend,
            ctx,
            exam,
            questions,
            answers,
            timer,
            confirm_pending: false,
            submitting: false,
            receipt: None,
        })
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.answers.position())
    }

    pub fn answer_for(&self, question_id: Uuid) -> AnswerSlot<'_> {
        self.answers.get(question_id)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.confirm_pending
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// The countdown pauses while a submission is in flight and ends with it.
    pub fn is_ticking(&self) -> bool {
        self.timer.is_ticking() && !self.submitting && self.receipt.is_none()
    }

    /// Answers are accepted only while time remains and nothing is being submitted.
    pub fn accepts_input(&self) -> bool {
        self.is_ticking()
    }

    pub fn answer(&mut self, question_id: Uuid, value: impl Into<String>) -> Result<(), AttemptError> {
        if !self.accepts_input() {
            return Err(AttemptError::InputClosed);
        }
        self.answers.set(question_id, value)
    }

    pub fn next(&mut self) -> bool {
        self.receipt.is_none() && self.answers.next()
    }

    pub fn previous(&mut self) -> bool {
        self.receipt.is_none() && self.answers.previous()
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.receipt.is_none() && self.answers.jump_to(index)
    }

    /// The countdown's starting condition; see [`ExamTimer::start`].
    pub fn start(&mut self) -> Option<TimerEvent> {
        if !self.is_ticking() {
            return None;
        }
        self.timer.start()
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.is_ticking() {
            return None;
        }
        self.timer.tick()
    }

    /// Opens the confirmation step of a manual submission.
    pub fn request_submit(&mut self) -> Result<(), AttemptError> {
        self.ensure_can_submit()?;
        self.confirm_pending = true;
        Ok(())
    }

    pub fn cancel_submit(&mut self) {
        self.confirm_pending = false;
    }

    /// Manual submission, after [`request_submit`](Self::request_submit).
    pub async fn confirm_submit(&mut self) -> Result<SubmissionReceipt, AttemptError> {
        if !self.confirm_pending {
            return Err(AttemptError::ConfirmationRequired);
        }
        self.submit(SubmitTrigger::Manual).await
    }

    /// Automatic submission once the countdown expired. Skips confirmation.
    pub async fn submit_on_expiry(&mut self) -> Result<SubmissionReceipt, AttemptError> {
        self.submit(SubmitTrigger::TimerExpired).await
    }

    /// Stops the countdown and discards the attempt without writing anything.
    pub fn leave(mut self) {
        self.timer.stop();
        tracing::info!(
            "Student {} left exam {} without submitting",
            self.ctx.user_id,
            self.exam.id
        );
    }

    fn ensure_can_submit(&self) -> Result<(), AttemptError> {
        if self.receipt.is_some() {
            return Err(AttemptError::AlreadySubmitted);
        }
        if self.submitting {
            return Err(AttemptError::AlreadySubmitting);
        }
        Ok(())
    }

    async fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmissionReceipt, AttemptError> {
        // Whichever of timer expiry and manual confirmation gets here first wins.
        self.ensure_can_submit()?;
        self.submitting = true;
        self.confirm_pending = false;

        let snapshot = self.answers.snapshot();
        let outcome = submitter::submit(
            &self.backend,
            &self.ctx,
            self.exam.id,
            &self.questions,
            &snapshot,
            trigger,
        )
        .await;

        match outcome {
            Ok(receipt) => {
                self.timer.stop();
                self.receipt = Some(receipt.clone());
                self.submitting = false;
                Ok(receipt)
            }
            Err(err) => {
                let err = AttemptError::from(err);
                if let AttemptError::Denied(_) = err {
                    self.timer.stop();
                } else if trigger == SubmitTrigger::TimerExpired {
                    tracing::error!(
                        "Automatic submission of exam {} failed; no extra time granted",
                        self.exam.id
                    );
                }
                self.submitting = false;
                Err(err)
            }
        }
    }
}
