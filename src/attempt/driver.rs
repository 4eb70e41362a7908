// src/attempt/driver.rs

use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    backend::ExamBackend,
    error::{AttemptError, Denial},
    session::AttemptSession,
    submitter::{SubmissionReceipt, SubmitTrigger},
    timer::{Ticker, TimerEvent},
};

/// Candidate input while the exam screen is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptCommand {
    Answer { question_id: Uuid, value: String },
    Next,
    Previous,
    JumpTo(usize),
    /// Opens the "are you sure?" step.
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    /// Navigating away. Nothing is persisted.
    Leave,
}

/// What the screen should render in response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Tick { remaining: u32 },
    /// Non-blocking "time running out" alert.
    TimeWarning { remaining: u32 },
    Moved { index: usize },
    ConfirmationRequested,
    Submitted(SubmissionReceipt),
    /// Transient notice; manual submission is available again.
    SubmitFailed { trigger: SubmitTrigger, message: String },
    Denied(Denial),
    Rejected { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Go to the result detail view of `receipt.result_id`.
    Submitted(SubmissionReceipt),
    Denied(Denial),
    Abandoned,
}

/// Runs an opened attempt until it is submitted or abandoned.
///
/// Ticks and commands are handled one at a time on the calling task; a
/// submission is awaited inline, so no tick is processed while it is in
/// flight. Dropping the command sender counts as leaving.
pub async fn drive<B, T>(
    mut session: AttemptSession<B>,
    mut ticker: T,
    mut commands: mpsc::Receiver<AttemptCommand>,
    events: mpsc::UnboundedSender<AttemptEvent>,
) -> AttemptOutcome
where
    B: ExamBackend,
    T: Ticker,
{
    let emit = |event: AttemptEvent| {
        // The screen may already be gone; the attempt keeps its own course.
        let _ = events.send(event);
    };

    // A five minute exam warns right away; a zero minute one submits right away.
    if let Some(event) = session.start() {
        if let Some(outcome) = on_timer_event(&mut session, event, &events).await {
            return outcome;
        }
    }

    loop {
        tokio::select! {
            biased;

            _ = ticker.tick(), if session.is_ticking() => {
                let event = session.tick();
                emit(AttemptEvent::Tick { remaining: session.remaining_seconds() });

                if let Some(event) = event {
                    if let Some(outcome) = on_timer_event(&mut session, event, &events).await {
                        return outcome;
                    }
                }
            }

            command = commands.recv() => {
                let Some(command) = command else {
                    session.leave();
                    return AttemptOutcome::Abandoned;
                };

                match command {
                    AttemptCommand::Answer { question_id, value } => {
                        if let Err(err) = session.answer(question_id, value) {
                            emit(AttemptEvent::Rejected { message: err.to_string() });
                        }
                    }
                    AttemptCommand::Next => {
                        if session.next() {
                            emit(AttemptEvent::Moved { index: session.answers().position() });
                        }
                    }
                    AttemptCommand::Previous => {
                        if session.previous() {
                            emit(AttemptEvent::Moved { index: session.answers().position() });
                        }
                    }
                    AttemptCommand::JumpTo(index) => {
                        if session.jump_to(index) {
                            emit(AttemptEvent::Moved { index });
                        }
                    }
                    AttemptCommand::RequestSubmit => match session.request_submit() {
                        Ok(()) => emit(AttemptEvent::ConfirmationRequested),
                        Err(err) => emit(AttemptEvent::Rejected { message: err.to_string() }),
                    },
                    AttemptCommand::CancelSubmit => session.cancel_submit(),
                    AttemptCommand::ConfirmSubmit => match session.confirm_submit().await {
                        Ok(receipt) => {
                            emit(AttemptEvent::Submitted(receipt.clone()));
                            return AttemptOutcome::Submitted(receipt);
                        }
                        Err(AttemptError::Denied(denial)) => {
                            emit(AttemptEvent::Denied(denial.clone()));
                            return AttemptOutcome::Denied(denial);
                        }
                        Err(AttemptError::ConfirmationRequired) => {
                            emit(AttemptEvent::Rejected {
                                message: AttemptError::ConfirmationRequired.to_string(),
                            });
                        }
                        Err(err) => emit(AttemptEvent::SubmitFailed {
                            trigger: SubmitTrigger::Manual,
                            message: err.to_string(),
                        }),
                    },
                    AttemptCommand::Leave => {
                        session.leave();
                        return AttemptOutcome::Abandoned;
                    }
                }
            }
        }
    }
}

/// Emits the warning, or submits on expiry. Returns the outcome when the
/// attempt is over.
async fn on_timer_event<B: ExamBackend>(
    session: &mut AttemptSession<B>,
    event: TimerEvent,
    events: &mpsc::UnboundedSender<AttemptEvent>,
) -> Option<AttemptOutcome> {
    match event {
        TimerEvent::Warning { remaining } => {
            let _ = events.send(AttemptEvent::TimeWarning { remaining });
            None
        }
        TimerEvent::Expired => match session.submit_on_expiry().await {
            Ok(receipt) => {
                let _ = events.send(AttemptEvent::Submitted(receipt.clone()));
                Some(AttemptOutcome::Submitted(receipt))
            }
            Err(AttemptError::Denied(denial)) => {
                let _ = events.send(AttemptEvent::Denied(denial.clone()));
                Some(AttemptOutcome::Denied(denial))
            }
            Err(err) => {
                let _ = events.send(AttemptEvent::SubmitFailed {
                    trigger: SubmitTrigger::TimerExpired,
                    message: err.to_string(),
                });
                None
            }
        },
    }
}
