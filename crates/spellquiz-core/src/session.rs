//! The quiz session state machine.
//!
//! A session walks an ordered list of tasks fixed at creation. Each task is
//! answered (possibly over several steps), then the caller advances.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::TaskCatalog;
use crate::error::QuizError;
use crate::evaluate::{evaluate, AnswerInput, Evaluation, Outcome, Selection, StepProgress};
use crate::learned::LearnedKeys;
use crate::model::{CompiledTask, TaskId};
use crate::sampler::{sample, QuizLength};
use crate::shuffle::RandomSource;
use crate::view::RuntimeView;

/// A task as it appears inside a session.
#[derive(Debug, Clone)]
pub struct SessionTask {
    pub id: TaskId,
    pub task: Rc<CompiledTask>,
    pub view: Rc<RuntimeView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The current task has not been fully answered.
    InTask,
    /// An outcome is recorded; the session may advance.
    TaskAnswered,
    Finished,
}

/// What a single submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerResult {
    /// More input is needed; `step_index` is the next step to answer.
    Pending { step_index: usize },
    Final(Outcome),
}

impl AnswerResult {
    pub fn is_final(&self) -> bool {
        matches!(self, AnswerResult::Final(_))
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            AnswerResult::Final(outcome) => Some(outcome),
            AnswerResult::Pending { .. } => None,
        }
    }
}

/// One attempt at a quiz.
#[derive(Debug)]
pub struct QuizSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    tasks: Vec<SessionTask>,
    current_index: usize,
    progress: StepProgress,
    current_outcome: Option<Outcome>,
    history: Vec<Outcome>,
    finished: bool,
}

impl QuizSession {
    /// Start a session over the given catalog tasks, in order.
    ///
    /// Every task is compiled and its runtime view built up front, so
    /// structural errors surface here rather than mid-session.
    pub fn start<R>(catalog: &TaskCatalog, ids: &[TaskId], rng: &mut R) -> Result<Self, QuizError>
    where
        R: RandomSource + ?Sized,
    {
        let tasks = ids
            .iter()
            .map(|&id| {
                Ok(SessionTask {
                    id,
                    task: catalog.compiled(id)?,
                    view: catalog.runtime_view(id, rng)?,
                })
            })
            .collect::<Result<Vec<_>, QuizError>>()?;
        Self::from_tasks(tasks)
    }

    pub fn from_tasks(tasks: Vec<SessionTask>) -> Result<Self, QuizError> {
        if tasks.is_empty() {
            return Err(QuizError::InsufficientTasks {
                requested: 1,
                available: 0,
            });
        }
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            tasks,
            current_index: 0,
            progress: StepProgress::default(),
            current_outcome: None,
            history: Vec::new(),
            finished: false,
        };
        tracing::info!("session {} started with {} tasks", session.id, session.len());
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        if self.finished {
            SessionState::Finished
        } else if self.current_outcome.is_some() {
            SessionState::TaskAnswered
        } else {
            SessionState::InTask
        }
    }

    /// Submit one input for the current task.
    pub fn submit_answer(&mut self, input: &AnswerInput) -> Result<AnswerResult, QuizError> {
        match self.state() {
            SessionState::InTask => {}
            SessionState::TaskAnswered => {
                return Err(QuizError::Sequence(
                    "the current task is already answered; advance first".into(),
                ))
            }
            SessionState::Finished => {
                return Err(QuizError::Sequence("the session is finished".into()))
            }
        }

        let current = &self.tasks[self.current_index];
        match evaluate(&current.task, &current.view, &self.progress, input)? {
            Evaluation::Partial(selection) => {
                self.push_selection(selection);
                Ok(AnswerResult::Pending {
                    step_index: self.progress.step,
                })
            }
            Evaluation::Final { selection, outcome } => {
                if let Some(selection) = selection {
                    self.push_selection(selection);
                }
                tracing::debug!(
                    "task {} answered ({})",
                    outcome.task,
                    if outcome.is_correct { "correct" } else { "wrong" }
                );
                self.history.push(outcome.clone());
                self.current_outcome = Some(outcome.clone());
                Ok(AnswerResult::Final(outcome))
            }
        }
    }

    fn push_selection(&mut self, selection: Selection) {
        self.progress.selections.push(selection);
        self.progress.step += 1;
    }

    /// Move past an answered task, finishing the session after the last one.
    pub fn advance(&mut self) -> Result<(), QuizError> {
        match self.state() {
            SessionState::TaskAnswered => {}
            SessionState::InTask => {
                return Err(QuizError::Sequence(
                    "cannot advance before the current task is answered".into(),
                ))
            }
            SessionState::Finished => {
                return Err(QuizError::Sequence("the session is finished".into()))
            }
        }

        if self.current_index + 1 >= self.tasks.len() {
            self.finished = true;
            self.finished_at = Some(Utc::now());
            tracing::info!(
                "session {} finished: {}/{} correct",
                self.id,
                self.correct_count(),
                self.history.len()
            );
            return Ok(());
        }

        self.current_index += 1;
        self.progress.clear();
        self.current_outcome = None;
        Ok(())
    }

    /// Drop partial selections of the current task so it can be restarted.
    pub fn reset_current_task(&mut self) -> Result<(), QuizError> {
        if self.state() != SessionState::InTask {
            return Err(QuizError::Sequence(
                "only an unanswered task can be reset".into(),
            ));
        }
        self.progress.clear();
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        self.state() == SessionState::TaskAnswered
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// `None` once the session is finished.
    pub fn current_task(&self) -> Option<&SessionTask> {
        if self.finished {
            None
        } else {
            self.tasks.get(self.current_index)
        }
    }

    pub fn tasks(&self) -> &[SessionTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn selections(&self) -> &[Selection] {
        &self.progress.selections
    }

    /// Partial answer on the current task.
    pub fn progress(&self) -> &StepProgress {
        &self.progress
    }

    pub fn step_index(&self) -> usize {
        self.progress.step
    }

    pub fn current_outcome(&self) -> Option<&Outcome> {
        self.current_outcome.as_ref()
    }

    pub fn history(&self) -> &[Outcome] {
        &self.history
    }

    pub fn correct_count(&self) -> usize {
        self.history.iter().filter(|o| o.is_correct).count()
    }

    /// Learning keys of every correctly answered task.
    pub fn mastered_keys(&self) -> Vec<String> {
        self.history
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.learning_key.clone())
            .collect()
    }
}

/// Sample tasks from a catalog and start a session over them.
pub fn start_quiz<R>(
    catalog: &TaskCatalog,
    length: QuizLength,
    learned: &LearnedKeys,
    rng: &mut R,
) -> Result<QuizSession, QuizError>
where
    R: RandomSource + ?Sized,
{
    let ids = sample(catalog, length.resolve(catalog.len()), learned, rng)?;
    QuizSession::start(catalog, &ids, rng)
}
