//! The task catalog and its per-task caches.
//!
//! Raw tasks are stored in an arena and addressed by [`TaskId`]. The
//! compiled model and runtime view of each task are computed on first
//! access and then shared: asking again returns the same `Rc`.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::compiler::compile_labeled;
use crate::error::QuizError;
use crate::model::{CompiledTask, RawTask, TaskId};
use crate::shuffle::RandomSource;
use crate::view::RuntimeView;

#[derive(Debug, Default)]
struct Slot {
    raw: RawTask,
    compiled: OnceCell<Rc<CompiledTask>>,
    view: OnceCell<Rc<RuntimeView>>,
}

/// An in-memory set of tasks with memoized compilation.
#[derive(Debug, Default)]
pub struct TaskCatalog {
    slots: Vec<Slot>,
}

impl TaskCatalog {
    pub fn new(tasks: Vec<RawTask>) -> Self {
        let slots = tasks
            .into_iter()
            .map(|raw| Slot {
                raw,
                ..Default::default()
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All task ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        (0..self.slots.len()).map(TaskId)
    }

    pub fn raw(&self, id: TaskId) -> Option<&RawTask> {
        self.slots.get(id.0).map(|s| &s.raw)
    }

    /// How a task is named in errors: its `id` field, or `#<position>`.
    pub fn label(&self, id: TaskId) -> String {
        self.raw(id)
            .and_then(RawTask::id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    fn slot(&self, id: TaskId) -> Result<&Slot, QuizError> {
        self.slots.get(id.0).ok_or_else(|| {
            QuizError::InputRange(format!(
                "unknown task {id} (catalog has {} tasks)",
                self.slots.len()
            ))
        })
    }

    /// The compiled model of a task, compiling it on first access.
    pub fn compiled(&self, id: TaskId) -> Result<Rc<CompiledTask>, QuizError> {
        let slot = self.slot(id)?;
        if let Some(task) = slot.compiled.get() {
            return Ok(Rc::clone(task));
        }
        let task = Rc::new(compile_labeled(&slot.raw, &self.label(id))?);
        tracing::debug!("compiled task {} ({})", task.label, task.task_type());
        Ok(Rc::clone(slot.compiled.get_or_init(|| task)))
    }

    /// The display permutation of a task, drawn from `rng` on first access.
    ///
    /// Later calls return the cached view and do not consume randomness.
    pub fn runtime_view<R>(&self, id: TaskId, rng: &mut R) -> Result<Rc<RuntimeView>, QuizError>
    where
        R: RandomSource + ?Sized,
    {
        let slot = self.slot(id)?;
        if let Some(view) = slot.view.get() {
            return Ok(Rc::clone(view));
        }
        let task = self.compiled(id)?;
        let view = Rc::new(RuntimeView::build(&task, rng));
        Ok(Rc::clone(slot.view.get_or_init(|| view)))
    }

    /// Compile every task, returning the first structural error.
    pub fn validate_all(&self) -> Result<(), QuizError> {
        for id in self.ids() {
            self.compiled(id)?;
        }
        Ok(())
    }

    /// Compile every task, collecting every structural error.
    pub fn errors(&self) -> Vec<(TaskId, QuizError)> {
        self.ids()
            .filter_map(|id| self.compiled(id).err().map(|e| (id, e)))
            .collect()
    }
}

impl FromIterator<RawTask> for TaskCatalog {
    fn from_iter<I: IntoIterator<Item = RawTask>>(iter: I) -> Self {
        TaskCatalog::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> TaskCatalog {
        [
            json!({
                "type": "chooseWordVariant",
                "variants": ["малако", "молоко"],
                "correctIndex": 1,
                "hint": "...",
            }),
            json!({
                "id": "broken",
                "type": "pairMatch",
                "pairs": [],
                "hint": "...",
            }),
        ]
        .into_iter()
        .map(|v| RawTask::try_from(v).unwrap())
        .collect()
    }

    #[test]
    fn compiled_model_is_cached() {
        let catalog = catalog();
        let a = catalog.compiled(TaskId(0)).unwrap();
        let b = catalog.compiled(TaskId(0)).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.label, "#0");
    }

    #[test]
    fn runtime_view_is_built_once() {
        let catalog = catalog();
        let first = catalog.runtime_view(TaskId(0), &mut || 0.0).unwrap();
        let mut calls = 0;
        let second = catalog
            .runtime_view(TaskId(0), &mut || {
                calls += 1;
                0.99
            })
            .unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls, 0);
    }

    #[test]
    fn errors_use_task_id_label() {
        let catalog = catalog();
        let err = catalog.compiled(TaskId(1)).unwrap_err();
        assert!(err.to_string().starts_with("task broken:"), "{err}");
        assert!(catalog.validate_all().is_err());
        let errors = catalog.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, TaskId(1));
    }

    #[test]
    fn unknown_id_is_rejected() {
        let catalog = catalog();
        assert!(matches!(
            catalog.compiled(TaskId(9)),
            Err(QuizError::InputRange(_))
        ));
    }
}
