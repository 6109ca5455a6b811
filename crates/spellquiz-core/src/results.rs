//! Quiz result aggregation with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluate::Outcome;
use crate::model::TaskType;
use crate::session::QuizSession;

/// Summary of a quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    /// Id of the session this result was built from.
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// `None` when the session was not played to the end.
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of answered tasks.
    pub total: usize,
    pub correct_count: usize,
    pub wrong_count: usize,
    /// Rounded share of correct answers, 0..=100.
    pub percent: u32,
    pub wrong_outcomes: Vec<Outcome>,
    pub per_type: BTreeMap<TaskType, TypeStats>,
}

/// Counts for one task type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    pub total: usize,
    pub correct: usize,
}

/// `round(correct / total * 100)`; an empty quiz counts as 0%.
pub fn percent(correct: usize, total: usize) -> u32 {
    let total = total.max(1);
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// Aggregate the outcomes recorded so far in a session.
pub fn build_result(session: &QuizSession) -> QuizResult {
    let history = session.history();
    let correct_count = history.iter().filter(|o| o.is_correct).count();

    let mut per_type: BTreeMap<TaskType, TypeStats> = BTreeMap::new();
    for outcome in history {
        let stats = per_type.entry(outcome.task_type).or_default();
        stats.total += 1;
        if outcome.is_correct {
            stats.correct += 1;
        }
    }

    QuizResult {
        session_id: session.id,
        started_at: session.started_at,
        finished_at: session.finished_at,
        total: history.len(),
        correct_count,
        wrong_count: history.len() - correct_count,
        percent: percent(correct_count, history.len()),
        wrong_outcomes: history.iter().filter(|o| !o.is_correct).cloned().collect(),
        per_type,
    }
}

impl QuizResult {
    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: QuizResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }

    /// `<session id>.json`, the file name results are stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TaskCatalog;
    use crate::evaluate::AnswerInput;
    use crate::model::{RawTask, TaskId};
    use serde_json::json;

    fn played_session() -> QuizSession {
        let catalog: TaskCatalog = [
            json!({
                "type": "chooseWordVariant",
                "variants": ["малако", "молоко"],
                "correctIndex": 1,
                "hint": "...",
            }),
            json!({
                "type": "insertMissingLetters",
                "word": "к[ао|о]р[ао|о]ва",
                "hint": "...",
            }),
        ]
        .into_iter()
        .map(|v| RawTask::try_from(v).unwrap())
        .collect();

        let mut session =
            QuizSession::start(&catalog, &[TaskId(0), TaskId(1)], &mut || 0.5).unwrap();
        session.submit_answer(&AnswerInput::Variant(1)).unwrap();
        session.advance().unwrap();
        session.submit_answer(&AnswerInput::Letter('а')).unwrap();
        session.submit_answer(&AnswerInput::Letter('о')).unwrap();
        session.advance().unwrap();
        session
    }

    #[test]
    fn one_of_two_is_fifty_percent() {
        let result = build_result(&played_session());
        assert_eq!(result.total, 2);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 1);
        assert_eq!(result.percent, 50);
        assert_eq!(result.wrong_outcomes.len(), 1);
        assert_eq!(result.wrong_outcomes[0].correct, "корова");
        assert!(result.finished_at.is_some());
        assert_eq!(
            result.per_type[&TaskType::InsertMissingLetters],
            TypeStats {
                total: 1,
                correct: 0
            }
        );
    }

    #[test]
    fn percent_rounds_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn save_and_load_json() {
        let result = build_result(&played_session());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join(result.file_name());
        result.save_json(&path).unwrap();

        let loaded = QuizResult::load_json(&path).unwrap();
        assert_eq!(loaded.session_id, result.session_id);
        assert_eq!(loaded.percent, 50);
        assert_eq!(loaded.per_type, result.per_type);
        assert_eq!(loaded.wrong_outcomes, result.wrong_outcomes);
    }
}
