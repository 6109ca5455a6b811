//! Task selection.
//!
//! [`sample`] favors material the learner has not mastered yet: unlearned
//! tasks are drawn first and learned ones only top the selection up.
//! [`sample_uniform`] ignores mastery altogether.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::TaskCatalog;
use crate::error::QuizError;
use crate::learned::LearnedKeys;
use crate::model::{CompiledTask, TaskId};
use crate::shuffle::{shuffle, RandomSource};

/// Quiz length used when a requested count cannot be understood.
pub const DEFAULT_COUNT: usize = 10;

/// `"<type>:<canonical answer>"` of a compiled task.
pub fn learning_key(task: &CompiledTask) -> String {
    task.learning_key()
}

/// Draw up to `count` items, unlearned ones first.
///
/// `count` is clamped to `1..=items.len()`. Both partitions are shuffled
/// independently before the unlearned items are taken.
pub fn partition_sample<T, R, F>(items: &[T], count: usize, is_learned: F, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
    F: Fn(&T) -> bool,
{
    if items.is_empty() {
        return Vec::new();
    }
    let count = count.clamp(1, items.len());

    let (learned, unlearned): (Vec<T>, Vec<T>) =
        items.iter().cloned().partition(|item| is_learned(item));
    let unlearned = shuffle(&unlearned, rng);
    let learned = shuffle(&learned, rng);

    unlearned.into_iter().chain(learned).take(count).collect()
}

/// Mastery-biased selection of task ids from a catalog.
pub fn sample<R>(
    catalog: &TaskCatalog,
    count: usize,
    learned: &LearnedKeys,
    rng: &mut R,
) -> Result<Vec<TaskId>, QuizError>
where
    R: RandomSource + ?Sized,
{
    let keyed = catalog
        .ids()
        .map(|id| Ok((id, catalog.compiled(id)?.learning_key())))
        .collect::<Result<Vec<_>, QuizError>>()?;

    let picked = partition_sample(&keyed, count, |(_, key)| learned.contains(key), rng);
    let fresh = picked.iter().filter(|(_, k)| !learned.contains(k)).count();
    tracing::debug!(
        "sampled {} of {} tasks ({} unlearned)",
        picked.len(),
        catalog.len(),
        fresh
    );
    Ok(picked.into_iter().map(|(id, _)| id).collect())
}

/// Uniform selection of exactly `count` task ids.
pub fn sample_uniform<R>(
    catalog: &TaskCatalog,
    count: usize,
    rng: &mut R,
) -> Result<Vec<TaskId>, QuizError>
where
    R: RandomSource + ?Sized,
{
    if catalog.len() < count {
        return Err(QuizError::InsufficientTasks {
            requested: count,
            available: catalog.len(),
        });
    }
    let ids: Vec<TaskId> = catalog.ids().collect();
    let mut picked = shuffle(&ids, rng);
    picked.truncate(count);
    Ok(picked)
}

/// How many tasks a quiz should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuizLength {
    All,
    Count(usize),
}

impl Default for QuizLength {
    fn default() -> Self {
        QuizLength::Count(DEFAULT_COUNT)
    }
}

impl QuizLength {
    /// The number of tasks to draw from a pool of `pool_len`.
    pub fn resolve(&self, pool_len: usize) -> usize {
        match self {
            QuizLength::All => pool_len,
            QuizLength::Count(0) => DEFAULT_COUNT.min(pool_len),
            QuizLength::Count(n) => (*n).min(pool_len),
        }
    }

    /// Lenient parse: anything unrecognised becomes the default length.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for QuizLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizLength::All => write!(f, "all"),
            QuizLength::Count(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for QuizLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(QuizLength::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(QuizLength::Count(n)),
            _ => Err(format!("invalid quiz length '{s}': expected 'all' or a positive number")),
        }
    }
}

impl TryFrom<String> for QuizLength {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QuizLength> for String {
    fn from(length: QuizLength) -> Self {
        length.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTask;
    use serde_json::json;

    fn variant_catalog(words: &[(&str, &str)]) -> TaskCatalog {
        words
            .iter()
            .map(|(wrong, right)| {
                RawTask::try_from(json!({
                    "type": "chooseWordVariant",
                    "variants": [wrong, right],
                    "correctIndex": 1,
                    "hint": "...",
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn unlearned_tasks_come_first() {
        let catalog = variant_catalog(&[("малако", "молоко"), ("карова", "корова")]);
        let learned: LearnedKeys = ["chooseWordVariant:молоко"].into_iter().collect();
        let picked = sample(&catalog, 1, &learned, &mut || 0.1).unwrap();
        assert_eq!(picked, vec![TaskId(1)]);
        assert_eq!(
            catalog.compiled(picked[0]).unwrap().canonical_answer(),
            "корова"
        );
    }

    #[test]
    fn learned_tasks_top_up_the_selection() {
        let items: Vec<u32> = (0..10).collect();
        let picked = partition_sample(&items, 6, |n| n % 2 == 0, &mut || 0.5);
        assert_eq!(picked.len(), 6);
        assert!(picked[..5].iter().all(|n| n % 2 == 1));
        assert_eq!(picked[5] % 2, 0);
    }

    #[test]
    fn never_returns_fewer_than_possible() {
        let items: Vec<u32> = (0..4).collect();
        for count in 0..8 {
            let picked = partition_sample(&items, count, |n| *n < 2, &mut || 0.3);
            assert_eq!(picked.len(), count.clamp(1, 4), "count {count}");
        }
        let empty: Vec<u32> = Vec::new();
        assert!(partition_sample(&empty, 3, |_| false, &mut || 0.3).is_empty());
    }

    #[test]
    fn uniform_requires_enough_tasks() {
        let catalog = variant_catalog(&[("малако", "молоко"), ("карова", "корова")]);
        assert!(matches!(
            sample_uniform(&catalog, 3, &mut || 0.2),
            Err(QuizError::InsufficientTasks {
                requested: 3,
                available: 2
            })
        ));
        let picked = sample_uniform(&catalog, 2, &mut || 0.2).unwrap();
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn quiz_length_parsing_and_resolution() {
        assert_eq!("all".parse::<QuizLength>().unwrap(), QuizLength::All);
        assert_eq!("25".parse::<QuizLength>().unwrap(), QuizLength::Count(25));
        assert!("0".parse::<QuizLength>().is_err());
        assert!("ten".parse::<QuizLength>().is_err());
        assert_eq!(QuizLength::parse_or_default("ten"), QuizLength::Count(10));

        assert_eq!(QuizLength::All.resolve(42), 42);
        assert_eq!(QuizLength::Count(50).resolve(42), 42);
        assert_eq!(QuizLength::Count(5).resolve(42), 5);
        assert_eq!(QuizLength::Count(0).resolve(4), 4);
    }
}
