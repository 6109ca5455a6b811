//! Per-type answer evaluators.
//!
//! Evaluators are pure: they read the compiled task, its runtime view, the
//! partial progress so far and one input, and say what should happen next.
//! Storing the result is the session's job.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{
    AudioBody, AudioTask, CompiledTask, PairSet, TaskBody, TaskType, VariantChoice, WordBuild,
};
use crate::pattern::ParsedPattern;
use crate::view::RuntimeView;

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerInput {
    /// A letter for the current blank of a word pattern.
    Letter(char),
    /// A variant, by its catalog index.
    Variant(usize),
    /// A letter tile, by its position in the runtime view.
    Tile(usize),
    /// A complete left → right assignment.
    Mapping(BTreeMap<String, String>),
}

/// A partial choice kept while a multi-step task is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    Letter(char),
    Tile(usize),
}

/// Partial progress on the current task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub selections: Vec<Selection>,
    pub step: usize,
}

impl StepProgress {
    pub fn letters(&self) -> Vec<char> {
        self.selections
            .iter()
            .filter_map(|s| match s {
                Selection::Letter(c) => Some(*c),
                Selection::Tile(_) => None,
            })
            .collect()
    }

    pub fn tiles(&self) -> Vec<usize> {
        self.selections
            .iter()
            .filter_map(|s| match s {
                Selection::Tile(i) => Some(*i),
                Selection::Letter(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
        self.step = 0;
    }
}

/// Where an answer went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Mismatch {
    None,
    /// Orthogram indices or character positions that differ.
    Positions(Vec<usize>),
    /// The chosen variant index.
    Variant(usize),
    /// Left items mapped to the wrong right item.
    Keys(Vec<String>),
}

/// The result of fully answering one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub task: String,
    pub task_type: TaskType,
    pub is_correct: bool,
    pub selected: String,
    pub correct: String,
    pub mismatch: Mismatch,
    pub hint: String,
    pub learning_key: String,
}

/// What an evaluator decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The task needs more input; keep this selection.
    Partial(Selection),
    /// The task is answered.
    Final {
        selection: Option<Selection>,
        outcome: Outcome,
    },
}

/// Evaluate one input against a task.
pub fn evaluate(
    task: &CompiledTask,
    view: &RuntimeView,
    progress: &StepProgress,
    input: &AnswerInput,
) -> Result<Evaluation, QuizError> {
    match &task.body {
        TaskBody::InsertMissingLetters(pattern) => {
            let AnswerInput::Letter(letter) = input else {
                return Err(shape_error(task, "a letter"));
            };
            evaluate_pattern(task, pattern, progress, *letter)
        }
        TaskBody::ChooseWordVariant(choice)
        | TaskBody::AudioToWord(AudioTask {
            inner: AudioBody::ChooseVariant(choice),
            ..
        }) => {
            let AnswerInput::Variant(index) = input else {
                return Err(shape_error(task, "a variant index"));
            };
            evaluate_variant(task, choice, *index)
        }
        TaskBody::BuildForeignWord(build)
        | TaskBody::AudioToWord(AudioTask {
            inner: AudioBody::BuildWord(build),
            ..
        }) => {
            let AnswerInput::Tile(index) = input else {
                return Err(shape_error(task, "a tile index"));
            };
            let tiles = view.tiles().unwrap_or(build.letters.as_slice());
            evaluate_build(task, build, tiles, progress, *index)
        }
        TaskBody::PairMatch(pairs) => {
            let AnswerInput::Mapping(mapping) = input else {
                return Err(shape_error(task, "a left-to-right mapping"));
            };
            evaluate_pairs(task, pairs, mapping)
        }
    }
}

fn shape_error(task: &CompiledTask, expected: &'static str) -> QuizError {
    QuizError::InputMismatch {
        task_type: task.task_type().to_string(),
        expected,
    }
}

fn outcome(task: &CompiledTask, selected: String, correct: String, mismatch: Mismatch) -> Outcome {
    Outcome {
        task: task.label.clone(),
        task_type: task.task_type(),
        is_correct: mismatch == Mismatch::None,
        selected,
        correct,
        mismatch,
        hint: task.hint.clone(),
        learning_key: task.learning_key(),
    }
}

fn evaluate_pattern(
    task: &CompiledTask,
    pattern: &ParsedPattern,
    progress: &StepProgress,
    letter: char,
) -> Result<Evaluation, QuizError> {
    let step = progress.step;
    let orthogram = pattern.orthograms.get(step).ok_or_else(|| {
        QuizError::Sequence(format!("all {} blanks are already filled", pattern.orth_count()))
    })?;
    if !orthogram.options.contains(&letter) {
        let options: String = orthogram.options.iter().collect();
        return Err(QuizError::InputRange(format!(
            "'{letter}' is not an option for blank {} (options: {options})",
            step + 1
        )));
    }

    let selection = Selection::Letter(letter);
    if step + 1 < pattern.orth_count() {
        return Ok(Evaluation::Partial(selection));
    }

    let mut chosen = progress.letters();
    chosen.push(letter);
    let wrong: Vec<usize> = pattern
        .orthograms
        .iter()
        .zip(&chosen)
        .filter(|(o, c)| o.correct != **c)
        .map(|(o, _)| o.index)
        .collect();

    Ok(Evaluation::Final {
        selection: Some(selection),
        outcome: outcome(
            task,
            pattern.fill(&chosen),
            pattern.correct_word.clone(),
            positions(wrong),
        ),
    })
}

fn evaluate_variant(
    task: &CompiledTask,
    choice: &VariantChoice,
    index: usize,
) -> Result<Evaluation, QuizError> {
    let selected = choice.variants.get(index).ok_or_else(|| {
        QuizError::InputRange(format!(
            "variant {index} is out of range ({} variants)",
            choice.variants.len()
        ))
    })?;
    let mismatch = if index == choice.correct_index {
        Mismatch::None
    } else {
        Mismatch::Variant(index)
    };
    Ok(Evaluation::Final {
        selection: None,
        outcome: outcome(task, selected.clone(), choice.correct().to_string(), mismatch),
    })
}

fn evaluate_build(
    task: &CompiledTask,
    build: &WordBuild,
    tiles: &[char],
    progress: &StepProgress,
    index: usize,
) -> Result<Evaluation, QuizError> {
    if index >= tiles.len() {
        return Err(QuizError::InputRange(format!(
            "tile index {index} is out of range ({} tiles)",
            tiles.len()
        )));
    }
    let mut used = progress.tiles();
    if used.contains(&index) {
        return Err(QuizError::Sequence(format!("tile {index} is already placed")));
    }

    let selection = Selection::Tile(index);
    used.push(index);
    if used.len() < build.target_len() {
        return Ok(Evaluation::Partial(selection));
    }

    let selected: String = used.iter().map(|&i| tiles[i]).collect();
    let wrong: Vec<usize> = selected
        .chars()
        .zip(build.target_word.chars())
        .enumerate()
        .filter(|(_, (got, want))| got != want)
        .map(|(i, _)| i)
        .collect();

    Ok(Evaluation::Final {
        selection: Some(selection),
        outcome: outcome(task, selected, build.target_word.clone(), positions(wrong)),
    })
}

fn evaluate_pairs(
    task: &CompiledTask,
    pairs: &PairSet,
    mapping: &BTreeMap<String, String>,
) -> Result<Evaluation, QuizError> {
    for left in mapping.keys() {
        if pairs.right_for(left).is_none() {
            return Err(QuizError::InputRange(format!("'{left}' is not a left item")));
        }
    }

    let rights: HashSet<&str> = pairs.pairs.iter().map(|(_, r)| r.as_str()).collect();
    let mut used = HashSet::new();
    let mut selected = Vec::with_capacity(pairs.pairs.len());
    let mut wrong = Vec::new();
    for (left, right) in &pairs.pairs {
        let chosen = mapping
            .get(left)
            .ok_or_else(|| QuizError::InputRange(format!("'{left}' is not mapped")))?;
        if !rights.contains(chosen.as_str()) {
            return Err(QuizError::InputRange(format!(
                "'{chosen}' is not a right item"
            )));
        }
        if !used.insert(chosen.as_str()) {
            return Err(QuizError::InputRange(format!(
                "'{chosen}' is mapped more than once"
            )));
        }
        if chosen != right {
            wrong.push(left.clone());
        }
        selected.push(format!("{left}={chosen}"));
    }

    let mismatch = if wrong.is_empty() {
        Mismatch::None
    } else {
        Mismatch::Keys(wrong)
    };
    Ok(Evaluation::Final {
        selection: None,
        outcome: outcome(task, selected.join("|"), pairs.canonical(), mismatch),
    })
}

fn positions(wrong: Vec<usize>) -> Mismatch {
    if wrong.is_empty() {
        Mismatch::None
    } else {
        Mismatch::Positions(wrong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::model::RawTask;
    use serde_json::json;

    fn compiled(value: serde_json::Value) -> CompiledTask {
        compile(&RawTask::try_from(value).unwrap()).unwrap()
    }

    fn pairs_task() -> CompiledTask {
        compiled(json!({
            "type": "pairMatch",
            "pairs": [["стол", "table"], ["книга", "book"]],
            "hint": "...",
        }))
    }

    fn mapping(items: &[(&str, &str)]) -> AnswerInput {
        AnswerInput::Mapping(
            items
                .iter()
                .map(|(l, r)| (l.to_string(), r.to_string()))
                .collect(),
        )
    }

    #[test]
    fn pattern_reports_wrong_orthograms() {
        let task = compiled(json!({
            "type": "insertMissingLetters",
            "word": "в[ао|о]р[ао|о]на",
            "hint": "...",
        }));
        let progress = StepProgress {
            selections: vec![Selection::Letter('а')],
            step: 1,
        };
        let eval = evaluate(&task, &RuntimeView::Pattern, &progress, &AnswerInput::Letter('о'))
            .unwrap();
        let Evaluation::Final { outcome, .. } = eval else {
            panic!("expected final evaluation");
        };
        assert!(!outcome.is_correct);
        assert_eq!(outcome.selected, "варона");
        assert_eq!(outcome.correct, "ворона");
        assert_eq!(outcome.mismatch, Mismatch::Positions(vec![0]));
    }

    #[test]
    fn pattern_rejects_letter_outside_options() {
        let task = compiled(json!({
            "type": "insertMissingLetters",
            "word": "м[ао|о]локо",
            "hint": "...",
        }));
        let err = evaluate(
            &task,
            &RuntimeView::Pattern,
            &StepProgress::default(),
            &AnswerInput::Letter('е'),
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::InputRange(_)));
    }

    #[test]
    fn wrong_input_shape_is_rejected() {
        let err = evaluate(
            &pairs_task(),
            &RuntimeView::Pattern,
            &StepProgress::default(),
            &AnswerInput::Letter('a'),
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::InputMismatch { .. }));
    }

    #[test]
    fn variant_out_of_range() {
        let task = compiled(json!({
            "type": "chooseWordVariant",
            "variants": ["малако", "молоко"],
            "correctIndex": 1,
            "hint": "...",
        }));
        let err = evaluate(
            &task,
            &RuntimeView::Pattern,
            &StepProgress::default(),
            &AnswerInput::Variant(2),
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::InputRange(_)));
    }

    #[test]
    fn build_uses_view_order_and_reports_positions() {
        let task = compiled(json!({
            "type": "buildForeignWord",
            "targetWord": "cat",
            "letters": ["c", "a", "t"],
            "hint": "...",
        }));
        let view = RuntimeView::Tiles {
            tiles: vec!['t', 'a', 'c'],
        };
        let progress = StepProgress {
            selections: vec![Selection::Tile(0), Selection::Tile(1)],
            step: 2,
        };
        let Evaluation::Final { outcome, .. } =
            evaluate(&task, &view, &progress, &AnswerInput::Tile(2)).unwrap()
        else {
            panic!("expected final evaluation");
        };
        assert_eq!(outcome.selected, "tac");
        assert_eq!(outcome.mismatch, Mismatch::Positions(vec![0, 2]));
    }

    #[test]
    fn build_rejects_reused_and_out_of_range_tiles() {
        let task = compiled(json!({
            "type": "buildForeignWord",
            "targetWord": "cat",
            "letters": ["c", "a", "t"],
            "hint": "...",
        }));
        let view = RuntimeView::Tiles {
            tiles: vec!['c', 'a', 't'],
        };
        let progress = StepProgress {
            selections: vec![Selection::Tile(1)],
            step: 1,
        };
        assert!(matches!(
            evaluate(&task, &view, &progress, &AnswerInput::Tile(1)),
            Err(QuizError::Sequence(_))
        ));
        assert!(matches!(
            evaluate(&task, &view, &progress, &AnswerInput::Tile(3)),
            Err(QuizError::InputRange(_))
        ));
    }

    #[test]
    fn pairs_correct_and_wrong() {
        let task = pairs_task();
        let progress = StepProgress::default();
        let Evaluation::Final { outcome, .. } = evaluate(
            &task,
            &RuntimeView::Pattern,
            &progress,
            &mapping(&[("стол", "table"), ("книга", "book")]),
        )
        .unwrap() else {
            panic!("expected final evaluation");
        };
        assert!(outcome.is_correct);

        let Evaluation::Final { outcome, .. } = evaluate(
            &task,
            &RuntimeView::Pattern,
            &progress,
            &mapping(&[("стол", "book"), ("книга", "table")]),
        )
        .unwrap() else {
            panic!("expected final evaluation");
        };
        assert!(!outcome.is_correct);
        assert_eq!(
            outcome.mismatch,
            Mismatch::Keys(vec!["стол".into(), "книга".into()])
        );
        assert_eq!(outcome.selected, "стол=book|книга=table");
    }

    #[test]
    fn pairs_reject_incomplete_or_ambiguous_mappings() {
        let task = pairs_task();
        let progress = StepProgress::default();
        for input in [
            mapping(&[("стол", "table")]),
            mapping(&[("стол", "table"), ("книга", "table")]),
            mapping(&[("стол", "table"), ("книга", "pen")]),
            mapping(&[("стол", "table"), ("книга", "book"), ("дом", "house")]),
        ] {
            assert!(
                matches!(
                    evaluate(&task, &RuntimeView::Pattern, &progress, &input),
                    Err(QuizError::InputRange(_))
                ),
                "{input:?}"
            );
        }
    }
}
