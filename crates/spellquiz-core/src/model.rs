//! Core data model types for spellquiz.
//!
//! `RawTask` is the weakly-typed record as it arrives from a dictionary
//! file. `CompiledTask` is its validated, normalized form; it is built once
//! per task by the catalog and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pattern::{ParsedPattern, Segment};

/// A task record exactly as supplied by the catalog.
///
/// Field shapes depend on the `type` tag and are only checked when the task
/// is compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTask(pub Map<String, Value>);

impl RawTask {
    /// Look up a raw field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The `type` tag, if it is a string.
    pub fn type_tag(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    /// The optional author-supplied `id`.
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for RawTask {
    fn from(map: Map<String, Value>) -> Self {
        RawTask(map)
    }
}

impl TryFrom<Value> for RawTask {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(RawTask(map)),
            other => Err(format!("task must be an object, got {other}")),
        }
    }
}

/// Stable handle of a task inside a [`TaskCatalog`](crate::catalog::TaskCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The fixed set of task types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    InsertMissingLetters,
    ChooseWordVariant,
    BuildForeignWord,
    PairMatch,
    AudioToWord,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::InsertMissingLetters => "insertMissingLetters",
            TaskType::ChooseWordVariant => "chooseWordVariant",
            TaskType::BuildForeignWord => "buildForeignWord",
            TaskType::PairMatch => "pairMatch",
            TaskType::AudioToWord => "audioToWord",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insertMissingLetters" => Ok(TaskType::InsertMissingLetters),
            "chooseWordVariant" => Ok(TaskType::ChooseWordVariant),
            "buildForeignWord" => Ok(TaskType::BuildForeignWord),
            "pairMatch" => Ok(TaskType::PairMatch),
            "audioToWord" => Ok(TaskType::AudioToWord),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// Which sub-task an `audioToWord` task plays out as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioMode {
    ChooseVariant,
    BuildWord,
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioMode::ChooseVariant => write!(f, "chooseVariant"),
            AudioMode::BuildWord => write!(f, "buildWord"),
        }
    }
}

impl FromStr for AudioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chooseVariant" => Ok(AudioMode::ChooseVariant),
            "buildWord" => Ok(AudioMode::BuildWord),
            other => Err(format!("unknown audio mode: {other}")),
        }
    }
}

/// Pick the correctly spelled word among several variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantChoice {
    pub variants: Vec<String>,
    pub correct_index: usize,
}

impl VariantChoice {
    pub fn correct(&self) -> &str {
        &self.variants[self.correct_index]
    }
}

/// Assemble a word from letter tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBuild {
    pub target_word: String,
    /// The word being translated, if any.
    pub source_word: Option<String>,
    /// Available tiles, one character each, in catalog order.
    pub letters: Vec<char>,
}

impl WordBuild {
    /// Number of tiles a complete answer places.
    pub fn target_len(&self) -> usize {
        self.target_word.chars().count()
    }
}

/// Match every left item with its right counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSet {
    /// Canonical `(left, right)` pairs in catalog order.
    pub pairs: Vec<(String, String)>,
}

impl PairSet {
    pub fn left(&self) -> Vec<String> {
        self.pairs.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn right(&self) -> Vec<String> {
        self.pairs.iter().map(|(_, r)| r.clone()).collect()
    }

    /// The canonical right value for `left`.
    pub fn right_for(&self, left: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(l, _)| l == left)
            .map(|(_, r)| r.as_str())
    }

    /// Mapping rendered as `left=right|left=right` in canonical order.
    pub fn canonical(&self) -> String {
        self.pairs
            .iter()
            .map(|(l, r)| format!("{l}={r}"))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// The inner task an audio clip cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum AudioBody {
    ChooseVariant(VariantChoice),
    BuildWord(WordBuild),
}

/// An audio-cued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTask {
    pub audio_src: String,
    pub inner: AudioBody,
}

impl AudioTask {
    pub fn mode(&self) -> AudioMode {
        match self.inner {
            AudioBody::ChooseVariant(_) => AudioMode::ChooseVariant,
            AudioBody::BuildWord(_) => AudioMode::BuildWord,
        }
    }
}

/// Type-specific part of a compiled task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskBody {
    InsertMissingLetters(ParsedPattern),
    ChooseWordVariant(VariantChoice),
    BuildForeignWord(WordBuild),
    PairMatch(PairSet),
    AudioToWord(AudioTask),
}

/// A validated, normalized task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTask {
    /// How errors and reports refer to this task (`id` or catalog position).
    pub label: String,
    pub hint: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub body: TaskBody,
}

impl CompiledTask {
    pub fn task_type(&self) -> TaskType {
        match self.body {
            TaskBody::InsertMissingLetters(_) => TaskType::InsertMissingLetters,
            TaskBody::ChooseWordVariant(_) => TaskType::ChooseWordVariant,
            TaskBody::BuildForeignWord(_) => TaskType::BuildForeignWord,
            TaskBody::PairMatch(_) => TaskType::PairMatch,
            TaskBody::AudioToWord(_) => TaskType::AudioToWord,
        }
    }

    /// The ground truth a complete answer is compared against.
    pub fn canonical_answer(&self) -> String {
        match &self.body {
            TaskBody::InsertMissingLetters(pattern) => pattern.correct_word.clone(),
            TaskBody::ChooseWordVariant(choice) => choice.correct().to_string(),
            TaskBody::BuildForeignWord(build) => build.target_word.clone(),
            TaskBody::PairMatch(pairs) => pairs.canonical(),
            TaskBody::AudioToWord(audio) => match &audio.inner {
                AudioBody::ChooseVariant(choice) => choice.correct().to_string(),
                AudioBody::BuildWord(build) => build.target_word.clone(),
            },
        }
    }

    /// `"<type>:<canonical answer>"`, used for cross-session mastery tracking.
    pub fn learning_key(&self) -> String {
        format!("{}:{}", self.task_type(), self.canonical_answer())
    }

    /// Display segments; only word patterns contain orthograms.
    pub fn segments(&self) -> Vec<Segment> {
        match &self.body {
            TaskBody::InsertMissingLetters(pattern) => pattern.segments.clone(),
            _ => vec![Segment::Text {
                text: self.canonical_answer(),
            }],
        }
    }

    pub fn orth_count(&self) -> usize {
        match &self.body {
            TaskBody::InsertMissingLetters(pattern) => pattern.orth_count(),
            _ => 0,
        }
    }

    /// Whether the task is answered over several `submit_answer` calls.
    pub fn is_multi_step(&self) -> bool {
        matches!(
            &self.body,
            TaskBody::InsertMissingLetters(_)
                | TaskBody::BuildForeignWord(_)
                | TaskBody::AudioToWord(AudioTask {
                    inner: AudioBody::BuildWord(_),
                    ..
                })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_type_display_and_parse() {
        assert_eq!(TaskType::PairMatch.to_string(), "pairMatch");
        assert_eq!(
            "insertMissingLetters".parse::<TaskType>().unwrap(),
            TaskType::InsertMissingLetters
        );
        assert_eq!(
            "audioToWord".parse::<TaskType>().unwrap(),
            TaskType::AudioToWord
        );
        assert!("dictation".parse::<TaskType>().is_err());
    }

    #[test]
    fn audio_mode_parse() {
        assert_eq!(
            "buildWord".parse::<AudioMode>().unwrap(),
            AudioMode::BuildWord
        );
        assert!("listen".parse::<AudioMode>().is_err());
    }

    #[test]
    fn raw_task_accessors() {
        let raw = RawTask::try_from(json!({"id": "w1", "type": "pairMatch"})).unwrap();
        assert_eq!(raw.id(), Some("w1"));
        assert_eq!(raw.type_tag(), Some("pairMatch"));
        assert!(RawTask::try_from(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn learning_key_uses_canonical_answer() {
        let task = CompiledTask {
            label: "#0".into(),
            hint: "...".into(),
            prompt: None,
            body: TaskBody::ChooseWordVariant(VariantChoice {
                variants: vec!["малако".into(), "молоко".into()],
                correct_index: 1,
            }),
        };
        assert_eq!(task.learning_key(), "chooseWordVariant:молоко");
        assert_eq!(task.orth_count(), 0);
        assert!(!task.is_multi_step());
    }

    #[test]
    fn pair_set_canonical_form() {
        let pairs = PairSet {
            pairs: vec![
                ("стол".into(), "table".into()),
                ("книга".into(), "book".into()),
            ],
        };
        assert_eq!(pairs.canonical(), "стол=table|книга=book");
        assert_eq!(pairs.right_for("книга"), Some("book"));
        assert_eq!(pairs.right_for("дом"), None);
    }
}
