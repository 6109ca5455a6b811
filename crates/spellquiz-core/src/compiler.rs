//! Task validation and compilation.
//!
//! Turns a [`RawTask`] into a [`CompiledTask`], rejecting malformed records
//! with a [`QuizError::Validation`] that names the task and the field.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::QuizError;
use crate::model::{
    AudioBody, AudioMode, AudioTask, CompiledTask, PairSet, RawTask, TaskBody, TaskType,
    VariantChoice, WordBuild,
};
use crate::pattern;

pub const MIN_VARIANTS: usize = 2;
pub const MAX_VARIANTS: usize = 6;
pub const MIN_PAIRS: usize = 2;
pub const MAX_PAIRS: usize = 8;

/// Check a raw task without keeping the compiled form.
pub fn validate(raw: &RawTask) -> Result<(), QuizError> {
    compile(raw).map(|_| ())
}

/// Compile a raw task, labelling errors by its `id` (or its type).
pub fn compile(raw: &RawTask) -> Result<CompiledTask, QuizError> {
    let label = raw
        .id()
        .or_else(|| raw.type_tag())
        .unwrap_or("task")
        .to_string();
    compile_labeled(raw, &label)
}

/// Compile a raw task, labelling errors and the result with `label`.
pub fn compile_labeled(raw: &RawTask, label: &str) -> Result<CompiledTask, QuizError> {
    let fields = Fields { raw, label };

    let type_tag = fields.required_str("type")?;
    let task_type: TaskType = type_tag
        .parse()
        .map_err(|e: String| fields.error("type", e))?;

    let body = match task_type {
        TaskType::InsertMissingLetters => {
            let word = fields.required_str("word")?;
            let parsed = pattern::parse(word).map_err(|e| fields.error("word", e.to_string()))?;
            TaskBody::InsertMissingLetters(parsed)
        }
        TaskType::ChooseWordVariant => TaskBody::ChooseWordVariant(fields.variant_choice()?),
        TaskType::BuildForeignWord => TaskBody::BuildForeignWord(fields.word_build()?),
        TaskType::PairMatch => TaskBody::PairMatch(fields.pair_set()?),
        TaskType::AudioToWord => {
            let audio_src = fields.required_str("audioSrc")?.to_string();
            let mode: AudioMode = fields
                .required_str("mode")?
                .parse()
                .map_err(|e: String| fields.error("mode", e))?;
            let inner = match mode {
                AudioMode::ChooseVariant => AudioBody::ChooseVariant(fields.variant_choice()?),
                AudioMode::BuildWord => AudioBody::BuildWord(fields.word_build()?),
            };
            TaskBody::AudioToWord(AudioTask { audio_src, inner })
        }
    };

    let hint = fields.required_str("hint")?.to_string();
    let prompt = fields.optional_str("prompt")?.map(str::to_string);

    Ok(CompiledTask {
        label: label.to_string(),
        hint,
        prompt,
        body,
    })
}

/// Typed access to the fields of one raw task.
struct Fields<'a> {
    raw: &'a RawTask,
    label: &'a str,
}

impl<'a> Fields<'a> {
    fn error(&self, field: &str, message: impl Into<String>) -> QuizError {
        QuizError::validation(self.label, field, message)
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    fn required_str(&self, field: &str) -> Result<&'a str, QuizError> {
        let value = self
            .present(field)
            .ok_or_else(|| self.error(field, "is required"))?;
        let s = value
            .as_str()
            .ok_or_else(|| self.error(field, "must be a string"))?;
        if s.trim().is_empty() {
            return Err(self.error(field, "must not be empty"));
        }
        Ok(s)
    }

    fn optional_str(&self, field: &str) -> Result<Option<&'a str>, QuizError> {
        match self.present(field) {
            None => Ok(None),
            Some(_) => self.required_str(field).map(Some),
        }
    }

    fn array(&self, field: &str) -> Result<&'a Vec<Value>, QuizError> {
        self.present(field)
            .ok_or_else(|| self.error(field, "is required"))?
            .as_array()
            .ok_or_else(|| self.error(field, "must be an array"))
    }

    fn variant_choice(&self) -> Result<VariantChoice, QuizError> {
        let items = self.array("variants")?;
        if !(MIN_VARIANTS..=MAX_VARIANTS).contains(&items.len()) {
            return Err(self.error(
                "variants",
                format!(
                    "must contain {MIN_VARIANTS} to {MAX_VARIANTS} items, got {}",
                    items.len()
                ),
            ));
        }

        let mut variants = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            let text = item
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    self.error("variants", format!("item {i} must be a non-empty string"))
                })?;
            if !seen.insert(text) {
                return Err(self.error("variants", format!("duplicate variant '{text}'")));
            }
            variants.push(text.to_string());
        }

        let correct_index = self
            .present("correctIndex")
            .ok_or_else(|| self.error("correctIndex", "is required"))?
            .as_u64()
            .ok_or_else(|| self.error("correctIndex", "must be a non-negative integer"))?
            as usize;
        if correct_index >= variants.len() {
            return Err(self.error(
                "correctIndex",
                format!(
                    "{correct_index} is out of range for {} variants",
                    variants.len()
                ),
            ));
        }

        Ok(VariantChoice {
            variants,
            correct_index,
        })
    }

    fn word_build(&self) -> Result<WordBuild, QuizError> {
        let target_word = self.required_str("targetWord")?.trim().to_string();
        let source_word = self
            .optional_str("sourceWord")?
            .map(|w| w.trim().to_string());

        let mut letters = Vec::new();
        for (i, item) in self.array("letters")?.iter().enumerate() {
            let mut chars = item.as_str().unwrap_or_default().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => letters.push(c),
                _ => {
                    return Err(
                        self.error("letters", format!("item {i} must be a single character"))
                    )
                }
            }
        }

        let mut available: HashMap<char, usize> = HashMap::new();
        for &c in &letters {
            *available.entry(c).or_default() += 1;
        }
        for c in target_word.chars() {
            match available.get_mut(&c) {
                Some(n) if *n > 0 => *n -= 1,
                _ => {
                    return Err(self.error(
                        "letters",
                        format!("not enough '{c}' tiles to spell '{target_word}'"),
                    ))
                }
            }
        }

        Ok(WordBuild {
            target_word,
            source_word,
            letters,
        })
    }

    fn pair_set(&self) -> Result<PairSet, QuizError> {
        let items = self.array("pairs")?;
        if !(MIN_PAIRS..=MAX_PAIRS).contains(&items.len()) {
            return Err(self.error(
                "pairs",
                format!(
                    "must contain {MIN_PAIRS} to {MAX_PAIRS} pairs, got {}",
                    items.len()
                ),
            ));
        }

        let mut pairs = Vec::with_capacity(items.len());
        let mut lefts = HashSet::new();
        let mut rights = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            let pair = match item.as_array().map(Vec::as_slice) {
                Some([Value::String(l), Value::String(r)])
                    if !l.trim().is_empty() && !r.trim().is_empty() =>
                {
                    (l.trim().to_string(), r.trim().to_string())
                }
                _ => {
                    return Err(self.error(
                        "pairs",
                        format!("item {i} must be a [left, right] pair of non-empty strings"),
                    ))
                }
            };
            if !lefts.insert(pair.0.clone()) {
                return Err(self.error("pairs", format!("duplicate left item '{}'", pair.0)));
            }
            if !rights.insert(pair.1.clone()) {
                return Err(self.error("pairs", format!("duplicate right item '{}'", pair.1)));
            }
            pairs.push(pair);
        }

        Ok(PairSet { pairs })
    }
}
