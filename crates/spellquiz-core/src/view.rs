//! Runtime views: the randomized display order of a task's choices.
//!
//! A view is built once per task instance and cached by the catalog.
//! Index-based answers (tiles) refer to positions in this fixed order, so it
//! must never be rebuilt while a task is in progress.

use serde::{Deserialize, Serialize};

use crate::model::{AudioBody, AudioTask, CompiledTask, TaskBody};
use crate::shuffle::{shuffle, RandomSource};

/// A variant together with its position in the catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedVariant {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeView {
    /// Word patterns are shown as written.
    Pattern,
    Variants { variants: Vec<IndexedVariant> },
    Tiles { tiles: Vec<char> },
    Pairs { left: Vec<String>, right: Vec<String> },
}

impl RuntimeView {
    pub fn build<R: RandomSource + ?Sized>(task: &CompiledTask, rng: &mut R) -> Self {
        match &task.body {
            TaskBody::InsertMissingLetters(_) => RuntimeView::Pattern,
            TaskBody::ChooseWordVariant(choice)
            | TaskBody::AudioToWord(AudioTask {
                inner: AudioBody::ChooseVariant(choice),
                ..
            }) => {
                let indexed: Vec<IndexedVariant> = choice
                    .variants
                    .iter()
                    .enumerate()
                    .map(|(index, text)| IndexedVariant {
                        index,
                        text: text.clone(),
                    })
                    .collect();
                RuntimeView::Variants {
                    variants: shuffle(&indexed, rng),
                }
            }
            TaskBody::BuildForeignWord(build)
            | TaskBody::AudioToWord(AudioTask {
                inner: AudioBody::BuildWord(build),
                ..
            }) => RuntimeView::Tiles {
                tiles: shuffle(&build.letters, rng),
            },
            TaskBody::PairMatch(pairs) => {
                let left = shuffle(&pairs.left(), rng);
                let right = shuffle(&pairs.right(), rng);
                RuntimeView::Pairs { left, right }
            }
        }
    }

    pub fn tiles(&self) -> Option<&[char]> {
        match self {
            RuntimeView::Tiles { tiles } => Some(tiles),
            _ => None,
        }
    }

    pub fn variants(&self) -> Option<&[IndexedVariant]> {
        match self {
            RuntimeView::Variants { variants } => Some(variants),
            _ => None,
        }
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

    #[test]
    fn variants_keep_their_catalog_index() {
        let task = compiled(json!({
            "type": "chooseWordVariant",
            "variants": ["малако", "молоко", "малоко"],
            "correctIndex": 1,
            "hint": "...",
        }));
        let view = RuntimeView::build(&task, &mut || 0.0);
        let variants = view.variants().unwrap();
        assert_eq!(variants.len(), 3);
        for v in variants {
            assert_eq!(
                ["малако", "молоко", "малоко"][v.index],
                v.text,
                "index must point back at the catalog variant"
            );
        }
        assert_ne!(variants[0].index, 0);
    }

    #[test]
    fn tiles_are_a_permutation_of_letters() {
        let task = compiled(json!({
            "type": "audioToWord",
            "mode": "buildWord",
            "audioSrc": "book.mp3",
            "targetWord": "book",
            "letters": ["b", "o", "o", "k"],
            "hint": "...",
        }));
        let view = RuntimeView::build(&task, &mut || 0.0);
        let mut tiles = view.tiles().unwrap().to_vec();
        assert_eq!(tiles, vec!['o', 'o', 'k', 'b']);
        tiles.sort();
        assert_eq!(tiles, vec!['b', 'k', 'o', 'o']);
    }

    #[test]
    fn pair_columns_are_shuffled_independently() {
        let task = compiled(json!({
            "type": "pairMatch",
            "pairs": [["стол", "table"], ["книга", "book"], ["дом", "house"]],
            "hint": "...",
        }));
        let mut draws = [0.0, 0.0, 0.99, 0.99].into_iter();
        let view = RuntimeView::build(&task, &mut || draws.next().unwrap_or(0.0));
        match view {
            RuntimeView::Pairs { left, right } => {
                assert_eq!(left, vec!["книга", "дом", "стол"]);
                assert_eq!(right, vec!["table", "book", "house"]);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn patterns_have_no_permutation() {
        let task = compiled(json!({
            "type": "insertMissingLetters",
            "word": "[ео|е]ж",
            "hint": "...",
        }));
        assert_eq!(RuntimeView::build(&task, &mut || 0.5), RuntimeView::Pattern);
    }
}
