//! Task compiler, quiz session engine and scoring for spellquiz.
//!
//! This crate turns loosely-typed quiz task records into validated models,
//! drives a quiz session through them, and aggregates the results. It does
//! no rendering; the CLI crate builds on top of it.

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod evaluate;
pub mod learned;
pub mod model;
pub mod parser;
pub mod pattern;
pub mod results;
pub mod sampler;
pub mod session;
pub mod shuffle;
pub mod view;

pub use catalog::TaskCatalog;
pub use compiler::{compile, validate};
pub use error::QuizError;
pub use evaluate::{AnswerInput, Mismatch, Outcome};
pub use learned::LearnedKeys;
pub use model::{CompiledTask, RawTask, TaskId, TaskType};
pub use results::{build_result, QuizResult};
pub use sampler::{learning_key, sample, sample_uniform, QuizLength};
pub use session::{start_quiz, AnswerResult, QuizSession, SessionState};
pub use shuffle::{shuffle, RandomSource, RngSource};
