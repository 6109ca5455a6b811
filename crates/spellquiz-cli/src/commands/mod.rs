pub mod init;
pub mod play;
pub mod sample;
pub mod subjects;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use spellquiz_core::parser::{self, Dictionary};
use spellquiz_core::{QuizLength, RandomSource, RngSource, TaskCatalog};

/// Load a dictionary file, or every dictionary in a directory, as one catalog.
pub(crate) fn load_catalog(path: &Path) -> Result<(String, TaskCatalog)> {
    let dictionaries: Vec<Dictionary> = if path.is_dir() {
        parser::load_catalog_directory(path)?
    } else {
        vec![parser::load_dictionary(path)?]
    };
    anyhow::ensure!(
        !dictionaries.is_empty(),
        "no dictionaries found in {}",
        path.display()
    );

    let title = dictionaries
        .iter()
        .map(|d| d.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let catalog = dictionaries
        .into_iter()
        .flat_map(|d| d.tasks)
        .collect::<TaskCatalog>();
    Ok((title, catalog))
}

/// `--count` wins over the configured default.
///
/// Zero or an unreadable count falls back to the default quiz length.
pub(crate) fn quiz_length(count: Option<&str>, default: QuizLength) -> QuizLength {
    match count {
        Some(s) => {
            let length = QuizLength::parse_or_default(s);
            if s.trim().parse::<QuizLength>().is_err() {
                tracing::warn!("invalid quiz length '{s}', using {length}");
            }
            length
        }
        None => default,
    }
}

pub(crate) fn random_source(seed: Option<u64>) -> impl RandomSource {
    match seed {
        Some(seed) => {
            tracing::debug!("using seed {seed}");
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_flag_overrides_config() {
        assert_eq!(quiz_length(Some("3"), QuizLength::All), QuizLength::Count(3));
        assert_eq!(quiz_length(Some("all"), QuizLength::Count(5)), QuizLength::All);
        assert_eq!(quiz_length(None, QuizLength::Count(5)), QuizLength::Count(5));
    }

    #[test]
    fn bad_count_falls_back_to_default_length() {
        for raw in ["0", "zero", "-4"] {
            let length = quiz_length(Some(raw), QuizLength::All);
            assert_eq!(length, QuizLength::Count(10), "{raw}");
            assert_eq!(length.resolve(8), 8);
            assert_eq!(length.resolve(25), 10);
        }
    }
}
