//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use spellquiz_core::QuizLength;

/// Top-level spellquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellquizConfig {
    /// Tasks per quiz: a number or `"all"`.
    #[serde(default, deserialize_with = "lenient_length")]
    pub default_count: QuizLength,
    /// Where mastered learning keys are kept.
    #[serde(default = "default_learned_path")]
    pub learned_path: PathBuf,
    /// Fixed seed for reproducible quizzes.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Output directory for quiz results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_learned_path() -> PathBuf {
    PathBuf::from("./spellquiz-learned.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./spellquiz-results")
}

/// Accepts `10`, `"10"` or `"all"`; anything else means the default length.
fn lenient_length<'de, D>(deserializer: D) -> Result<QuizLength, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) if n > 0 => QuizLength::Count(n as usize),
        Raw::Number(_) => QuizLength::default(),
        Raw::Text(s) => QuizLength::parse_or_default(&s),
    })
}

impl Default for SpellquizConfig {
    fn default() -> Self {
        Self {
            default_count: QuizLength::default(),
            learned_path: default_learned_path(),
            seed: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `spellquiz.toml` in the current directory
/// 2. `~/.config/spellquiz/config.toml`
///
/// Environment variable overrides: `SPELLQUIZ_SEED`, `SPELLQUIZ_LEARNED`.
pub fn load_config_from(path: Option<&Path>) -> Result<SpellquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("spellquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SpellquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SpellquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(seed) = std::env::var("SPELLQUIZ_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("SPELLQUIZ_SEED must be a number, got '{seed}'"))?;
        config.seed = Some(seed);
    }
    if let Ok(learned) = std::env::var("SPELLQUIZ_LEARNED") {
        config.learned_path = PathBuf::from(learned);
    }

    config.learned_path = resolve_path(&config.learned_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("spellquiz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SPELLQUIZ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SPELLQUIZ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SPELLQUIZ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${"), "no_close_${");
        std::env::remove_var("_SPELLQUIZ_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = SpellquizConfig::default();
        assert_eq!(config.default_count, QuizLength::Count(10));
        assert_eq!(config.learned_path, PathBuf::from("./spellquiz-learned.json"));
        assert!(config.seed.is_none());
    }

    #[test]
    fn parse_config() {
        let config: SpellquizConfig = toml::from_str(
            r#"
default_count = "all"
learned_path = "data/learned.json"
seed = 42
"#,
        )
        .unwrap();
        assert_eq!(config.default_count, QuizLength::All);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.output_dir, PathBuf::from("./spellquiz-results"));

        let numeric: SpellquizConfig = toml::from_str("default_count = 5").unwrap();
        assert_eq!(numeric.default_count, QuizLength::Count(5));

        let junk: SpellquizConfig = toml::from_str("default_count = \"lots\"").unwrap();
        assert_eq!(junk.default_count, QuizLength::Count(10));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());

        let path = dir.path().join("spellquiz.toml");
        std::fs::write(&path, "default_count = 3\noutput_dir = \"out\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_count, QuizLength::Count(3));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
