//! Dictionary file loader.
//!
//! Loads dictionaries (a title plus a list of raw tasks) from JSON or TOML
//! files, whole directories, and subject indexes, and validates them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::TaskCatalog;
use crate::model::{RawTask, TaskId};

/// Intermediate structure for parsing dictionary files.
#[derive(Debug, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tasks: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    Json,
    Toml,
}

impl DictionaryFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(DictionaryFormat::Json),
            "toml" => Some(DictionaryFormat::Toml),
            _ => None,
        }
    }
}

/// A named set of raw tasks.
#[derive(Debug, Clone, Serialize)]
pub struct Dictionary {
    pub title: String,
    pub description: String,
    /// File the dictionary was read from.
    pub source: PathBuf,
    pub tasks: Vec<RawTask>,
}

impl Dictionary {
    /// Display name of the source file.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    pub fn catalog(&self) -> TaskCatalog {
        self.tasks.iter().cloned().collect()
    }
}

/// Read a dictionary file without validating its tasks.
pub fn read_dictionary(path: &Path) -> Result<Dictionary> {
    let format = DictionaryFormat::from_path(path)
        .with_context(|| format!("unsupported dictionary format: {}", path.display()))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary file: {}", path.display()))?;

    read_dictionary_str(&content, format, path)
}

/// Parse dictionary content without validating its tasks.
pub fn read_dictionary_str(
    content: &str,
    format: DictionaryFormat,
    source: &Path,
) -> Result<Dictionary> {
    parse_dictionary(content, format, source, None)
}

fn parse_dictionary(
    content: &str,
    format: DictionaryFormat,
    source: &Path,
    fallback_title: Option<&str>,
) -> Result<Dictionary> {
    let parsed: DictionaryFile = match format {
        DictionaryFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source.display()))?,
        DictionaryFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source.display()))?,
    };

    let name = file_label(source);
    if parsed.tasks.is_empty() {
        anyhow::bail!("file \"{name}\": dictionary has no tasks");
    }

    let tasks = parsed
        .tasks
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            RawTask::try_from(value).map_err(|e| anyhow::anyhow!("file \"{name}\": task #{i}: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let title = parsed
        .title
        .or_else(|| fallback_title.map(str::to_string))
        .unwrap_or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone())
        });

    Ok(Dictionary {
        title,
        description: parsed.description,
        source: source.to_path_buf(),
        tasks,
    })
}

/// Load a dictionary file, rejecting it if any task is malformed.
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let dictionary = read_dictionary(path)?;
    ensure_valid(&dictionary)?;
    Ok(dictionary)
}

/// Parse and validate dictionary content (useful for testing).
pub fn load_dictionary_str(
    content: &str,
    format: DictionaryFormat,
    source: &Path,
) -> Result<Dictionary> {
    let dictionary = read_dictionary_str(content, format, source)?;
    ensure_valid(&dictionary)?;
    Ok(dictionary)
}

fn ensure_valid(dictionary: &Dictionary) -> Result<()> {
    dictionary
        .catalog()
        .validate_all()
        .map_err(|e| anyhow::anyhow!("file \"{}\": {}", dictionary.file_name(), e))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Every dictionary file under `dir`, recursively, in path order.
///
/// Subject index files (`index.json`) are not dictionaries and are left out.
pub fn dictionary_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut paths = Vec::new();
    for path in entries {
        if path.is_dir() {
            paths.extend(dictionary_paths(&path)?);
        } else if path.file_name().is_some_and(|n| n == "index.json") {
            continue;
        } else if DictionaryFormat::from_path(&path).is_some() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Recursively load every dictionary file in a directory.
///
/// Files that fail to load are skipped with a warning.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Dictionary>> {
    let mut dictionaries = Vec::new();
    for path in dictionary_paths(dir)? {
        match load_dictionary(&path) {
            Ok(dictionary) => dictionaries.push(dictionary),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(dictionaries)
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    title: String,
    dir: String,
}

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    file: String,
    title: String,
}

/// A subject and the dictionaries listed in its index.
#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub title: String,
    pub dir: String,
    pub dictionaries: Vec<Dictionary>,
}

fn read_index<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read index: {}", path.display()))?;
    let entries: Vec<T> = serde_json::from_str(&content)
        .with_context(|| format!("malformed index: {}", path.display()))?;
    if entries.is_empty() {
        anyhow::bail!("index is empty: {}", path.display());
    }
    Ok(entries)
}

/// Load every subject listed in `<root>/index.json`.
///
/// Each subject directory holds its own `index.json` naming dictionary files
/// under `dictionaries/`. A dictionary without a title takes the one from the
/// index.
pub fn load_subjects(root: &Path) -> Result<Vec<Subject>> {
    let subjects: Vec<SubjectEntry> = read_index(&root.join("index.json"))?;

    subjects
        .into_iter()
        .map(|subject| {
            let subject_dir = root.join(&subject.dir);
            let entries: Vec<DictionaryEntry> = read_index(&subject_dir.join("index.json"))
                .with_context(|| format!("subject \"{}\"", subject.title))?;

            let dictionaries = entries
                .into_iter()
                .map(|entry| {
                    let path = subject_dir.join("dictionaries").join(&entry.file);
                    load_indexed_dictionary(&path, &entry.title)
                        .with_context(|| format!("subject \"{}\"", subject.title))
                })
                .collect::<Result<Vec<_>>>()?;

            tracing::debug!(
                "loaded subject {} ({} dictionaries)",
                subject.title,
                dictionaries.len()
            );
            Ok(Subject {
                title: subject.title,
                dir: subject.dir,
                dictionaries,
            })
        })
        .collect()
}

fn load_indexed_dictionary(path: &Path, index_title: &str) -> Result<Dictionary> {
    let format = DictionaryFormat::from_path(path)
        .with_context(|| format!("unsupported dictionary format: {}", path.display()))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary file: {}", path.display()))?;
    let dictionary = parse_dictionary(&content, format, path, Some(index_title))?;
    ensure_valid(&dictionary)?;
    Ok(dictionary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found by [`validate_dictionary`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// The task label (if applicable).
    pub task: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Validate a dictionary, collecting every issue instead of stopping at the
/// first malformed task.
pub fn validate_dictionary(dictionary: &Dictionary) -> Vec<ValidationIssue> {
    let catalog = dictionary.catalog();
    let mut issues: Vec<ValidationIssue> = catalog
        .errors()
        .into_iter()
        .map(|(id, e)| ValidationIssue {
            severity: Severity::Error,
            task: Some(catalog.label(id)),
            message: e.to_string(),
        })
        .collect();

    // Duplicate task ids
    let mut seen_ids = std::collections::HashSet::new();
    for id in catalog.ids() {
        if let Some(task_id) = catalog.raw(id).and_then(RawTask::id) {
            if !seen_ids.insert(task_id) {
                issues.push(ValidationIssue {
                    severity: Severity::Warning,
                    task: Some(task_id.to_string()),
                    message: format!("duplicate task id: {task_id}"),
                });
            }
        }
    }

    // Tasks teaching the same thing share mastery
    let mut seen_keys: HashMap<String, TaskId> = HashMap::new();
    for id in catalog.ids() {
        let Ok(task) = catalog.compiled(id) else {
            continue;
        };
        let key = task.learning_key();
        if let Some(first) = seen_keys.get(&key) {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                task: Some(catalog.label(id)),
                message: format!(
                    "learning key {key} is shared with {}",
                    catalog.label(*first)
                ),
            });
        } else {
            seen_keys.insert(key, id);
        }
    }

    issues
}
