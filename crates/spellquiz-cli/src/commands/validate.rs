//! The `spellquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use spellquiz_core::parser::{self, Severity};

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let paths = if catalog_path.is_dir() {
        parser::dictionary_paths(&catalog_path)?
    } else {
        vec![catalog_path]
    };
    anyhow::ensure!(!paths.is_empty(), "no dictionary files found");

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for path in &paths {
        let dictionary = match parser::read_dictionary(path) {
            Ok(d) => d,
            Err(e) => {
                println!("Dictionary: {}", path.display());
                println!("   ERROR: {e:#}");
                total_errors += 1;
                continue;
            }
        };
        println!(
            "Dictionary: {} ({} tasks)",
            dictionary.title,
            dictionary.tasks.len()
        );

        for issue in parser::validate_dictionary(&dictionary) {
            let prefix = issue
                .task
                .as_ref()
                .map(|t| format!("  [{t}]"))
                .unwrap_or_else(|| "  ".to_string());
            match issue.severity {
                Severity::Error => {
                    println!("{prefix} ERROR: {}", issue.message);
                    total_errors += 1;
                }
                Severity::Warning => {
                    println!("{prefix} WARNING: {}", issue.message);
                    total_warnings += 1;
                }
            }
        }
    }

    if total_errors > 0 {
        println!("\n{total_errors} error(s), {total_warnings} warning(s) found.");
        anyhow::bail!("catalog has {total_errors} error(s)");
    }

    println!("All dictionaries valid.");
    if total_warnings > 0 {
        println!("{total_warnings} warning(s) found.");
    }
    Ok(())
}
