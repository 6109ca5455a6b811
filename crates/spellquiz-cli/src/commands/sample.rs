//! The `spellquiz sample` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use spellquiz_core::{sample, sample_uniform, LearnedKeys};

use crate::config::load_config_from;

pub fn execute(
    catalog_path: PathBuf,
    count: Option<String>,
    learned_path: Option<PathBuf>,
    seed: Option<u64>,
    uniform: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (title, catalog) = super::load_catalog(&catalog_path)?;
    let length = super::quiz_length(count.as_deref(), config.default_count);
    let learned_path = learned_path.unwrap_or(config.learned_path);
    let learned = LearnedKeys::load(&learned_path)?;
    let mut rng = super::random_source(seed.or(config.seed));

    let n = length.resolve(catalog.len());
    let ids = if uniform {
        sample_uniform(&catalog, n, &mut rng)?
    } else {
        sample(&catalog, n, &learned, &mut rng)?
    };

    println!(
        "{title}: {} of {} tasks ({} learned)",
        ids.len(),
        catalog.len(),
        learned.len()
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Task", "Type", "Learning key", "Learned"]);
    for (i, id) in ids.iter().enumerate() {
        let task = catalog.compiled(*id)?;
        let key = task.learning_key();
        let is_learned = learned.contains(&key);
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&task.label),
            Cell::new(task.task_type()),
            Cell::new(key),
            Cell::new(if is_learned { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");

    Ok(())
}
