//! The `spellquiz subjects` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use spellquiz_core::parser;

pub fn execute(root: PathBuf) -> Result<()> {
    let subjects = parser::load_subjects(&root)?;

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Dictionary", "File", "Tasks"]);
    for subject in &subjects {
        for dictionary in &subject.dictionaries {
            table.add_row(vec![
                Cell::new(&subject.title),
                Cell::new(&dictionary.title),
                Cell::new(dictionary.source.display()),
                Cell::new(dictionary.tasks.len()),
            ]);
        }
    }
    println!("{table}");
    println!("{} subject(s)", subjects.len());

    Ok(())
}
