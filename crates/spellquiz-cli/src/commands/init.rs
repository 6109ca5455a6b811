//! The `spellquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create spellquiz.toml
    if std::path::Path::new("spellquiz.toml").exists() {
        println!("spellquiz.toml already exists, skipping.");
    } else {
        std::fs::write("spellquiz.toml", SAMPLE_CONFIG)?;
        println!("Created spellquiz.toml");
    }

    // Create example dictionary
    std::fs::create_dir_all("dictionaries")?;
    let example_path = std::path::Path::new("dictionaries/example.json");
    if example_path.exists() {
        println!("dictionaries/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DICTIONARY)?;
        println!("Created dictionaries/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Add your own tasks to dictionaries/");
    println!("  2. Run: spellquiz validate --catalog dictionaries");
    println!("  3. Run: spellquiz play --catalog dictionaries");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# spellquiz configuration

# Tasks per quiz: a number or "all"
default_count = 10

# Mastered words are remembered here between quizzes
learned_path = "./spellquiz-learned.json"

# Quiz results (JSON)
output_dir = "./spellquiz-results"

# Uncomment for a reproducible task order
# seed = 42
"#;

const EXAMPLE_DICTIONARY: &str = r#"{
  "title": "Example dictionary",
  "description": "One task of every type",
  "tasks": [
    {
      "id": "milk",
      "type": "insertMissingLetters",
      "word": "м[ао|о]л[ао|о]ко",
      "hint": "Словарное слово: молоко"
    },
    {
      "id": "cow",
      "type": "chooseWordVariant",
      "prompt": "Выбери правильное написание",
      "variants": ["карова", "корова", "коровва"],
      "correctIndex": 1,
      "hint": "Словарное слово: корова"
    },
    {
      "id": "table",
      "type": "buildForeignWord",
      "sourceWord": "стол",
      "targetWord": "table",
      "letters": ["t", "a", "b", "l", "e"],
      "hint": "table"
    },
    {
      "id": "furniture",
      "type": "pairMatch",
      "pairs": [["стол", "table"], ["стул", "chair"], ["книга", "book"]],
      "hint": "table, chair, book"
    },
    {
      "id": "book-audio",
      "type": "audioToWord",
      "mode": "chooseVariant",
      "audioSrc": "audio/book.mp3",
      "variants": ["book", "bok", "buk"],
      "correctIndex": 0,
      "hint": "book"
    }
  ]
}
"#;
