//! The `spellquiz play` command.
//!
//! Runs a quiz line by line: each task is printed, and each input line is
//! turned into one or more answers. `:reset` restarts a multi-step task and
//! `:quit` ends the quiz early.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use spellquiz_core::model::{AudioBody, TaskBody};
use spellquiz_core::session::SessionTask;
use spellquiz_core::view::RuntimeView;
use spellquiz_core::{
    build_result, start_quiz, AnswerInput, AnswerResult, LearnedKeys, QuizResult, QuizSession,
};

use crate::config::load_config_from;

pub fn execute(
    catalog_path: PathBuf,
    count: Option<String>,
    learned_path: Option<PathBuf>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (title, catalog) = super::load_catalog(&catalog_path)?;
    let length = super::quiz_length(count.as_deref(), config.default_count);
    let learned_path = learned_path.unwrap_or(config.learned_path);
    let mut learned = LearnedKeys::load(&learned_path)?;
    let mut rng = super::random_source(seed.or(config.seed));

    let mut session = start_quiz(&catalog, length, &learned, &mut rng)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{title}: {} tasks", session.len())?;
    run_session(&mut session, stdin.lock(), &mut out)?;

    let result = build_result(&session);
    print_summary(&result, &mut out)?;

    let before = learned.len();
    learned.extend(session.mastered_keys());
    if learned.len() > before {
        learned.save(&learned_path)?;
        writeln!(
            out,
            "{} new word(s) learned, saved to {}",
            learned.len() - before,
            learned_path.display()
        )?;
    }

    let output = output.unwrap_or(config.output_dir);
    let path = output.join(result.file_name());
    result.save_json(&path)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

/// Drive a session from `input` until it finishes, the input ends, or the
/// player quits.
pub(crate) fn run_session<I: BufRead, O: Write>(
    session: &mut QuizSession,
    input: I,
    out: &mut O,
) -> Result<()> {
    let mut lines = input.lines();

    while let Some(current) = session.current_task().cloned() {
        render_task(session, &current, out)?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            ":quit" => break,
            ":reset" => {
                if let Err(e) = session.reset_current_task() {
                    writeln!(out, "  ! {e}")?;
                }
                continue;
            }
            _ => {}
        }

        let inputs = match parse_line(session, &current, line) {
            Ok(inputs) => inputs,
            Err(message) => {
                writeln!(out, "  ! {message}")?;
                continue;
            }
        };

        for input in inputs {
            match session.submit_answer(&input) {
                Ok(AnswerResult::Pending { .. }) => {}
                Ok(AnswerResult::Final(outcome)) => {
                    if outcome.is_correct {
                        writeln!(out, "  Correct! {}", outcome.correct)?;
                    } else {
                        writeln!(out, "  Wrong: {}", outcome.selected)?;
                        writeln!(out, "  Answer: {}", outcome.correct)?;
                        writeln!(out, "  Hint: {}", outcome.hint)?;
                    }
                    session.advance()?;
                    break;
                }
                Err(e) => {
                    writeln!(out, "  ! {e}")?;
                    break;
                }
            }
        }
    }

    Ok(())
}

fn render_task<O: Write>(session: &QuizSession, current: &SessionTask, out: &mut O) -> Result<()> {
    let task = &current.task;
    writeln!(
        out,
        "\n[{}/{}] {}",
        session.current_index() + 1,
        session.len(),
        task.task_type()
    )?;
    if let Some(prompt) = &task.prompt {
        writeln!(out, "  {prompt}")?;
    }

    match (&task.body, &*current.view) {
        (TaskBody::InsertMissingLetters(pattern), _) => {
            writeln!(out, "  {}", pattern.fill(&session.progress().letters()))?;
            if let Some(orthogram) = pattern.orthograms.get(session.step_index()) {
                let options: Vec<String> =
                    orthogram.options.iter().map(char::to_string).collect();
                writeln!(
                    out,
                    "  blank {} of {}: {}",
                    session.step_index() + 1,
                    pattern.orth_count(),
                    options.join(" / ")
                )?;
            }
        }
        (TaskBody::AudioToWord(audio), view) => {
            writeln!(out, "  (audio: {})", audio.audio_src)?;
            if let AudioBody::BuildWord(build) = &audio.inner {
                render_tiles(session, view, build.source_word.as_deref(), out)?;
            } else {
                render_variants(view, out)?;
            }
        }
        (TaskBody::ChooseWordVariant(_), view) => render_variants(view, out)?,
        (TaskBody::BuildForeignWord(build), view) => {
            render_tiles(session, view, build.source_word.as_deref(), out)?
        }
        (TaskBody::PairMatch(_), RuntimeView::Pairs { left, right }) => {
            writeln!(out, "  match each left word to a right word (e.g. 1=2, 2=1)")?;
            for i in 0..left.len().max(right.len()) {
                writeln!(
                    out,
                    "  {:>2}. {:<20} {:>2}. {}",
                    i + 1,
                    left.get(i).map(String::as_str).unwrap_or(""),
                    i + 1,
                    right.get(i).map(String::as_str).unwrap_or("")
                )?;
            }
        }
        (TaskBody::PairMatch(_), _) => {}
    }
    Ok(())
}

fn render_variants<O: Write>(view: &RuntimeView, out: &mut O) -> Result<()> {
    for (i, variant) in view.variants().unwrap_or_default().iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, variant.text)?;
    }
    Ok(())
}

fn render_tiles<O: Write>(
    session: &QuizSession,
    view: &RuntimeView,
    source_word: Option<&str>,
    out: &mut O,
) -> Result<()> {
    if let Some(word) = source_word {
        writeln!(out, "  translate: {word}")?;
    }
    let tiles = view.tiles().unwrap_or_default();
    let used = session.progress().tiles();
    let built: String = used.iter().filter_map(|&i| tiles.get(i)).collect();
    if !built.is_empty() {
        writeln!(out, "  so far: {built}")?;
    }
    let free: Vec<String> = tiles
        .iter()
        .enumerate()
        .filter(|(i, _)| !used.contains(i))
        .map(|(i, c)| format!("{}:{c}", i + 1))
        .collect();
    writeln!(out, "  tiles: {}", free.join("  "))?;
    Ok(())
}

/// Turn one input line into the answers it stands for.
fn parse_line(
    session: &QuizSession,
    current: &SessionTask,
    line: &str,
) -> Result<Vec<AnswerInput>, String> {
    match &*current.view {
        RuntimeView::Pattern => Ok(line
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(AnswerInput::Letter)
            .collect()),
        RuntimeView::Variants { variants } => {
            let chosen = match line.parse::<usize>() {
                Ok(n) if (1..=variants.len()).contains(&n) => &variants[n - 1],
                Ok(n) => return Err(format!("choose 1 to {}, got {n}", variants.len())),
                Err(_) => variants
                    .iter()
                    .find(|v| v.text == line)
                    .ok_or_else(|| format!("'{line}' is not one of the variants"))?,
            };
            Ok(vec![AnswerInput::Variant(chosen.index)])
        }
        RuntimeView::Tiles { tiles } => parse_tiles(tiles, &session.progress().tiles(), line),
        RuntimeView::Pairs { left, right } => {
            parse_mapping(left, right, line).map(|m| vec![AnswerInput::Mapping(m)])
        }
    }
}

/// Tiles are given by 1-based number, or spelled out as letters.
fn parse_tiles(tiles: &[char], used: &[usize], line: &str) -> Result<Vec<AnswerInput>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.iter().all(|t| t.parse::<usize>().is_ok()) {
        return tokens
            .iter()
            .map(|t| match t.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(AnswerInput::Tile(n - 1)),
                _ => Err(format!("tile numbers start at 1, got {t}")),
            })
            .collect();
    }

    let mut taken = used.to_vec();
    let mut inputs = Vec::new();
    for letter in line.chars().filter(|c| !c.is_whitespace()) {
        let index = tiles
            .iter()
            .enumerate()
            .position(|(i, c)| *c == letter && !taken.contains(&i))
            .ok_or_else(|| format!("no free '{letter}' tile"))?;
        taken.push(index);
        inputs.push(AnswerInput::Tile(index));
    }
    Ok(inputs)
}

/// `left=right` items separated by commas; either side may be a 1-based
/// position in its column or the word itself.
fn parse_mapping(
    left: &[String],
    right: &[String],
    line: &str,
) -> Result<BTreeMap<String, String>, String> {
    let pick = |column: &[String], token: &str| -> String {
        match token.parse::<usize>() {
            Ok(n) if (1..=column.len()).contains(&n) => column[n - 1].clone(),
            _ => token.to_string(),
        }
    };

    line.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (l, r) = item
                .split_once('=')
                .ok_or_else(|| format!("expected left=right, got '{item}'"))?;
            Ok((pick(left, l.trim()), pick(right, r.trim())))
        })
        .collect()
}

fn print_summary<O: Write>(result: &QuizResult, out: &mut O) -> Result<()> {
    writeln!(out)?;
    let mut table = Table::new();
    table.set_header(vec!["Type", "Answered", "Correct"]);
    for (task_type, stats) in &result.per_type {
        table.add_row(vec![
            Cell::new(task_type),
            Cell::new(stats.total),
            Cell::new(stats.correct),
        ]);
    }
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Score: {}/{} ({}%)",
        result.correct_count, result.total, result.percent
    )?;

    if !result.wrong_outcomes.is_empty() {
        writeln!(out, "To review:")?;
        for outcome in &result.wrong_outcomes {
            writeln!(out, "  {} (you answered {})", outcome.correct, outcome.selected)?;
        }
    }
    Ok(())
}
