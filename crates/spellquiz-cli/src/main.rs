//! The `spellquiz` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "spellquiz", version, about = "Spelling and vocabulary quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate dictionary files
    Validate {
        /// Path to a dictionary file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Show which tasks a quiz would draw
    Sample {
        /// Path to a dictionary file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Number of tasks, or "all"
        #[arg(long)]
        count: Option<String>,

        /// Learned-keys file (JSON array)
        #[arg(long)]
        learned: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Ignore mastery and draw uniformly
        #[arg(long)]
        uniform: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Play a quiz on stdin/stdout
    Play {
        /// Path to a dictionary file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Number of tasks, or "all"
        #[arg(long)]
        count: Option<String>,

        /// Learned-keys file (JSON array)
        #[arg(long)]
        learned: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Directory to save the JSON result to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List subjects and their dictionaries
    Subjects {
        /// Directory holding the subject index.json
        #[arg(long, default_value = "./data/subjects")]
        root: PathBuf,
    },

    /// Create starter config and example dictionary
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spellquiz=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Sample {
            catalog,
            count,
            learned,
            seed,
            uniform,
            config,
        } => commands::sample::execute(catalog, count, learned, seed, uniform, config),
        Commands::Play {
            catalog,
            count,
            learned,
            seed,
            output,
            config,
        } => commands::play::execute(catalog, count, learned, seed, output, config),
        Commands::Subjects { root } => commands::subjects::execute(root),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
