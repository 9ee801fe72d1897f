use std::path::PathBuf;

use clap::{Parser, Subcommand};

use type_cli::commands::simulate_ops::SimulationOptions;
use type_cli::commands::{config_ops, remote_ops, romaji_ops, simulate_ops};
use type_engine::item::Difficulty;

#[derive(Parser)]
#[command(name = "typetool", about = "Kana typing game diagnostics")]
struct Cli {
    /// Write JSON trace output to this directory (requires the `trace` feature)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the accepted spellings for a kana reading
    Romaji {
        /// Kana reading (hiragana or katakana)
        reading: String,
    },
    /// Feed keystrokes to the matcher and show how each is judged
    Trace {
        /// Kana reading
        reading: String,
        /// Keys to type, in order
        keys: String,
    },
    /// Play a scripted word game on a manual clock and print the result as JSON
    Simulate {
        /// JSON file with an array of words
        #[arg(long)]
        words: String,
        /// Difficulty level
        #[arg(long, default_value = "normal")]
        difficulty: Difficulty,
        /// Keystrokes per minute
        #[arg(long, default_value = "300")]
        cpm: u64,
        /// Type a wrong key before every n-th keystroke (0 = never)
        #[arg(long, default_value = "0")]
        miss_every: u32,
        /// Random seed for the word order
        #[arg(long, default_value = "0")]
        seed: u64,
    },
    /// List words from the backend
    Words {
        /// Backend base URL
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List quiz members from the backend
    Members {
        /// Backend base URL
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
    /// Show a leaderboard (the quiz board when no difficulty is given)
    Ranking {
        /// Backend base URL
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
        /// Word-mode difficulty board
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Number of rows
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Export default romaji mappings as TOML
    RomajiExport,
    /// Validate a custom romaji TOML file
    RomajiValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let _trace = cli
        .trace_dir
        .as_deref()
        .map(type_engine::trace_init::init_tracing);

    match cli.command {
        Command::Romaji { reading } => romaji_ops::patterns_cmd(&reading),
        Command::Trace { reading, keys } => romaji_ops::trace_cmd(&reading, &keys),
        Command::Simulate {
            words,
            difficulty,
            cpm,
            miss_every,
            seed,
        } => simulate_ops::simulate_cmd(
            &words,
            SimulationOptions {
                difficulty,
                cpm,
                miss_every,
                seed,
            },
        ),
        Command::Words {
            server,
            category,
            json,
        } => remote_ops::words_cmd(&server, category.as_deref(), json),
        Command::Members { server } => remote_ops::members_cmd(&server),
        Command::Ranking {
            server,
            difficulty,
            limit,
        } => remote_ops::ranking_cmd(&server, difficulty, limit),
        Command::RomajiExport => config_ops::romaji_export(),
        Command::RomajiValidate { file } => config_ops::romaji_validate(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
