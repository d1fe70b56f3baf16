use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cold", about = "An inductive program synthesiser for a small register-based bytecode")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search a `.solve` file's pattern combinations for a solution.
    Solve {
        solver_file: PathBuf,

        /// Search only this single combination index.
        #[arg(long)]
        combination: Option<u64>,

        /// Search this many combinations starting at `--combination` (or 0).
        #[arg(long)]
        combination_count: Option<u64>,

        #[arg(long)]
        threads: Option<usize>,

        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Log every candidate the search visits, not just solutions.
        #[arg(long)]
        output_all: bool,

        /// Force the non-interactive (newline-per-tick) progress format.
        #[arg(long)]
        non_interactive: bool,

        /// Suppress echoing solutions to stdout as they're found.
        #[arg(long)]
        hide_solutions: bool,

        /// Keep searching after the first solution instead of stopping.
        #[arg(long)]
        all: bool,
    },

    /// Interpret a `.cold` program against literal arguments.
    Run {
        program: PathBuf,
        args: Vec<String>,
    },

    /// Print every combination a `.solve` file would search, without running it.
    Combinations {
        solver_file: PathBuf,
    },
}
