use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::content::ExerciseKind;

#[derive(Args)]
pub struct ExerciseCommands {
    #[command(subcommand)]
    pub command: ExerciseSubcommands,
}

/// Position of an exercise: chapter id, step index, exercise index
#[derive(Args, Clone)]
pub struct ExerciseTarget {
    pub chapter: String,
    pub step: usize,
    pub index: usize,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommands {
    /// List the exercises of a step
    List {
        chapter: String,
        step: usize,
        /// Only show exercises of this type
        #[arg(long = "type")]
        kind: Option<ExerciseKind>,
    },
    /// Print one exercise as JSON
    Show {
        #[command(flatten)]
        target: ExerciseTarget,
    },
    /// Create an exercise from a template or a JSON file
    Create {
        chapter: String,
        step: usize,
        /// Template index (see `template list`)
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        template: Option<usize>,
        /// JSON file holding the exercise
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Override the question of the template
        #[arg(short, long)]
        question: Option<String>,
        /// Override the title of the template
        #[arg(long)]
        title: Option<String>,
    },
    /// Replace an exercise with the content of a JSON file, keeping its id
    Edit {
        #[command(flatten)]
        target: ExerciseTarget,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete an exercise
    Delete {
        #[command(flatten)]
        target: ExerciseTarget,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Duplicate an exercise inside its step
    Duplicate {
        #[command(flatten)]
        target: ExerciseTarget,
    },
    /// Move an exercise to another position in the same step
    Move {
        #[command(flatten)]
        target: ExerciseTarget,
        /// New position
        to: usize,
    },
}
