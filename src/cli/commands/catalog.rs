use clap::{Args, Subcommand};

use crate::content::{ExerciseKind, Level};

#[derive(Args)]
pub struct TemplateCommands {
    #[command(subcommand)]
    pub command: TemplateSubcommands,
}

#[derive(Subcommand)]
pub enum TemplateSubcommands {
    /// List exercise templates
    List {
        /// Only show templates of this type
        #[arg(long = "type")]
        kind: Option<ExerciseKind>,
    },
    /// Print a template skeleton as JSON
    Show { index: usize },
}

#[derive(Args)]
pub struct ThemeCommands {
    #[command(subcommand)]
    pub command: ThemeSubcommands,
}

#[derive(Subcommand)]
pub enum ThemeSubcommands {
    /// List chapter themes
    List,
    /// Create a new chapter from a theme
    Apply {
        index: usize,
        /// Level of the new chapter
        #[arg(short, long)]
        level: Option<Level>,
    },
}
