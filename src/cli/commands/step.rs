use clap::{Args, Subcommand};

use crate::content::StepType;

#[derive(Args)]
pub struct StepCommands {
    #[command(subcommand)]
    pub command: StepSubcommands,
}

#[derive(Subcommand)]
pub enum StepSubcommands {
    /// List the steps of a chapter
    List {
        /// Chapter id
        chapter: String,
    },
    /// Append a step to a chapter
    Create {
        /// Chapter id
        chapter: String,
        /// Step title
        #[arg(short, long)]
        title: String,
        /// Explicit step id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// diagnostic, apprentissage, entrainement, evaluation or standard
        #[arg(long = "type", default_value = "standard")]
        step_type: StepType,
        /// Duration in minutes
        #[arg(long, default_value_t = 30)]
        duration: u32,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit a step in place
    Edit {
        /// Chapter id
        chapter: String,
        /// Step position within the chapter
        index: usize,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long = "type")]
        step_type: Option<StepType>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a step and its exercises
    Delete {
        chapter: String,
        index: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Duplicate a step inside its chapter
    Duplicate { chapter: String, index: usize },
}
