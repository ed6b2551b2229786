use clap::{Args, Subcommand};

use crate::content::Level;

#[derive(Args)]
pub struct ChapterCommands {
    #[command(subcommand)]
    pub command: ChapterSubcommands,
}

#[derive(Subcommand)]
pub enum ChapterSubcommands {
    /// List chapters, optionally for one level
    List {
        /// Level to list (N1..N4)
        #[arg(short, long)]
        level: Option<Level>,
    },
    /// Show a chapter with its steps
    Show {
        /// Chapter id
        id: String,
    },
    /// Create a new chapter
    Create {
        /// Chapter id (e.g. 101)
        id: String,
        /// Chapter title
        #[arg(short, long)]
        title: String,
        /// Level (N1..N4)
        #[arg(short, long)]
        level: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit the title, level or description of a chapter
    Edit {
        /// Chapter id
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        level: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a chapter with all its steps and exercises
    Delete {
        /// Chapter id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Duplicate a chapter with fresh ids
    Duplicate {
        /// Chapter id
        id: String,
    },
}
