use super::commands::{
    ChapterCommands, ExerciseCommands, SettingsCommands, StepCommands, TemplateCommands,
    ThemeCommands,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lms-admin")]
#[command(about = "Author and administer levels, chapters, steps and exercises")]
pub struct Cli {
    /// Work on the local cache only, without contacting the API
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show chapter counts per level
    Levels,
    /// Chapter management
    Chapter(ChapterCommands),
    /// Step management
    Step(StepCommands),
    /// Exercise management
    Exercise(ExerciseCommands),
    /// Browse exercise templates
    Template(TemplateCommands),
    /// Browse and apply chapter themes
    Theme(ThemeCommands),
    /// Export the full chapter collection to a JSON file
    Export {
        /// Output file (defaults to chapitres_export_<date>.json)
        path: Option<PathBuf>,
    },
    /// Import the chapters of a JSON file whose ids are not present yet
    Import {
        /// File containing a JSON array of chapters
        path: PathBuf,
    },
    /// Follow changes saved by other sessions
    Watch,
    /// Interactive session where selection and clipboard persist
    Shell,
    /// Application settings management
    Settings(SettingsCommands),
}
