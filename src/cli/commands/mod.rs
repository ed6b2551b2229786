pub mod catalog;
pub mod chapter;
pub mod exercise;
pub mod settings;
pub mod step;

pub use catalog::{TemplateCommands, TemplateSubcommands, ThemeCommands, ThemeSubcommands};
pub use chapter::{ChapterCommands, ChapterSubcommands};
pub use exercise::{ExerciseCommands, ExerciseSubcommands};
pub use settings::{SettingsCommands, SettingsSubcommands};
pub use step::{StepCommands, StepSubcommands};
