pub mod catalog;
pub mod chapter;
pub mod exercise;
pub mod session;
pub mod settings;
pub mod shell;
pub mod step;
pub mod transfer;
pub mod watch;

use anyhow::Result;

use crate::cli::commands::{SettingsSubcommands, ThemeSubcommands};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use session::open_session;

/// Run one parsed command line
pub async fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let offline = cli.offline;

    match cli.command {
        // Commands that need no content tree
        Commands::Template(args) => catalog::template_command(args.command),
        Commands::Theme(args) if matches!(args.command, ThemeSubcommands::List) => {
            catalog::theme_list_command()
        }
        Commands::Settings(args) => match args.command {
            SettingsSubcommands::Show => settings::show_command(config).await,
            SettingsSubcommands::Get { name } => settings::get_command(config, name).await,
            SettingsSubcommands::Set { name, value } => {
                settings::set_command(config, name, value).await
            }
            SettingsSubcommands::Reset { name } => settings::reset_command(config, name).await,
            SettingsSubcommands::ResetAll { force } => {
                settings::reset_all_command(config, force).await
            }
        },
        Commands::Watch => watch::watch_command(config, offline).await,
        Commands::Shell => shell::shell_command(config, offline).await,

        // One-shot commands on a freshly loaded session
        Commands::Levels => chapter::levels_command(&open_session(config, offline).await?),
        Commands::Chapter(args) => {
            let mut session = open_session(config, offline).await?;
            chapter::chapter_command(&mut session, args.command).await
        }
        Commands::Step(args) => {
            let mut session = open_session(config, offline).await?;
            step::step_command(&mut session, args.command).await
        }
        Commands::Exercise(args) => {
            let mut session = open_session(config, offline).await?;
            exercise::exercise_command(&mut session, args.command).await
        }
        Commands::Theme(args) => {
            let mut session = open_session(config, offline).await?;
            catalog::theme_command(&mut session, args.command).await
        }
        Commands::Export { path } => {
            let session = open_session(config, offline).await?;
            transfer::export_command(&session, path).await
        }
        Commands::Import { path } => {
            let mut session = open_session(config, offline).await?;
            transfer::import_command(&mut session, path).await
        }
    }
}
