use anyhow::Result;
use log::info;

use crate::admin::{AdminSession, ChapterChanges, ChapterDraft};
use crate::cli::commands::ChapterSubcommands;
use crate::ui::{PromptConfirmation, render};

pub fn levels_command(session: &AdminSession) -> Result<()> {
    render::print_levels(session.store());
    Ok(())
}

/// Handle `chapter` subcommands against an already loaded session
pub async fn chapter_command(session: &mut AdminSession, command: ChapterSubcommands) -> Result<()> {
    match command {
        ChapterSubcommands::List { level } => {
            if session.store().is_empty() {
                println!("No chapters.");
                return Ok(());
            }
            render::print_chapters(session.store(), level);
        }
        ChapterSubcommands::Show { id } => {
            render::print_chapter(session.store().require_chapter(&id)?);
        }
        ChapterSubcommands::Create {
            id,
            title,
            level,
            description,
        } => {
            info!("Creating chapter {}", id);
            let outcome = session
                .create_chapter(ChapterDraft {
                    id,
                    titre: title,
                    niveau: Some(level),
                    description,
                })
                .await?;
            render::print_outcome("Created", &outcome);
        }
        ChapterSubcommands::Edit {
            id,
            title,
            level,
            description,
        } => {
            if title.is_none() && level.is_none() && description.is_none() {
                anyhow::bail!("Nothing to change: pass --title, --level or --description");
            }
            let outcome = session
                .edit_chapter(
                    &id,
                    ChapterChanges {
                        titre: title,
                        niveau: level,
                        description,
                    },
                )
                .await?;
            render::print_outcome("Updated", &outcome);
        }
        ChapterSubcommands::Delete { id, force } => {
            let outcome = session
                .delete_chapter(&id, &PromptConfirmation::new(force))
                .await?;
            render::print_delete(outcome);
        }
        ChapterSubcommands::Duplicate { id } => {
            let outcome = session.duplicate_chapter(&id).await?;
            render::print_outcome("Duplicated into", &outcome);
        }
    }
    Ok(())
}

