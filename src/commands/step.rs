use anyhow::Result;

use crate::admin::{AdminSession, StepChanges, StepDraft};
use crate::cli::commands::StepSubcommands;
use crate::ui::{PromptConfirmation, render};

pub async fn step_command(session: &mut AdminSession, command: StepSubcommands) -> Result<()> {
    match command {
        StepSubcommands::List { chapter } => {
            let chapter = session.store().require_chapter(&chapter)?;
            render::print_steps(&chapter.etapes);
        }
        StepSubcommands::Create {
            chapter,
            title,
            id,
            step_type,
            duration,
            description,
        } => {
            let outcome = session
                .create_step(
                    &chapter,
                    StepDraft {
                        id,
                        titre: title,
                        step_type,
                        duree: duration,
                        description,
                    },
                )
                .await?;
            render::print_outcome("Created", &outcome);
        }
        StepSubcommands::Edit {
            chapter,
            index,
            title,
            step_type,
            duration,
            description,
        } => {
            let changes = StepChanges {
                titre: title,
                step_type,
                duree: duration,
                description,
            };
            let outcome = session.edit_step(&chapter, index, changes).await?;
            render::print_outcome("Updated", &outcome);
        }
        StepSubcommands::Delete {
            chapter,
            index,
            force,
        } => {
            let outcome = session
                .delete_step(&chapter, index, &PromptConfirmation::new(force))
                .await?;
            render::print_delete(outcome);
        }
        StepSubcommands::Duplicate { chapter, index } => {
            let outcome = session.duplicate_step(&chapter, index).await?;
            render::print_outcome("Duplicated into", &outcome);
        }
    }
    Ok(())
}
