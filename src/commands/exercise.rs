use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::admin::{AdminSession, ExerciseLocator};
use crate::cli::commands::ExerciseSubcommands;
use crate::cli::commands::exercise::ExerciseTarget;
use crate::content::Exercise;
use crate::ui::{PromptConfirmation, render};

fn locator(target: &ExerciseTarget) -> ExerciseLocator {
    ExerciseLocator::new(target.chapter.clone(), target.step, target.index)
}

/// Read one exercise object from a JSON file
async fn read_exercise(path: &Path) -> Result<Exercise> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read exercise file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid exercise", path.display()))
}

pub async fn exercise_command(session: &mut AdminSession, command: ExerciseSubcommands) -> Result<()> {
    match command {
        ExerciseSubcommands::List {
            chapter,
            step,
            kind,
        } => {
            let exercises = session.store().exercises_of(&chapter, step, kind)?;
            render::print_exercises(&exercises);
        }
        ExerciseSubcommands::Show { target } => {
            let exercise = session
                .store()
                .require_exercise(&target.chapter, target.step, target.index)?;
            println!("{}", serde_json::to_string_pretty(exercise)?);
        }
        ExerciseSubcommands::Create {
            chapter,
            step,
            template,
            file,
            question,
            title,
        } => {
            let mut exercise = match (template, file) {
                (Some(index), _) => session.instantiate_template(index)?,
                (None, Some(path)) => read_exercise(&path).await?,
                (None, None) => anyhow::bail!("Either --template or --file is required"),
            };
            if question.is_some() {
                exercise.question = question;
            }
            if title.is_some() {
                exercise.titre = title;
            }

            let outcome = session.create_exercise(&chapter, step, exercise).await?;
            render::print_outcome("Created", &outcome);
            if outcome.id.is_empty() {
                println!("  {}", "The new exercise was not found after reloading".yellow());
            }
        }
        ExerciseSubcommands::Edit { target, file } => {
            let exercise = read_exercise(&file).await?;
            let outcome = session.edit_exercise(&locator(&target), exercise).await?;
            render::print_outcome("Updated", &outcome);
        }
        ExerciseSubcommands::Delete { target, force } => {
            let outcome = session
                .delete_exercise(&locator(&target), &PromptConfirmation::new(force))
                .await?;
            render::print_delete(outcome);
        }
        ExerciseSubcommands::Duplicate { target } => {
            let outcome = session.duplicate_exercise(&locator(&target)).await?;
            render::print_outcome("Duplicated into", &outcome);
        }
        ExerciseSubcommands::Move { target, to } => {
            let outcome = session
                .move_exercise(&target.chapter, target.step, target.index, to)
                .await?;
            render::print_outcome("Moved", &outcome);
        }
    }
    Ok(())
}
