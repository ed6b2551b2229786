use anyhow::Result;

use crate::admin::AdminSession;
use crate::catalog;
use crate::cli::commands::{TemplateSubcommands, ThemeSubcommands};
use crate::ui::render;

/// Templates need no session: the catalog is embedded
pub fn template_command(command: TemplateSubcommands) -> Result<()> {
    match command {
        TemplateSubcommands::List { kind } => {
            let templates = match kind {
                Some(kind) => catalog::templates_of_kind(kind)?,
                None => catalog::templates()?.iter().enumerate().collect(),
            };
            if templates.is_empty() {
                println!("No templates.");
            }
            render::print_templates(&templates);
        }
        TemplateSubcommands::Show { index } => {
            let exercise = catalog::instantiate_template(index)?;
            println!("{}", serde_json::to_string_pretty(&exercise)?);
        }
    }
    Ok(())
}

pub fn theme_list_command() -> Result<()> {
    render::print_themes(catalog::themes()?);
    Ok(())
}

pub async fn theme_command(session: &mut AdminSession, command: ThemeSubcommands) -> Result<()> {
    match command {
        ThemeSubcommands::List => theme_list_command()?,
        ThemeSubcommands::Apply { index, level } => {
            if let Some(level) = level {
                session.select_level(level);
            }
            let outcome = session.instantiate_theme(index).await?;
            render::print_outcome("Created", &outcome);
        }
    }
    Ok(())
}
