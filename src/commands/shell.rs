//! Interactive session: one `AdminSession` kept alive across commands, so the
//! selection and the clipboard survive from one line to the next.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::session::open_shared_session;
use super::{catalog, chapter, exercise, step, transfer};
use crate::admin::{AdminSession, ExerciseLocator};
use crate::cli::commands::{
    ChapterCommands, ExerciseCommands, StepCommands, TemplateCommands, ThemeCommands,
};
use crate::config::Config;
use crate::content::Level;
use crate::error::AdminError;
use crate::ui::render;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lms", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Show chapter counts per level
    Levels,
    Chapter(ChapterCommands),
    Step(StepCommands),
    Exercise(ExerciseCommands),
    Template(TemplateCommands),
    Theme(ThemeCommands),
    Export { path: Option<PathBuf> },
    Import { path: PathBuf },
    /// Move the selection cursor
    Select {
        #[command(subcommand)]
        target: SelectTarget,
    },
    /// Copy an entity (the current selection when no target is given)
    Copy {
        #[command(subcommand)]
        target: Option<CopyTarget>,
    },
    /// Paste the clipboard into the current selection
    Paste,
    /// Show the clipboard and the paste actions on offer
    Clipboard,
    /// Show the current selection
    Status,
    /// Reload the tree from the API
    Reload,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand)]
enum SelectTarget {
    Level { level: Level },
    Chapter { id: String },
    Step { index: usize },
    Exercise { index: usize },
    Clear,
}

#[derive(Subcommand)]
enum CopyTarget {
    Chapter { id: String },
    Step { chapter: String, index: usize },
    Exercise { chapter: String, step: usize, index: usize },
}

/// Split a line into words, honouring single and double quotes
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        anyhow::bail!("Unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn print_status(session: &AdminSession) {
    let selection = session.store().selection();
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!(
        "Level: {}  Chapter: {}  Step: {}  Exercise: {}",
        show(selection.level().map(|l| l.to_string())).cyan(),
        show(selection.chapter_id().map(str::to_string)).cyan(),
        show(selection.step_index().map(|i| i.to_string())).cyan(),
        show(selection.exercise_index().map(|i| i.to_string())).cyan()
    );
}

/// Returns false when the shell should stop
async fn run_line(session: &mut AdminSession, command: ShellCommand) -> Result<bool> {
    match command {
        ShellCommand::Levels => chapter::levels_command(session)?,
        ShellCommand::Chapter(args) => chapter::chapter_command(session, args.command).await?,
        ShellCommand::Step(args) => step::step_command(session, args.command).await?,
        ShellCommand::Exercise(args) => exercise::exercise_command(session, args.command).await?,
        ShellCommand::Template(args) => catalog::template_command(args.command)?,
        ShellCommand::Theme(args) => catalog::theme_command(session, args.command).await?,
        ShellCommand::Export { path } => transfer::export_command(session, path).await?,
        ShellCommand::Import { path } => transfer::import_command(session, path).await?,
        ShellCommand::Select { target } => {
            match target {
                SelectTarget::Level { level } => session.select_level(level),
                SelectTarget::Chapter { id } => session.select_chapter(&id)?,
                SelectTarget::Step { index } => session.select_step(index)?,
                SelectTarget::Exercise { index } => session.select_exercise(index)?,
                SelectTarget::Clear => session.clear_selection(),
            }
            print_status(session);
        }
        ShellCommand::Copy { target } => {
            let label = match target {
                None => session.copy_selection()?,
                Some(CopyTarget::Chapter { id }) => session.copy_chapter(&id)?,
                Some(CopyTarget::Step { chapter, index }) => session.copy_step(&chapter, index)?,
                Some(CopyTarget::Exercise {
                    chapter,
                    step,
                    index,
                }) => session.copy_exercise(&ExerciseLocator::new(chapter, step, index))?,
            };
            println!("{} Copied {}", "✓".green(), label.cyan());
        }
        ShellCommand::Paste => {
            let outcome = session.paste_into_selection().await?;
            render::print_outcome("Pasted", &outcome);
        }
        ShellCommand::Clipboard => {
            match session.clipboard().peek() {
                Some(entry) => println!("Clipboard: {} {}", entry.kind(), entry.label().cyan()),
                None => println!("Clipboard is empty."),
            }
            render::print_paste_availability(session.paste_availability());
        }
        ShellCommand::Status => print_status(session),
        ShellCommand::Reload => {
            session.reload().await?;
            println!("{} Reloaded {} chapters", "✓".green(), session.store().len());
        }
        ShellCommand::Exit => return Ok(false),
    }
    Ok(true)
}

fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<AdminError>() {
        Some(admin) if admin.is_advisory() => println!("{} {}", "!".yellow(), admin),
        Some(admin) => println!("{} {}", "✗".red(), admin.status_message()),
        None => println!("{} {:#}", "✗".red(), error),
    }
}

pub async fn shell_command(config: &Config, offline: bool) -> Result<()> {
    let session = open_shared_session(config, offline, |session| {
        debug!("Shell session reloaded ({} chapters)", session.store().len());
    })
    .await?;

    println!("lms-admin shell. Type 'help' for commands, 'exit' to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"lms> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                report_error(&e);
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                if let Err(print_error) = e.print() {
                    warn!("Could not print usage: {}", print_error);
                }
                continue;
            }
        };

        let mut guard = session.lock().await;
        match run_line(&mut guard, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => report_error(&e),
        }
    }

    if let Some(notifier) = session.lock().await.gateway().notifier() {
        notifier.shutdown().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"chapter create 101 --title "Les bases" -l N1"#).unwrap(),
            vec!["chapter", "create", "101", "--title", "Les bases", "-l", "N1"]
        );
        assert_eq!(split_words("  paste  ").unwrap(), vec!["paste"]);
        assert_eq!(split_words(r#"x ''"#).unwrap(), vec!["x", ""]);
        assert!(split_words(r#"chapter show "101"#).is_err());
    }

    #[test]
    fn test_shell_grammar() {
        let parsed = ShellLine::try_parse_from(["copy", "step", "101", "0"]).unwrap();
        assert!(matches!(
            parsed.command,
            ShellCommand::Copy {
                target: Some(CopyTarget::Step { index: 0, .. })
            }
        ));

        let parsed = ShellLine::try_parse_from(["select", "level", "n2"]).unwrap();
        assert!(matches!(
            parsed.command,
            ShellCommand::Select {
                target: SelectTarget::Level { level: Level::N2 }
            }
        ));

        assert!(ShellLine::try_parse_from(["quit"]).is_ok());
        assert!(ShellLine::try_parse_from(["fly"]).is_err());
    }
}
