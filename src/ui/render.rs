//! Terminal rendering of the content tree

use colored::*;

use crate::admin::{DeleteOutcome, MutationOutcome};
use crate::catalog::{ChapterTheme, ExerciseTemplate};
use crate::clipboard::PasteAvailability;
use crate::content::{Chapter, Exercise, Level, Step};
use crate::store::{ContentStore, TreeSource};

pub fn print_source(source: TreeSource) {
    if source == TreeSource::LocalCache {
        println!("{}", "⚠ API unreachable, showing the local cache".yellow());
    }
}

pub fn print_levels(store: &ContentStore) {
    println!("{}", "Levels".bold());
    println!("{}", "-".repeat(30));
    for (level, count) in store.level_summary() {
        println!("{:<6} {:>4} chapters", level.to_string().cyan(), count);
    }
    println!("\nTotal chapters: {}", store.len());
}

fn chapter_line(chapter: &Chapter) -> String {
    format!(
        "{:<16} {} {}",
        chapter.id.cyan(),
        chapter.titre,
        format!("({} steps, {} exercises)", chapter.etapes.len(), chapter.exercise_count()).dimmed()
    )
}

pub fn print_chapters(store: &ContentStore, level: Option<Level>) {
    let levels: Vec<Level> = match level {
        Some(level) => vec![level],
        None => Level::ALL.to_vec(),
    };

    for level in levels {
        let chapters = store.chapters_in_level(level);
        if chapters.is_empty() && store.selection().level() != Some(level) {
            continue;
        }
        println!("{} {}", level.to_string().bold(), format!("({})", chapters.len()).dimmed());
        for chapter in chapters {
            println!("  {}", chapter_line(chapter));
        }
    }
}

pub fn print_chapter(chapter: &Chapter) {
    println!("{} {}", chapter.id.cyan().bold(), chapter.titre.bold());
    println!(
        "Level: {}   Stored level: {}",
        chapter.level(),
        chapter.niveau.as_deref().unwrap_or("-")
    );
    if let Some(description) = &chapter.description {
        println!("{}", description.dimmed());
    }
    println!();
    print_steps(&chapter.etapes);
}

pub fn print_steps(steps: &[Step]) {
    if steps.is_empty() {
        println!("No steps.");
        return;
    }
    for (index, step) in steps.iter().enumerate() {
        println!(
            "[{}] {} {} {}",
            index,
            step.titre,
            format!("{} · {} min", step.step_type, step.duree).dimmed(),
            format!("({} exercises, id {})", step.exercices.len(), step.id).dimmed()
        );
    }
}

pub fn print_exercises(exercises: &[(usize, &Exercise)]) {
    if exercises.is_empty() {
        println!("No exercises.");
        return;
    }
    for (index, exercise) in exercises {
        println!(
            "[{}] {:<18} {} {}",
            index,
            exercise.kind().to_string().cyan(),
            exercise.display_title(),
            format!("(id {})", exercise.id).dimmed()
        );
    }
}

pub fn print_templates(templates: &[(usize, &ExerciseTemplate)]) {
    for (index, template) in templates {
        println!(
            "[{}] {:<18} {} {}",
            index,
            template.type_tag.cyan(),
            template.name.bold(),
            template.description.dimmed()
        );
    }
}

pub fn print_themes(themes: &[ChapterTheme]) {
    for (index, theme) in themes.iter().enumerate() {
        let summary = theme.summary();
        println!(
            "[{}] {} {}",
            index,
            theme.name.bold(),
            format!("({} étapes, {} exercices)", summary.steps, summary.exercises).dimmed()
        );
        println!("    {}", theme.description);
    }
}

pub fn print_outcome(verb: &str, outcome: &MutationOutcome) {
    println!(
        "{} {} {} {} {}",
        "✓".green(),
        verb,
        outcome.entity,
        outcome.id.cyan(),
        format!("\"{}\"", outcome.titre).dimmed()
    );
    if !outcome.message.is_empty() {
        println!("  {}", outcome.message.dimmed());
    }
    if !outcome.reloaded {
        println!("  {}", "Saved, but the tree could not be reloaded".yellow());
    }
}

pub fn print_delete(outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted { removed, reloaded } => {
            println!("{} Deleted {} entities", "✓".green(), removed);
            if !reloaded {
                println!("  {}", "Deleted, but the tree could not be reloaded".yellow());
            }
        }
        DeleteOutcome::Cancelled => println!("Operation cancelled."),
    }
}

pub fn print_paste_availability(paste: PasteAvailability) {
    let flag = |on: bool| if on { "yes".green() } else { "no".dimmed() };
    println!(
        "Paste chapter: {}  step: {}  exercise: {}",
        flag(paste.chapter),
        flag(paste.step),
        flag(paste.exercise)
    );
}
