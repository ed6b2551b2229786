use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::admin::AdminSession;
use crate::persistence::default_export_name;

pub async fn export_command(session: &AdminSession, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(default_export_name(chrono::Local::now().date_naive())));
    let count = session.export_to_file(&path).await?;
    println!(
        "{} Exported {} chapters to {}",
        "✓".green(),
        count,
        path.display().to_string().cyan()
    );
    Ok(())
}

pub async fn import_command(session: &mut AdminSession, path: PathBuf) -> Result<()> {
    let report = session.import_from_file(&path).await?;

    if report.imported.is_empty() {
        println!("No new chapters in {}", path.display());
    } else {
        println!(
            "{} Imported {} chapters: {}",
            "✓".green(),
            report.imported_count(),
            report.imported.join(", ").cyan()
        );
    }
    if !report.skipped.is_empty() {
        println!(
            "  {}",
            format!("Skipped existing ids: {}", report.skipped.join(", ")).dimmed()
        );
    }
    Ok(())
}
