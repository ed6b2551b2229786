use anyhow::Result;
use colored::*;
use log::info;

use super::session::open_shared_session;
use crate::config::Config;
use crate::ui::render;

/// Print a summary every time another session saves, until Ctrl+C
pub async fn watch_command(config: &Config, offline: bool) -> Result<()> {
    let session = open_shared_session(config, offline, |session| {
        let summary: Vec<String> = session
            .store()
            .level_summary()
            .into_iter()
            .map(|(level, count)| format!("{} {}", level, count))
            .collect();
        println!(
            "{} {} {} chapters ({})",
            chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
            "↻".cyan(),
            session.store().len(),
            summary.join(", ")
        );
    })
    .await?;

    {
        let guard = session.lock().await;
        render::print_levels(guard.store());
        if let Some(notifier) = guard.gateway().notifier() {
            println!(
                "\nWatching for changes via {:?} (Ctrl+C to stop)...",
                notifier.transport_kind()
            );
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Stopping watch");

    let guard = session.lock().await;
    if let Some(notifier) = guard.gateway().notifier() {
        notifier.shutdown().await;
    }
    Ok(())
}
