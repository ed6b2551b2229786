use anyhow::Result;
use colored::*;

use crate::config::Config;
use crate::config::settings::{API_BASE_URL, KNOWN_SETTINGS};

/// Show every known setting with its effective value
pub async fn show_command(config: &Config) -> Result<()> {
    println!("Settings ({}):", config.path().display());
    println!("{}", "-".repeat(60));

    for spec in KNOWN_SETTINGS {
        let value = config.get_setting(spec.key).await?;
        let marker = if value == spec.default {
            "".normal()
        } else {
            " (changed)".yellow()
        };
        println!("{:<24} {}{}", spec.key.cyan(), value, marker);
        println!("{:<24} {}", "", spec.description.dimmed());
    }

    let stored_url = config.get_setting(API_BASE_URL).await?;
    let effective = config.settings().await?;
    if effective.api_base_url != stored_url.trim_end_matches('/') {
        println!("\nAPI URL overridden by environment: {}", effective.api_base_url.cyan());
    }
    Ok(())
}
