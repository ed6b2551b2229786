use anyhow::Result;
use log::info;
use crate::config::Config;
use crate::config::settings::find_spec;
use crate::ui::prompts::confirm;

/// Reset a setting to its default value
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `name` - Setting name
///
/// # Returns
/// * `Ok(())` - Setting reset successfully
/// * `Err(anyhow::Error)` - Configuration error or unknown setting
pub async fn reset_command(config: &Config, name: String) -> Result<()> {
    info!("Resetting setting: {}", name);

    let Some(spec) = find_spec(&name) else {
        anyhow::bail!("Unknown setting: {}", name);
    };

    if config.reset_setting(&name).await? {
        println!("Reset {} to {}", name, spec.default);
    } else {
        println!("{} already uses its default ({})", name, spec.default);
    }

    Ok(())
}

/// Reset all settings to default values
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `force` - Skip confirmation prompt
///
/// # Returns
/// * `Ok(())` - Settings reset successfully
/// * `Err(anyhow::Error)` - Configuration error or user cancelled
pub async fn reset_all_command(config: &Config, force: bool) -> Result<()> {
    info!("Resetting all settings to defaults");

    if !force && !confirm("Reset all settings to their default values?", false)? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let cleared = config.reset_all_settings().await?;
    println!("Cleared {} stored settings; defaults apply again.", cleared);

    Ok(())
}
