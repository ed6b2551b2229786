use crate::config::Config;
use anyhow::Result;
use log::info;

/// Get the value of a specific setting
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `name` - Setting name
///
/// # Returns
/// * `Ok(())` - Setting value displayed successfully
/// * `Err(anyhow::Error)` - Configuration error or unknown setting
pub async fn get_command(config: &Config, name: String) -> Result<()> {
    info!("Getting setting: {}", name);
    println!("{}", config.get_setting(&name).await?);
    Ok(())
}
