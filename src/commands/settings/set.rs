use anyhow::Result;
use log::info;
use crate::config::Config;
use crate::config::settings::{API_MAX_ATTEMPTS, SYNC_POLL_INTERVAL_MS};

/// Set the value of a specific setting
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `name` - Setting name
/// * `value` - Setting value
///
/// # Returns
/// * `Ok(())` - Setting updated successfully
/// * `Err(anyhow::Error)` - Configuration error or invalid setting/value
pub async fn set_command(config: &Config, name: String, value: String) -> Result<()> {
    info!("Setting {} to {}", name, value);

    config.set_setting(&name, &value).await?;

    match name.as_str() {
        API_MAX_ATTEMPTS if value.trim() == "0" => {
            println!("Note: at least one attempt is always made.");
        }
        SYNC_POLL_INTERVAL_MS if value.trim().parse::<u64>().is_ok_and(|ms| ms < 100) => {
            println!("Warning: polling the cache more often than every 100ms keeps the database busy.");
        }
        _ => {}
    }

    println!("Set {} to {}", name, value);
    Ok(())
}
