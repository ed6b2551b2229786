use anyhow::Result;
use clap::Parser;
use colored::*;
use log::info;

use lms_admin::cli::Cli;
use lms_admin::commands;
use lms_admin::config::Config;
use lms_admin::error::AdminError;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("lms-admin.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    // API URL and timeout overrides may live in a .env file
    dotenvy::dotenv().ok();

    let config = Config::load().await?;

    let cli = Cli::parse();
    info!("Starting lms-admin");

    if let Err(e) = commands::dispatch(cli, &config).await {
        match e.downcast_ref::<AdminError>() {
            Some(admin) if admin.is_advisory() => eprintln!("{} {}", "!".yellow(), admin),
            Some(admin) => eprintln!("{} {}", "Error:".red(), admin.status_message()),
            None => eprintln!("{} {:#}", "Error:".red(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}
