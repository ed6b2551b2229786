//! Building an `AdminSession` for a command: API client, cache, notifier, first load

use anyhow::{Context, Result};
use log::info;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::admin::{AdminSession, SessionReloader};
use crate::api::ContentApiClient;
use crate::config::{Config, Settings};
use crate::persistence::{LocalCache, PersistenceGateway};
use crate::store::TreeSource;
use crate::sync::{BroadcastHub, ChangeNotifier, TransportMode};
use crate::ui::render;

pub type SharedSession = Arc<Mutex<AdminSession>>;

/// Separate processes only see each other through the shared cache database,
/// so `auto` means the cache watcher here.
fn cli_transport(mode: TransportMode) -> TransportMode {
    match mode {
        TransportMode::Auto => TransportMode::Storage,
        other => other,
    }
}

/// `cache` must be the handle the session's gateway writes through, so the
/// cache watcher can skip the session's own saves
fn notifier(settings: &Settings, cache: LocalCache) -> ChangeNotifier {
    ChangeNotifier::select(
        cli_transport(settings.transport),
        &BroadcastHub::global(),
        &settings.channel,
        cache,
        settings.poll_interval,
        settings.source.clone(),
    )
}

fn gateway(settings: &Settings, cache: LocalCache) -> Result<PersistenceGateway> {
    let client = ContentApiClient::from_settings(settings)
        .context("Failed to create API client")?;
    info!("Using chapter API at {}", client.base_url());
    let notifier = notifier(settings, cache.clone());
    Ok(PersistenceGateway::new(Arc::new(client), cache).with_notifier(Arc::new(notifier)))
}

async fn initial_load(session: &mut AdminSession, settings: &Settings, offline: bool) -> Result<()> {
    let source = if offline {
        session.load_offline().await?;
        TreeSource::LocalCache
    } else {
        session.load_with_fallback(settings.offline_fallback).await?
    };
    render::print_source(source);
    Ok(())
}

/// Session for a single command
pub async fn open_session(config: &Config, offline: bool) -> Result<AdminSession> {
    let settings = config.settings().await?;
    let mut session = AdminSession::new(gateway(&settings, config.local_cache())?);
    initial_load(&mut session, &settings, offline).await?;
    Ok(session)
}

/// Long-lived session that reloads itself when another session saves
pub async fn open_shared_session(
    config: &Config,
    offline: bool,
    on_reload: impl Fn(&AdminSession) + Send + Sync + 'static,
) -> Result<SharedSession> {
    let settings = config.settings().await?;
    let client = ContentApiClient::from_settings(&settings)
        .context("Failed to create API client")?;
    let cache = config.local_cache();
    let base = notifier(&settings, cache.clone());

    let session = Arc::new_cyclic(|weak: &Weak<Mutex<AdminSession>>| {
        let reloader = SessionReloader::new(weak.clone()).on_reload(on_reload);
        let notifier = base.with_reload_handler(Arc::new(reloader));
        let gateway = PersistenceGateway::new(Arc::new(client), cache).with_notifier(Arc::new(notifier));
        Mutex::new(AdminSession::new(gateway))
    });

    {
        let mut guard = session.lock().await;
        initial_load(&mut guard, &settings, offline).await?;
        guard.start_listening().await?;
    }
    Ok(session)
}
