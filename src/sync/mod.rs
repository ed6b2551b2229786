//! Cross-session change notification
//!
//! The notifier is written against [`ChangeTransport`] only. Two transports
//! exist: a named broadcast channel (preferred) and a watcher over the local
//! cache keys (used when broadcasting is unavailable or explicitly chosen).
//! The transport is picked once, when the notifier is built.

pub mod broadcast;
pub mod message;
pub mod storage_watch;
pub mod transport;

pub use broadcast::{BroadcastHub, BroadcastTransport};
pub use message::ChangeEvent;
pub use storage_watch::StorageWatchTransport;
pub use transport::{ChangeSignal, ChangeTransport, TransportKind};

use async_trait::async_trait;
use log::{debug, info, warn};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::AdminResult;
use crate::persistence::{CACHE_KEYS, LocalCache};

/// Something able to refresh a session's tree from the remote document
#[async_trait]
pub trait ReloadHandler: Send + Sync {
    async fn reload(&self) -> AdminResult<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportMode {
    #[default]
    Auto,
    Broadcast,
    Storage,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Auto => f.write_str("auto"),
            TransportMode::Broadcast => f.write_str("broadcast"),
            TransportMode::Storage => f.write_str("storage"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(TransportMode::Auto),
            "broadcast" => Ok(TransportMode::Broadcast),
            "storage" => Ok(TransportMode::Storage),
            other => Err(format!(
                "unknown transport '{}', expected auto, broadcast or storage",
                other
            )),
        }
    }
}

/// What happened to one received signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Reloaded,
    ReloadFailed,
    /// Relevant, but this session registered no reload handler
    NoHandler,
    /// A cache key nobody cares about
    Ignored,
}

pub struct ChangeNotifier {
    transport: Arc<dyn ChangeTransport>,
    source: String,
    reload: Option<Arc<dyn ReloadHandler>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeNotifier {
    pub fn new(transport: Arc<dyn ChangeTransport>, source: impl Into<String>) -> Self {
        Self {
            transport,
            source: source.into(),
            reload: None,
            listener: Mutex::new(None),
        }
    }

    /// Pick the transport for this session.
    ///
    /// `Auto` and `Broadcast` use the named channel when the hub is enabled;
    /// otherwise (and for `Storage`) the cache watcher is used.
    pub fn select(
        mode: TransportMode,
        hub: &BroadcastHub,
        channel: &str,
        cache: LocalCache,
        poll_interval: Duration,
        source: impl Into<String>,
    ) -> Self {
        let transport: Arc<dyn ChangeTransport> = match mode {
            TransportMode::Storage => Arc::new(StorageWatchTransport::new(cache, poll_interval)),
            TransportMode::Auto | TransportMode::Broadcast => {
                match BroadcastTransport::open(hub, channel) {
                    Some(broadcast) => Arc::new(broadcast),
                    None => {
                        if mode == TransportMode::Broadcast {
                            warn!("Broadcast channel '{}' unavailable, watching the cache instead", channel);
                        }
                        Arc::new(StorageWatchTransport::new(cache, poll_interval))
                    }
                }
            }
        };
        info!("Change notifications via {:?}", transport.kind());
        Self::new(transport, source)
    }

    pub fn with_reload_handler(mut self, handler: Arc<dyn ReloadHandler>) -> Self {
        self.reload = Some(handler);
        self
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Start listening. Returns `false` when already listening.
    pub async fn init(&self) -> AdminResult<bool> {
        let mut listener = self.listener.lock().await;
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Change notifier already initialized");
            return Ok(false);
        }

        let mut signals = self.transport.subscribe().await?;
        let reload = self.reload.clone();
        *listener = Some(tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                Self::dispatch(reload.as_ref(), signal).await;
            }
        }));

        debug!("Change notifier listening via {:?}", self.transport.kind());
        Ok(true)
    }

    pub async fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
            debug!("Change notifier stopped");
        }
    }

    /// Announce a saved tree. Failures are logged; the save already happened.
    pub async fn notify_chapters_updated(&self, count: usize) {
        let event = ChangeEvent::chapters_updated(count, self.source.clone());
        if let Err(e) = self.transport.publish(&event).await {
            warn!("Could not announce chapter update: {}", e);
        }
    }

    /// Handle one signal as the listener would
    pub async fn handle_signal(&self, signal: ChangeSignal) -> SignalOutcome {
        Self::dispatch(self.reload.as_ref(), signal).await
    }

    async fn dispatch(reload: Option<&Arc<dyn ReloadHandler>>, signal: ChangeSignal) -> SignalOutcome {
        match &signal {
            ChangeSignal::Event(ChangeEvent::ChaptersUpdated {
                chapitres_count,
                source,
                ..
            }) => debug!("{} reports {} chapters", source, chapitres_count),
            ChangeSignal::StorageKeyChanged(key) if CACHE_KEYS.contains(&key.as_str()) => {
                debug!("Cache key {} changed", key)
            }
            ChangeSignal::StorageKeyChanged(_) => return SignalOutcome::Ignored,
        }

        let Some(handler) = reload else {
            debug!("No reload handler in this session, ignoring change");
            return SignalOutcome::NoHandler;
        };

        match handler.reload().await {
            Ok(()) => SignalOutcome::Reloaded,
            Err(e) => {
                warn!("Reload after change notification failed: {}", e);
                SignalOutcome::ReloadFailed
            }
        }
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        if let Ok(mut listener) = self.listener.try_lock() {
            if let Some(handle) = listener.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AdminError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, timeout};

    #[derive(Default)]
    struct CountingReload {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReloadHandler for CountingReload {
        async fn reload(&self) -> AdminResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AdminError::Load {
                    reason: "offline".into(),
                    network: None,
                });
            }
            Ok(())
        }
    }

    async fn cache() -> LocalCache {
        Config::new_test().await.unwrap().local_cache()
    }

    #[tokio::test]
    async fn test_event_without_handler_is_a_no_op() {
        let hub = BroadcastHub::new();
        let notifier = ChangeNotifier::select(
            TransportMode::Auto,
            &hub,
            "lms_admin_updates",
            cache().await,
            Duration::from_millis(50),
            "admin.html",
        );

        let outcome = notifier
            .handle_signal(ChangeSignal::Event(ChangeEvent::chapters_updated(4, "admin.html")))
            .await;
        assert_eq!(outcome, SignalOutcome::NoHandler);
    }

    #[tokio::test]
    async fn test_unrelated_storage_keys_are_ignored() {
        let handler = Arc::new(CountingReload::default());
        let notifier = ChangeNotifier::new(
            Arc::new(StorageWatchTransport::new(cache().await, Duration::from_millis(50))),
            "lms-admin",
        )
        .with_reload_handler(handler.clone());

        let outcome = notifier
            .handle_signal(ChangeSignal::StorageKeyChanged("THEME".into()))
            .await;
        assert_eq!(outcome, SignalOutcome::Ignored);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

        let outcome = notifier
            .handle_signal(ChangeSignal::StorageKeyChanged("CHAPITRES_AUTEUR".into()))
            .await;
        assert_eq!(outcome, SignalOutcome::Reloaded);
    }

    #[tokio::test]
    async fn test_failed_reload_is_contained() {
        let handler = Arc::new(CountingReload {
            fail: true,
            ..Default::default()
        });
        let notifier = ChangeNotifier::new(
            Arc::new(StorageWatchTransport::new(cache().await, Duration::from_millis(50))),
            "lms-admin",
        )
        .with_reload_handler(handler);

        let outcome = notifier
            .handle_signal(ChangeSignal::StorageKeyChanged("CHAPITRES".into()))
            .await;
        assert_eq!(outcome, SignalOutcome::ReloadFailed);
    }

    #[tokio::test]
    async fn test_init_twice_subscribes_once() {
        let hub = BroadcastHub::new();
        let handler = Arc::new(CountingReload::default());
        let viewer = ChangeNotifier::select(
            TransportMode::Broadcast,
            &hub,
            "init-twice",
            cache().await,
            Duration::from_millis(50),
            "viewer",
        )
        .with_reload_handler(handler.clone());
        let admin = ChangeNotifier::select(
            TransportMode::Broadcast,
            &hub,
            "init-twice",
            cache().await,
            Duration::from_millis(50),
            "admin",
        );

        assert!(viewer.init().await.unwrap());
        assert!(!viewer.init().await.unwrap());

        admin.notify_chapters_updated(2).await;
        timeout(Duration::from_secs(1), async {
            while handler.calls.load(Ordering::SeqCst) == 0 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);

        viewer.shutdown().await;
        assert!(viewer.init().await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_hub_falls_back_to_storage() {
        let hub = BroadcastHub::new();
        hub.set_enabled(false);
        let notifier = ChangeNotifier::select(
            TransportMode::Auto,
            &hub,
            "lms_admin_updates",
            cache().await,
            Duration::from_millis(50),
            "lms-admin",
        );
        assert_eq!(notifier.transport_kind(), TransportKind::StorageWatch);
    }
}
