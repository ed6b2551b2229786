//! Fallback transport: watch the local cache keys for writes
//!
//! There is nothing to publish; writing the cache is the signal. Readers poll
//! the revision counters of the two chapter keys, which also picks up writes
//! made by other processes sharing the configuration database. Revisions
//! written through the watcher's own cache handle are skipped: a session is
//! never told about its own saves.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

use super::message::ChangeEvent;
use super::transport::{ChangeSignal, ChangeTransport, SIGNAL_BUFFER, TransportKind};
use crate::error::AdminResult;
use crate::persistence::{CACHE_KEYS, LocalCache};

pub struct StorageWatchTransport {
    cache: LocalCache,
    interval: Duration,
}

impl StorageWatchTransport {
    pub fn new(cache: LocalCache, interval: Duration) -> Self {
        Self {
            cache,
            interval: interval.max(Duration::from_millis(10)),
        }
    }
}

#[async_trait]
impl ChangeTransport for StorageWatchTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::StorageWatch
    }

    async fn publish(&self, _event: &ChangeEvent) -> AdminResult<()> {
        debug!("Storage-watch transport: the cache write itself notifies other sessions");
        Ok(())
    }

    async fn subscribe(&self) -> AdminResult<mpsc::Receiver<ChangeSignal>> {
        // Baseline before returning so writes right after subscribing are seen
        let mut seen: HashMap<&'static str, i64> = HashMap::new();
        for key in CACHE_KEYS {
            seen.insert(key, self.cache.revision(key).await?);
        }

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let cache = self.cache.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {
                        for key in CACHE_KEYS {
                            let observed = match cache.observe(key).await {
                                Ok(observed) => observed,
                                Err(e) => {
                                    warn!("Could not poll cache key {}: {}", key, e);
                                    continue;
                                }
                            };
                            let revision = observed.revision;
                            if seen.insert(key, revision) != Some(revision) {
                                if observed.own {
                                    debug!("Cache key {} rewritten by this session (revision {})", key, revision);
                                    continue;
                                }
                                debug!("Cache key {} changed (revision {})", key, revision);
                                if tx.send(ChangeSignal::StorageKeyChanged(key.to_string())).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                }
            }
            debug!("Storage watcher stopped");
        });

        Ok(rx)
    }
}
