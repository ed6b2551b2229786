//! Named broadcast channels shared by every session in the process

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::message::ChangeEvent;
use super::transport::{ChangeSignal, ChangeTransport, SIGNAL_BUFFER, TransportKind};
use crate::error::AdminResult;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct Envelope {
    sender: Uuid,
    payload: String,
}

static GLOBAL_HUB: Lazy<Arc<BroadcastHub>> = Lazy::new(BroadcastHub::new);

/// Registry of named channels; a disabled hub makes every channel unavailable
#[derive(Debug)]
pub struct BroadcastHub {
    channels: Mutex<HashMap<String, broadcast::Sender<Envelope>>>,
    enabled: AtomicBool,
}

impl BroadcastHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(HashMap::new()),
            enabled: AtomicBool::new(true),
        })
    }

    pub fn global() -> Arc<Self> {
        GLOBAL_HUB.clone()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn channel(&self, name: &str) -> broadcast::Sender<Envelope> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Post raw text from outside any transport (every subscriber receives it)
    pub fn post_raw(&self, channel: &str, payload: impl Into<String>) -> usize {
        self.channel(channel)
            .send(Envelope {
                sender: Uuid::nil(),
                payload: payload.into(),
            })
            .unwrap_or(0)
    }
}

pub struct BroadcastTransport {
    channel: String,
    instance: Uuid,
    sender: broadcast::Sender<Envelope>,
}

impl BroadcastTransport {
    /// `None` when the hub is disabled
    pub fn open(hub: &BroadcastHub, channel: &str) -> Option<Self> {
        if !hub.is_enabled() {
            return None;
        }
        Some(Self {
            channel: channel.to_string(),
            instance: Uuid::new_v4(),
            sender: hub.channel(channel),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl ChangeTransport for BroadcastTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Broadcast
    }

    async fn publish(&self, event: &ChangeEvent) -> AdminResult<()> {
        let envelope = Envelope {
            sender: self.instance,
            payload: event.to_json(),
        };
        match self.sender.send(envelope) {
            Ok(receivers) => debug!("Broadcast on '{}' reached {} receiver(s)", self.channel, receivers),
            Err(_) => debug!("Broadcast on '{}' had no listeners", self.channel),
        }
        Ok(())
    }

    async fn subscribe(&self) -> AdminResult<mpsc::Receiver<ChangeSignal>> {
        let mut incoming = self.sender.subscribe();
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let instance = self.instance;
        let channel = self.channel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    received = incoming.recv() => match received {
                        // A sender never hears its own messages
                        Ok(envelope) if envelope.sender == instance => continue,
                        Ok(envelope) => {
                            let Some(event) = ChangeEvent::parse(&envelope.payload) else {
                                continue;
                            };
                            if tx.send(ChangeSignal::Event(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Listener on '{}' skipped {} message(s)", channel, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            debug!("Listener on '{}' stopped", channel);
        });

        Ok(rx)
    }
}
