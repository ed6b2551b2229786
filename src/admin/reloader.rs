use async_trait::async_trait;
use log::debug;
use std::sync::Weak;
use tokio::sync::Mutex;

use super::AdminSession;
use crate::error::AdminResult;
use crate::sync::ReloadHandler;

type ReloadCallback = Box<dyn Fn(&AdminSession) + Send + Sync>;

/// Reloads a shared session when another session saved.
///
/// Holds the session weakly: the notifier that owns this handler lives
/// inside the session's own gateway.
pub struct SessionReloader {
    session: Weak<Mutex<AdminSession>>,
    on_reload: Option<ReloadCallback>,
}

impl SessionReloader {
    pub fn new(session: Weak<Mutex<AdminSession>>) -> Self {
        Self {
            session,
            on_reload: None,
        }
    }

    /// Run `callback` with the freshly reloaded session
    pub fn on_reload(mut self, callback: impl Fn(&AdminSession) + Send + Sync + 'static) -> Self {
        self.on_reload = Some(Box::new(callback));
        self
    }
}

#[async_trait]
impl ReloadHandler for SessionReloader {
    async fn reload(&self) -> AdminResult<()> {
        let Some(session) = self.session.upgrade() else {
            debug!("Session is gone, nothing to reload");
            return Ok(());
        };

        let mut session = session.lock().await;
        session.reload().await?;
        if let Some(callback) = &self.on_reload {
            callback(&session);
        }
        Ok(())
    }
}
