//! Idle-session tracking: warn after inactivity, then sign the session out.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
    time::Duration,
};

use serde::Serialize;
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use uuid::Uuid;

/// Invoked once, right before an idle session is signed out.
pub type SaveCallback = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleConfig {
    pub timeout: Duration,
    pub warning: Duration,
}

impl IdleConfig {
    /// `warning` is clamped to `timeout`.
    pub fn new(timeout: Duration, warning: Duration) -> Self {
        Self {
            timeout,
            warning: warning.min(timeout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Warning { remaining: Duration },
    SignedOut,
}

/// Owner side of an idle monitor. Dropping it stops the monitor.
pub struct IdleHandle {
    activity: watch::Sender<Instant>,
    task: JoinHandle<()>,
}

impl IdleHandle {
    /// Records user activity, postponing both the warning and the sign-out.
    pub fn touch(&self) {
        let _ = self.activity.send(Instant::now());
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for IdleHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn(config: IdleConfig, on_expire: Option<SaveCallback>) -> (IdleHandle, mpsc::UnboundedReceiver<SessionEvent>) {
    let (activity_tx, activity_rx) = watch::channel(Instant::now());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(monitor(config, activity_rx, events_tx, on_expire));
    (IdleHandle { activity: activity_tx, task }, events_rx)
}

async fn monitor(
    config: IdleConfig,
    mut activity: watch::Receiver<Instant>,
    events: mpsc::UnboundedSender<SessionEvent>,
    mut on_expire: Option<SaveCallback>,
) {
    loop {
        let last_activity = *activity.borrow_and_update();
        let warn_at = last_activity + config.timeout.saturating_sub(config.warning);
        let expire_at = last_activity + config.timeout;

        tokio::select! {
            _ = sleep_until(warn_at) => {}
            changed = activity.changed() => {
                if changed.is_err() {
                    return;
                }
                continue;
            }
        }

        tracing::debug!(remaining_secs = config.warning.as_secs(), "Session idle, warning");
        let _ = events.send(SessionEvent::Warning { remaining: config.warning });

        tokio::select! {
            _ = sleep_until(expire_at) => {}
            changed = activity.changed() => {
                if changed.is_err() {
                    return;
                }
                continue;
            }
        }

        if let Some(save) = on_expire.take() {
            save().await;
        }
        tracing::info!("Idle session signed out");
        let _ = events.send(SessionEvent::SignedOut);
        return;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Warned,
    SignedOut,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
    #[error("session expired: {0}")]
    Expired(Uuid),
    #[error("session registry unavailable")]
    Poisoned,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub id: Uuid,
    pub owner: String,
    pub state: SessionState,
}

struct SessionEntry {
    owner: String,
    state: SessionState,
    handle: IdleHandle,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        self.state == SessionState::SignedOut || self.handle.is_finished()
    }

    fn status(&self, id: Uuid) -> SessionStatus {
        SessionStatus {
            id,
            owner: self.owner.clone(),
            state: if self.is_expired() { SessionState::SignedOut } else { self.state },
        }
    }
}

type Sessions = Arc<RwLock<HashMap<Uuid, SessionEntry>>>;

/// Registry of idle monitors keyed by session id.
///
/// A signed-out session stays visible as `SignedOut` for one more idle
/// timeout, then it is dropped from the registry.
pub struct SessionManager {
    config: IdleConfig,
    sessions: Sessions,
}

impl SessionManager {
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> IdleConfig {
        self.config
    }

    /// Number of sessions still held, signed-out ones included.
    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.sessions.read().map_err(|_| SessionError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }

    pub fn start(&self, owner: &str, on_expire: Option<SaveCallback>) -> Result<SessionStatus, SessionError> {
        let id = Uuid::new_v4();
        let (handle, mut events) = spawn(self.config, on_expire);

        self.sessions.write().map_err(|_| SessionError::Poisoned)?.insert(id, SessionEntry {
            owner: owner.to_string(),
            state: SessionState::Active,
            handle,
        });

        let sessions = self.sessions.clone();
        let retention = self.config.timeout;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let state = match event {
                    SessionEvent::Warning { .. } => SessionState::Warned,
                    SessionEvent::SignedOut => SessionState::SignedOut,
                };
                if let Ok(mut sessions) = sessions.write() {
                    if let Some(entry) = sessions.get_mut(&id) {
                        entry.state = state;
                    }
                }
            }

            tokio::time::sleep(retention).await;
            if let Ok(mut sessions) = sessions.write() {
                if sessions.get(&id).map_or(false, SessionEntry::is_expired) {
                    sessions.remove(&id);
                    tracing::debug!(%id, "Expired session dropped");
                }
            }
        });

        tracing::info!(%id, owner, "Session started");
        Ok(SessionStatus {
            id,
            owner: owner.to_string(),
            state: SessionState::Active,
        })
    }

    pub fn status(&self, id: Uuid) -> Result<SessionStatus, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Poisoned)?;
        let entry = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        Ok(entry.status(id))
    }

    /// Records activity. Signed-out sessions are removed and reported as expired.
    pub fn touch(&self, id: Uuid) -> Result<SessionStatus, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Poisoned)?;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if entry.is_expired() {
            sessions.remove(&id);
            tracing::info!(%id, "Touch on expired session");
            return Err(SessionError::Expired(id));
        }

        entry.handle.touch();
        entry.state = SessionState::Active;
        Ok(entry.status(id))
    }

    pub fn end(&self, id: Uuid) -> Result<(), SessionError> {
        let removed = self.sessions.write().map_err(|_| SessionError::Poisoned)?.remove(&id);
        match removed {
            Some(_) => {
                tracing::info!(%id, "Session ended");
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }
}
