//! A single protocol session: identity, lifecycle state, and the pending
//! notification stream.

use std::pin::Pin;
use std::sync::Mutex as StdMutex;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::types::{JsonRpcNotification, McpError, McpResult};

/// Opaque session identifier. Generated once at creation, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session lifecycle. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Active,
    Closed,
}

/// Both halves of the pending-notification channel. The sender is taken
/// on close so an open stream drains its buffer and then ends; the
/// receiver sits in its slot between consumers.
struct NotifyChannel {
    tx: Option<mpsc::UnboundedSender<JsonRpcNotification>>,
    rx: Option<mpsc::UnboundedReceiver<JsonRpcNotification>>,
}

/// One protocol conversation.
///
/// The pending notification channel is unbounded; buffering is limited
/// only by process memory, which is a documented limit rather than a
/// silent drop (notification volume here is low). At most one
/// [`NotificationStream`] borrows the receiver at a time and hands it
/// back when the consumer goes away, so a session survives any number of
/// poll connections coming and going.
pub struct Session {
    id: SessionId,
    state: RwLock<SessionState>,
    notify: StdMutex<NotifyChannel>,
}

impl Session {
    pub(crate) fn new(id: SessionId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            id,
            state: RwLock::new(SessionState::Initializing),
            notify: StdMutex::new(NotifyChannel {
                tx: Some(tx),
                rx: Some(rx),
            }),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Handshake-complete step: `Initializing → Active`.
    ///
    /// Called by the dispatcher right after the registry has recorded the
    /// id, before the id is surfaced to the client.
    pub(crate) async fn activate(&self) -> McpResult<()> {
        let mut state = self.state.write().await;
        match *state {
            SessionState::Initializing => {
                *state = SessionState::Active;
                Ok(())
            }
            SessionState::Active => Ok(()),
            SessionState::Closed => Err(McpError::SessionNotFound),
        }
    }

    /// Terminal transition.
    ///
    /// Dropping the sender lets an open stream drain its buffered
    /// notifications and then end instead of hanging; a receiver still
    /// parked in the slot is dropped outright.
    pub(crate) async fn close(&self) {
        let mut state = self.state.write().await;
        *state = SessionState::Closed;
        let mut chan = self.notify.lock().unwrap_or_else(|e| e.into_inner());
        chan.tx.take();
        chan.rx.take();
    }

    /// Enqueue a server-initiated notification.
    ///
    /// Silently a no-op once the session is closed (the sender is gone).
    pub fn push_notification(&self, notification: JsonRpcNotification) {
        let chan = self.notify.lock().unwrap_or_else(|e| e.into_inner());
        match chan.tx.as_ref() {
            Some(tx) if tx.send(notification).is_ok() => {}
            _ => {
                tracing::debug!(session = %self.id, "dropping notification for closed session");
            }
        }
    }

    /// Borrow the notification stream. Fails with `StreamBusy` if another
    /// consumer currently holds it.
    pub fn take_notification_stream(self: std::sync::Arc<Self>) -> McpResult<NotificationStream> {
        let rx = self
            .notify
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .rx
            .take()
            .ok_or(McpError::StreamBusy)?;
        Ok(NotificationStream {
            session: self,
            rx: Some(rx),
        })
    }
}

/// The consumer half of a session's pending notification channel.
///
/// Returns the receiver to the session when dropped, so a disconnected
/// poll does not destroy the session or lose buffered notifications.
/// Once the session closes, the stream drains whatever is buffered and
/// then ends.
pub struct NotificationStream {
    session: std::sync::Arc<Session>,
    rx: Option<mpsc::UnboundedReceiver<JsonRpcNotification>>,
}

impl Stream for NotificationStream {
    type Item = JsonRpcNotification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.rx.as_mut() {
            Some(rx) => rx.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

impl std::fmt::Debug for NotificationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStream")
            .field("session", self.session.id())
            .finish_non_exhaustive()
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            let mut chan = self
                .session
                .notify
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            // A live sender means the session is still open: hand the
            // receiver back. After close() the sender is gone and the
            // receiver drops here.
            if chan.tx.is_some() && chan.rx.is_none() {
                chan.rx = Some(rx);
            }
        }
    }
}
