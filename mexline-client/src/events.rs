//! Connection lifecycle events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default capacity of the lifecycle channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connection state reported by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Close,
}

/// A `connection.update` event.
///
/// Fields left `None` did not change in this update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new_login: Option<bool>,
}

impl ConnectionUpdate {
    pub fn state(state: ConnectionState) -> Self {
        Self {
            connection: Some(state),
            ..Default::default()
        }
    }

    pub fn open() -> Self {
        Self::state(ConnectionState::Open)
    }

    /// Returns true if this update reports the connection as open.
    pub fn is_open(&self) -> bool {
        self.connection == Some(ConnectionState::Open)
    }
}

/// Broadcast bus for connection updates.
///
/// The connection owner publishes with [`notify`](Self::notify); listeners
/// hold a receiver from [`subscribe`](Self::subscribe) and unsubscribe by
/// dropping it.
#[derive(Debug, Clone)]
pub struct ConnectionEvents {
    sender: broadcast::Sender<ConnectionUpdate>,
}

impl ConnectionEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate> {
        self.sender.subscribe()
    }

    /// Publishes an update, returning how many listeners received it.
    pub fn notify(&self, update: ConnectionUpdate) -> usize {
        // No receivers is not an error for a lifecycle bus
        self.sender.send(update).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ConnectionEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
