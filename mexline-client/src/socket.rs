//! Newsletter socket: the client plus its connection-driven auto-follow.

use crate::auto_follow::{AutoFollowHandle, AutoFollower};
use crate::client::NewsletterClient;
use crate::config::Config;
use crate::events::ConnectionUpdate;
use crate::transport::QueryTransport;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Newsletter operations layered on an existing connection.
///
/// Dereferences to [`NewsletterClient`] for the request API. When
/// auto-follow is active in the configuration, construction registers a
/// listener on the connection's update channel; it is removed by
/// [`shutdown`](Self::shutdown) or when the socket is dropped.
pub struct NewsletterSocket {
    client: NewsletterClient,
    auto_follow: Option<AutoFollowHandle>,
}

impl NewsletterSocket {
    /// Creates the socket.
    ///
    /// Must be called from within a tokio runtime if auto-follow is active.
    pub fn new(
        transport: Arc<dyn QueryTransport>,
        updates: broadcast::Receiver<ConnectionUpdate>,
        config: &Config,
    ) -> Self {
        let client = NewsletterClient::new(transport);

        let auto_follow = if config.auto_follow.is_active() {
            tracing::info!(
                "Auto-follow enabled for {} newsletter(s)",
                config.auto_follow.newsletters.len()
            );
            let newsletters = config.auto_follow.newsletters.clone();
            Some(AutoFollower::new(client.clone(), newsletters).spawn(updates))
        } else {
            tracing::debug!("Auto-follow disabled");
            None
        };

        Self {
            client,
            auto_follow,
        }
    }

    /// Returns the newsletter client.
    pub fn client(&self) -> &NewsletterClient {
        &self.client
    }

    /// Returns the auto-follow listener, if one is running.
    pub fn auto_follow(&self) -> Option<&AutoFollowHandle> {
        self.auto_follow.as_ref()
    }

    /// Stops the auto-follow listener, if any.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.auto_follow.take() {
            handle.shutdown().await;
        }
    }
}

impl Deref for NewsletterSocket {
    type Target = NewsletterClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
