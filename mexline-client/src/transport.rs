//! Capabilities borrowed from the enclosing connection.

use crate::error::ClientError;
use async_trait::async_trait;
use mexline_protocol::BinaryNode;

/// Request/response primitive of an established connection.
///
/// Implementations own framing, encryption, correlation of responses to
/// requests by their `id` attribute, and any timeout. A request that never
/// settles leaves the calling operation pending.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Sends a stanza and waits for the correlated response.
    ///
    /// Fails on timeout, disconnect, or an error response from the server.
    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, ClientError>;

    /// Returns a request tag unique for the lifetime of the connection.
    fn generate_message_tag(&self) -> String;
}
