//! Newsletter operations over a shared connection.

use crate::error::ClientError;
use crate::transport::QueryTransport;
use mexline_protocol::{
    extract_newsletter_metadata, mex_query_node, newsletter_query_node, BinaryNode, IqType,
    NewsletterJid, NewsletterMetadata, NodeContent, QueryId,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Newsletter API bound to a connection's query capability.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct NewsletterClient {
    transport: Arc<dyn QueryTransport>,
}

impl NewsletterClient {
    pub fn new(transport: Arc<dyn QueryTransport>) -> Self {
        Self { transport }
    }

    // =========================================================================
    // Query builders
    // =========================================================================

    /// Sends a namespaced `newsletter` stanza addressed to `jid`.
    ///
    /// The transport's response or failure is returned unchanged.
    pub async fn newsletter_query(
        &self,
        jid: &NewsletterJid,
        iq_type: IqType,
        content: NodeContent,
    ) -> Result<BinaryNode, ClientError> {
        let tag = self.transport.generate_message_tag();
        tracing::debug!("Sending newsletter query id={} type={} to={}", tag, iq_type, jid);

        let node = newsletter_query_node(tag, jid, iq_type, content);
        self.transport.query(node).await
    }

    /// Sends a mex query for `jid`.
    ///
    /// The JSON body is `{"variables": {"newsletter_id": jid, ..variables}}`.
    pub async fn wmex_query(
        &self,
        jid: &NewsletterJid,
        query_id: QueryId,
        variables: Map<String, Value>,
    ) -> Result<BinaryNode, ClientError> {
        let tag = self.transport.generate_message_tag();
        tracing::debug!(
            "Sending mex query id={} query_id={:?} newsletter={}",
            tag,
            query_id,
            jid
        );

        let node = mex_query_node(tag, jid, query_id, variables)?;
        self.transport.query(node).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Follows a newsletter. Returns the raw response.
    pub async fn follow(&self, jid: &NewsletterJid) -> Result<BinaryNode, ClientError> {
        self.wmex_query(jid, QueryId::Follow, Map::new()).await
    }

    /// Unfollows a newsletter. Returns the raw response.
    pub async fn unfollow(&self, jid: &NewsletterJid) -> Result<BinaryNode, ClientError> {
        self.wmex_query(jid, QueryId::Unfollow, Map::new()).await
    }

    /// Mutes a newsletter. Returns the raw response.
    pub async fn mute(&self, jid: &NewsletterJid) -> Result<BinaryNode, ClientError> {
        self.wmex_query(jid, QueryId::Mute, Map::new()).await
    }

    /// Unmutes a newsletter. Returns the raw response.
    pub async fn unmute(&self, jid: &NewsletterJid) -> Result<BinaryNode, ClientError> {
        self.wmex_query(jid, QueryId::Unmute, Map::new()).await
    }

    /// Deletes a newsletter. Returns the raw response.
    pub async fn delete(&self, jid: &NewsletterJid) -> Result<BinaryNode, ClientError> {
        self.wmex_query(jid, QueryId::Delete, Map::new()).await
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Fetches newsletter metadata including the viewer's relationship.
    pub async fn newsletter_metadata(
        &self,
        jid: &NewsletterJid,
    ) -> Result<NewsletterMetadata, ClientError> {
        let response = self
            .wmex_query(jid, QueryId::Metadata, viewer_metadata_variables(jid))
            .await?;
        Ok(extract_newsletter_metadata(&response, false)?)
    }

    /// Returns whether the connection's account follows `jid`.
    ///
    /// Any failure (transport error, error response, malformed payload)
    /// yields `false`.
    pub async fn is_following(&self, jid: &NewsletterJid) -> bool {
        match self.newsletter_metadata(jid).await {
            Ok(metadata) => metadata.is_subscribed(),
            Err(e) => {
                tracing::debug!("Subscription check for {} failed: {}", jid, e);
                false
            }
        }
    }
}

fn viewer_metadata_variables(jid: &NewsletterJid) -> Map<String, Value> {
    let mut variables = Map::new();
    variables.insert(
        "input".to_string(),
        json!({
            "key": jid.as_str(),
            "type": "NEWSLETTER",
            "view_role": "GUEST",
        }),
    );
    variables.insert("fetch_viewer_metadata".to_string(), Value::Bool(true));
    variables
}
