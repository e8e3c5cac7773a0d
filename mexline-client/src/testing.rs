//! Scripted transport for unit tests.

use crate::error::ClientError;
use crate::tag::MessageTagGenerator;
use crate::transport::QueryTransport;
use async_trait::async_trait;
use mexline_protocol::{BinaryNode, QueryId};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

type Responder = Box<dyn Fn(&BinaryNode) -> Result<BinaryNode, ClientError> + Send + Sync>;

/// Records every request and answers with a caller-supplied closure.
pub(crate) struct MockTransport {
    requests: Mutex<Vec<BinaryNode>>,
    tags: MessageTagGenerator,
    responder: Responder,
}

impl MockTransport {
    pub(crate) fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&BinaryNode) -> Result<BinaryNode, ClientError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            tags: MessageTagGenerator::with_prefix("test"),
            responder: Box::new(responder),
        })
    }

    /// Answers every mex call by query id; other requests get an empty result.
    pub(crate) fn mex<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<BinaryNode, ClientError> + Send + Sync + 'static,
    {
        Self::new(move |node| match mex_call(node) {
            Some((query_id, variables)) => {
                let jid = variables["newsletter_id"].as_str().unwrap_or_default();
                responder(&query_id, jid)
            }
            None => Ok(ack()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<BinaryNode> {
        self.requests.lock().clone()
    }

    /// Returns the newsletter ids of recorded mex calls with this query id, in order.
    pub(crate) fn mex_targets(&self, query_id: QueryId) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(mex_call)
            .filter(|(id, _)| id == query_id.as_str())
            .filter_map(|(_, variables)| variables["newsletter_id"].as_str().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, ClientError> {
        self.requests.lock().push(node.clone());
        (self.responder)(&node)
    }

    fn generate_message_tag(&self) -> String {
        self.tags.next_tag()
    }
}

/// Decodes the query id and variables of a mex request.
pub(crate) fn mex_call(node: &BinaryNode) -> Option<(String, Value)> {
    let query = node.get_child("query")?;
    let query_id = query.attr("query_id")?.to_string();
    let body: Value = serde_json::from_slice(query.content_bytes()?).ok()?;
    Some((query_id, body["variables"].clone()))
}

/// A mex response carrying `data` verbatim.
pub(crate) fn data_response(data: Value) -> BinaryNode {
    BinaryNode::new("iq")
        .with_attr("type", "result")
        .with_children(vec![BinaryNode::new("result")
            .with_bytes(json!({ "data": data }).to_string())])
}

/// A metadata response with the given subscription flag.
pub(crate) fn viewer_response(jid: &str, is_subscribed: bool) -> BinaryNode {
    data_response(json!({
        "xwa2_newsletter": {
            "id": jid,
            "state": {"type": "ACTIVE"},
            "thread_metadata": {
                "creation_time": "1700000000",
                "name": {"text": "Channel", "update_time": "1700000000"},
                "subscribers_count": "10"
            },
            "viewer_metadata": {"mute": "OFF", "role": "GUEST", "is_subscribed": is_subscribed}
        }
    }))
}

/// A bare successful response.
pub(crate) fn ack() -> BinaryNode {
    data_response(json!({}))
}
