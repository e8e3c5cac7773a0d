//! Newsletter request builders.
//!
//! Two request shapes exist: a namespaced `iq` addressed to the newsletter
//! itself, and a "mex" `iq` addressed to the server that carries a JSON
//! payload inside a single `query` child. Builders here are pure; the tag is
//! supplied by the caller and no I/O happens.

use crate::error::ProtocolError;
use crate::jid::{NewsletterJid, S_WHATSAPP_NET};
use crate::node::{BinaryNode, NodeContent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Namespace of plain newsletter stanzas.
pub const NEWSLETTER_XMLNS: &str = "newsletter";

/// Namespace of mex queries.
pub const MEX_XMLNS: &str = "w:mex";

/// IQ request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IqType {
    Get,
    Set,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
        }
    }
}

impl fmt::Display for IqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-recognized mex query identifiers.
///
/// The operation a mex query performs is selected by this identifier alone;
/// every mex query is sent as an `iq` of type `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryId {
    Metadata,
    Follow,
    Unfollow,
    Mute,
    Unmute,
    Delete,
}

impl QueryId {
    pub const ALL: [QueryId; 6] = [
        QueryId::Metadata,
        QueryId::Follow,
        QueryId::Unfollow,
        QueryId::Mute,
        QueryId::Unmute,
        QueryId::Delete,
    ];

    /// Returns the identifier sent in `query_id`.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryId::Metadata => "6620195908089573",
            QueryId::Follow => "7871414976211147",
            QueryId::Unfollow => "7238632346214362",
            QueryId::Mute => "25151904754424642",
            QueryId::Unmute => "7337137176362961",
            QueryId::Delete => "8316537688363079",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys under `data` in mex responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XwaPath {
    Newsletter,
    Create,
}

impl XwaPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            XwaPath::Newsletter => "xwa2_newsletter",
            XwaPath::Create => "xwa2_newsletter_create",
        }
    }
}

impl fmt::Display for XwaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a namespaced newsletter stanza:
/// `<iq id=.. type=.. xmlns="newsletter" to=jid>content</iq>`.
pub fn newsletter_query_node(
    tag: impl Into<String>,
    jid: &NewsletterJid,
    iq_type: IqType,
    content: NodeContent,
) -> BinaryNode {
    BinaryNode::new("iq")
        .with_attr("id", tag)
        .with_attr("type", iq_type.as_str())
        .with_attr("xmlns", NEWSLETTER_XMLNS)
        .with_attr("to", jid.as_str())
        .with_content(content)
}

/// Builds the JSON body of a mex query: `{"variables": {"newsletter_id": jid, ..extra}}`.
///
/// Extra variables are merged after `newsletter_id` and replace it on a key clash.
pub fn mex_variables(jid: &NewsletterJid, extra: Map<String, Value>) -> Value {
    let mut variables = Map::new();
    variables.insert(
        "newsletter_id".to_string(),
        Value::String(jid.as_str().to_string()),
    );
    variables.extend(extra);

    let mut body = Map::new();
    body.insert("variables".to_string(), Value::Object(variables));
    Value::Object(body)
}

/// Builds a mex query:
/// `<iq id=.. type="get" xmlns="w:mex" to="@s.whatsapp.net"><query query_id=..>json</query></iq>`.
pub fn mex_query_node(
    tag: impl Into<String>,
    jid: &NewsletterJid,
    query_id: QueryId,
    extra: Map<String, Value>,
) -> Result<BinaryNode, ProtocolError> {
    let payload = serde_json::to_vec(&mex_variables(jid, extra))?;

    let query = BinaryNode::new("query")
        .with_attr("query_id", query_id.as_str())
        .with_bytes(payload);

    Ok(BinaryNode::new("iq")
        .with_attr("id", tag)
        .with_attr("type", IqType::Get.as_str())
        .with_attr("xmlns", MEX_XMLNS)
        .with_attr("to", S_WHATSAPP_NET)
        .with_children(vec![query]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn jid(s: &str) -> NewsletterJid {
        NewsletterJid::parse(s).unwrap()
    }

    fn query_payload(node: &BinaryNode) -> Value {
        let query = node.get_child("query").expect("query child");
        serde_json::from_slice(query.content_bytes().expect("query bytes")).unwrap()
    }

    #[test]
    fn test_newsletter_query_node() {
        let target = jid("120363419833061999@newsletter");
        let content = NodeContent::Nodes(vec![BinaryNode::new("messages")]);
        let node = newsletter_query_node("tag-1", &target, IqType::Set, content.clone());

        assert_eq!(node.tag, "iq");
        assert_eq!(node.attr("id"), Some("tag-1"));
        assert_eq!(node.attr("type"), Some("set"));
        assert_eq!(node.attr("xmlns"), Some("newsletter"));
        assert_eq!(node.attr("to"), Some("120363419833061999@newsletter"));
        assert_eq!(node.content, content);
    }

    #[test]
    fn test_mex_query_node_shape() {
        let target = jid("42@newsletter");
        let node = mex_query_node("tag-2", &target, QueryId::Follow, Map::new()).unwrap();

        assert_eq!(node.attr("id"), Some("tag-2"));
        assert_eq!(node.attr("type"), Some("get"));
        assert_eq!(node.attr("xmlns"), Some("w:mex"));
        assert_eq!(node.attr("to"), Some("@s.whatsapp.net"));
        assert_eq!(node.children().len(), 1);

        let query = node.get_child("query").unwrap();
        assert_eq!(query.attr("query_id"), Some("7871414976211147"));
        assert_eq!(
            query_payload(&node),
            json!({"variables": {"newsletter_id": "42@newsletter"}})
        );
    }

    #[test]
    fn test_mex_query_extra_variables() {
        let target = jid("42@newsletter");
        let extra = json!({
            "input": {"key": "42@newsletter", "type": "NEWSLETTER", "view_role": "GUEST"},
            "fetch_viewer_metadata": true,
        });
        let Value::Object(extra) = extra else {
            unreachable!()
        };

        let node = mex_query_node("t", &target, QueryId::Metadata, extra).unwrap();
        let payload = query_payload(&node);
        assert_eq!(payload["variables"]["newsletter_id"], "42@newsletter");
        assert_eq!(payload["variables"]["input"]["view_role"], "GUEST");
        assert_eq!(payload["variables"]["fetch_viewer_metadata"], true);
    }

    #[test]
    fn test_extra_newsletter_id_overrides() {
        let mut extra = Map::new();
        extra.insert("newsletter_id".to_string(), json!("7@newsletter"));
        let body = mex_variables(&jid("42@newsletter"), extra);
        assert_eq!(body["variables"]["newsletter_id"], "7@newsletter");
    }

    #[test]
    fn test_query_ids_distinct() {
        let mut ids: Vec<_> = QueryId::ALL.iter().map(QueryId::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), QueryId::ALL.len());
    }

    proptest! {
        #[test]
        fn prop_mex_envelope_addressing(
            user in "[0-9]{1,20}",
            query_id in proptest::sample::select(QueryId::ALL.to_vec()),
            tag in "[a-z0-9.]{1,16}",
        ) {
            let target = jid(&format!("{user}@newsletter"));
            let node = mex_query_node(tag.clone(), &target, query_id, Map::new()).unwrap();

            prop_assert_eq!(node.attr("to"), Some(S_WHATSAPP_NET));
            prop_assert_eq!(node.attr("type"), Some("get"));
            prop_assert_eq!(node.attr("id"), Some(tag.as_str()));

            let query = node.get_child("query").unwrap();
            prop_assert_eq!(query.attr("query_id"), Some(query_id.as_str()));

            let payload = query_payload(&node);
            prop_assert_eq!(
                payload["variables"]["newsletter_id"].as_str(),
                Some(target.as_str())
            );
        }
    }
}
