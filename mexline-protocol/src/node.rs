//! Binary node tree exchanged with the connection layer.
//!
//! Encoding nodes to and from the wire is the transport's job; this module
//! only models the tree so requests can be built and responses inspected.

use crate::error::ProtocolError;
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Content carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeContent {
    #[default]
    Empty,
    /// Child nodes.
    Nodes(Vec<BinaryNode>),
    /// Raw payload bytes.
    Bytes(Bytes),
}

impl Serialize for NodeContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NodeContent::Empty => serializer.serialize_none(),
            NodeContent::Nodes(nodes) => nodes.serialize(serializer),
            // Readable rendering for diagnostics: text when possible.
            NodeContent::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => bytes.as_ref().serialize(serializer),
            },
        }
    }
}

/// A node in the binary stanza tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BinaryNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub content: NodeContent,
}

impl BinaryNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            content: NodeContent::Empty,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<BinaryNode>) -> Self {
        self.content = NodeContent::Nodes(children);
        self
    }

    pub fn with_bytes(mut self, bytes: impl Into<Bytes>) -> Self {
        self.content = NodeContent::Bytes(bytes.into());
        self
    }

    pub fn with_content(mut self, content: NodeContent) -> Self {
        self.content = content;
        self
    }

    /// Returns an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Returns the direct children (empty unless the content is a node list).
    pub fn children(&self) -> &[BinaryNode] {
        match &self.content {
            NodeContent::Nodes(nodes) => nodes,
            _ => &[],
        }
    }

    /// Returns the first direct child with the given tag.
    pub fn get_child(&self, tag: &str) -> Option<&BinaryNode> {
        self.children().iter().find(|child| child.tag == tag)
    }

    /// Returns the raw payload bytes, if the content is a byte payload.
    pub fn content_bytes(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::Bytes(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    /// Decodes the byte payload as UTF-8 text.
    ///
    /// Returns `Ok(None)` when the node carries no byte payload.
    pub fn content_str(&self) -> Result<Option<&str>, ProtocolError> {
        self.content_bytes()
            .map(|bytes| std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_child_returns_first_match() {
        let node = BinaryNode::new("iq").with_children(vec![
            BinaryNode::new("result").with_bytes("first"),
            BinaryNode::new("result").with_bytes("second"),
        ]);

        let child = node.get_child("result").unwrap();
        assert_eq!(child.content_str().unwrap(), Some("first"));
        assert!(node.get_child("error").is_none());
    }

    #[test]
    fn test_get_child_on_byte_content() {
        let node = BinaryNode::new("result").with_bytes("{}");
        assert!(node.children().is_empty());
        assert!(node.get_child("result").is_none());
    }

    #[test]
    fn test_content_str() {
        let node = BinaryNode::new("result").with_bytes(vec![0xff, 0xfe]);
        assert!(matches!(node.content_str(), Err(ProtocolError::InvalidUtf8)));

        let node = BinaryNode::new("result");
        assert_eq!(node.content_str().unwrap(), None);
    }

    #[test]
    fn test_node_serialization() {
        let node = BinaryNode::new("iq")
            .with_attr("type", "get")
            .with_children(vec![
                BinaryNode::new("query").with_bytes("{\"a\":1}"),
                BinaryNode::new("raw").with_bytes(vec![0xff]),
                BinaryNode::new("empty"),
            ]);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["tag"], "iq");
        assert_eq!(json["attrs"]["type"], "get");
        assert_eq!(json["content"][0]["content"], "{\"a\":1}");
        assert_eq!(json["content"][1]["content"], serde_json::json!([255]));
        assert!(json["content"][2]["content"].is_null());
    }
}
