//! # mexline-protocol
//!
//! Wire model for the mexline newsletter extension.
//!
//! This crate provides:
//! - Binary node tree used for requests and responses
//! - Newsletter jid validation
//! - Builders for namespaced and mex newsletter queries
//! - Projection of mex responses into newsletter metadata

pub mod error;
pub mod jid;
pub mod metadata;
pub mod node;
pub mod query;

pub use error::ProtocolError;
pub use jid::{NewsletterJid, NEWSLETTER_SERVER, S_WHATSAPP_NET};
pub use metadata::{extract_newsletter_metadata, NewsletterMetadata, ViewerMetadata};
pub use node::{BinaryNode, NodeContent};
pub use query::{
    mex_query_node, mex_variables, newsletter_query_node, IqType, QueryId, XwaPath, MEX_XMLNS,
    NEWSLETTER_XMLNS,
};
