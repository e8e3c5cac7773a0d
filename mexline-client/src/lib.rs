//! # mexline-client
//!
//! Newsletter socket for mexline.
//!
//! This crate provides:
//! - Follow, unfollow, mute, unmute and delete operations
//! - Newsletter metadata fetch and subscription checks
//! - Automatic follow of configured newsletters when the connection opens
//! - YAML and environment configuration
//!
//! The connection itself is supplied by the caller through
//! [`QueryTransport`] and a [`ConnectionUpdate`] broadcast channel.

pub mod auto_follow;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod socket;
pub mod tag;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auto_follow::{AutoFollowHandle, AutoFollower, FollowOutcome, ReconcileReport};
pub use client::NewsletterClient;
pub use config::{AutoFollowConfig, Config, ConfigError, EventsConfig};
pub use error::ClientError;
pub use events::{ConnectionEvents, ConnectionState, ConnectionUpdate};
pub use socket::NewsletterSocket;
pub use tag::MessageTagGenerator;
pub use transport::QueryTransport;
