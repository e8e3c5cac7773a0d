//! Newsletter identifiers.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server part of every newsletter jid.
pub const NEWSLETTER_SERVER: &str = "newsletter";

/// Address of the server itself, target of all mex queries.
pub const S_WHATSAPP_NET: &str = "@s.whatsapp.net";

/// A newsletter identifier of the form `<digits>@newsletter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NewsletterJid(String);

impl NewsletterJid {
    /// Parses and validates a newsletter jid.
    pub fn parse(jid: impl Into<String>) -> Result<Self, ProtocolError> {
        let jid = jid.into();
        let valid = match jid.split_once('@') {
            Some((user, server)) => {
                server == NEWSLETTER_SERVER
                    && !user.is_empty()
                    && user.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };

        if valid {
            Ok(Self(jid))
        } else {
            Err(ProtocolError::InvalidJid(jid))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NewsletterJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NewsletterJid {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NewsletterJid {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<NewsletterJid> for String {
    fn from(jid: NewsletterJid) -> Self {
        jid.0
    }
}

impl AsRef<str> for NewsletterJid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
