//! Request tag generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates request tags of the form `<prefix>.<n>`.
///
/// The prefix is random per generator, the counter starts at 1.
#[derive(Debug)]
pub struct MessageTagGenerator {
    prefix: String,
    next: AtomicU64,
}

impl MessageTagGenerator {
    pub fn new() -> Self {
        let prefix = uuid::Uuid::new_v4().simple().to_string();
        Self::with_prefix(&prefix[..12])
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the next tag.
    pub fn next_tag(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}.{}", self.prefix, n)
    }
}

impl Default for MessageTagGenerator {
    fn default() -> Self {
        Self::new()
    }
}
