//! Identifiers shared between the host page and vendor frames.
//!
//! Sentinels name frames; caller ids name senders inside a frame's queue.
//! Both are drawn from one [`IdAllocator`] so their values never collide, but
//! they are distinct types and cannot be passed for one another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token identifying one vendor frame.
///
/// Written into the frame's identity payload at creation and echoed in every
/// envelope addressed to that frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sentinel(String);

/// Identifies one outbound transport (one creative's use of one vendor tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

/// A caller id as observed by the receiving frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportId(String);

impl Sentinel {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CallerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id the receiving frame will see for events from this caller.
    pub fn to_transport_id(&self) -> TransportId {
        TransportId(self.0.clone())
    }
}

impl TransportId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sentinel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CallerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for TransportId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Monotonic counter handing out sentinels and caller ids.
///
/// One allocator per registry. The first id handed out is `"1"`.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_sentinel(&mut self) -> Sentinel {
        Sentinel(self.bump())
    }

    pub fn next_caller_id(&mut self) -> CallerId {
        CallerId(self.bump())
    }

    /// The most recently issued value, 0 if nothing was issued.
    pub fn last_issued(&self) -> u64 {
        self.last
    }

    fn bump(&mut self) -> String {
        self.last = self.last.saturating_add(1);
        self.last.to_string()
    }
}
