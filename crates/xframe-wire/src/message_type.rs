//! Envelope message types.
//!
//! Host -> frame traffic uses [`EVENT_BATCH`] and [`DATA`].
//! Frame -> host traffic uses [`READY`].

/// Batched trigger events, one `{transportId, message}` entry per event.
pub const EVENT_BATCH: &str = "sendEventMessages";

/// A raw payload from a single sender.
pub const DATA: &str = "sendData";

/// The vendor frame has loaded its listener and can receive events.
pub const READY: &str = "ampAnalytics3pReady";

/// Returns a human-readable name for a message type.
pub fn type_name(msg_type: &str) -> &'static str {
    match msg_type {
        EVENT_BATCH => "EVENT_BATCH",
        DATA => "DATA",
        READY => "READY",
        _ => "UNKNOWN",
    }
}

/// Returns true if the message type is one this crate understands.
pub fn is_known(msg_type: &str) -> bool {
    matches!(msg_type, EVENT_BATCH | DATA | READY)
}
