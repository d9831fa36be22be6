use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::ids::{Sentinel, TransportId};
use crate::message_type::{DATA, EVENT_BATCH, READY};

/// Marker prefixed to every envelope on the shared channel.
pub const MARKER: &str = "amp-";

/// One trigger event inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "transportId")]
    pub transport_id: TransportId,
    pub message: String,
}

impl EventMessage {
    pub fn new(transport_id: TransportId, message: impl Into<String>) -> Self {
        Self {
            transport_id,
            message: message.into(),
        }
    }
}

/// A decoded cross-frame message.
///
/// Wire format:
/// ```text
/// amp-{"type":"sendEventMessages","sentinel":"7","events":[{"transportId":"9","message":"x"}]}
/// └──┘└──────────────────────────── JSON body ────────────────────────────────────────────┘
/// marker
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub sentinel: Sentinel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Create an event batch addressed to `sentinel`.
    pub fn event_batch(sentinel: Sentinel, events: Vec<EventMessage>) -> Self {
        Self {
            msg_type: EVENT_BATCH.to_string(),
            sentinel,
            events: Some(events),
            data: None,
        }
    }

    /// Create a raw data message addressed to `sentinel`.
    pub fn data(sentinel: Sentinel, data: serde_json::Value) -> Self {
        Self {
            msg_type: DATA.to_string(),
            sentinel,
            events: None,
            data: Some(data),
        }
    }

    /// Create the readiness signal a frame sends to its host.
    pub fn ready(sentinel: Sentinel) -> Self {
        Self {
            msg_type: READY.to_string(),
            sentinel,
            events: None,
            data: None,
        }
    }

    /// Number of events carried (0 for non-batch messages).
    pub fn event_count(&self) -> usize {
        self.events.as_ref().map_or(0, Vec::len)
    }
}

/// Encode an envelope into its marker-prefixed string form.
pub fn encode_envelope(envelope: &Envelope) -> Result<String> {
    let body = serde_json::to_string(envelope)?;
    let mut out = String::with_capacity(MARKER.len() + body.len());
    out.push_str(MARKER);
    out.push_str(&body);
    Ok(out)
}

/// Decode a marker-prefixed string into an envelope.
///
/// Returns [`WireError::MissingMarker`] for foreign traffic so callers can
/// skip it without inspecting the body.
pub fn decode_envelope(raw: &str) -> Result<Envelope> {
    let body = raw.strip_prefix(MARKER).ok_or(WireError::MissingMarker)?;
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_batch_with_marker_and_camel_case_ids() {
        let envelope = Envelope::event_batch(
            Sentinel::from("7"),
            vec![EventMessage::new(TransportId::from("9"), "x")],
        );
        let wire = encode_envelope(&envelope).unwrap();

        assert!(wire.starts_with("amp-{"));
        assert!(wire.contains(r#""type":"sendEventMessages""#));
        assert!(wire.contains(r#""transportId":"9""#));
        assert!(!wire.contains("\"data\""));
    }

    #[test]
    fn decodes_batch_from_handwritten_json() {
        let raw = r#"amp-{"type":"sendEventMessages","sentinel":"7","events":[{"transportId":"9","message":"x"},{"transportId":"9","message":"y"}]}"#;
        let envelope = decode_envelope(raw).unwrap();

        assert_eq!(envelope.msg_type, EVENT_BATCH);
        assert_eq!(envelope.sentinel.as_str(), "7");
        assert_eq!(envelope.event_count(), 2);
        let events = envelope.events.unwrap();
        assert_eq!(events[1].message, "y");
    }

    #[test]
    fn decodes_data_message() {
        let raw = r#"amp-{"type":"sendData","sentinel":"3","data":{"k":1}}"#;
        let envelope = decode_envelope(raw).unwrap();
        assert_eq!(envelope.msg_type, DATA);
        assert_eq!(envelope.data, Some(serde_json::json!({"k": 1})));
        assert_eq!(envelope.event_count(), 0);
    }

    #[test]
    fn ready_signal_has_no_payload() {
        let wire = encode_envelope(&Envelope::ready(Sentinel::from("12"))).unwrap();
        assert_eq!(wire, r#"amp-{"type":"ampAnalytics3pReady","sentinel":"12"}"#);
    }

    #[test]
    fn rejects_foreign_traffic() {
        let result = decode_envelope(r#"{"type":"sendData","sentinel":"1"}"#);
        assert!(matches!(result, Err(WireError::MissingMarker)));
    }

    #[test]
    fn rejects_body_without_sentinel() {
        let result = decode_envelope(r#"amp-{"type":"sendData"}"#);
        assert!(matches!(result, Err(WireError::Json(_))));
    }
}
