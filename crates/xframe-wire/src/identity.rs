use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::ids::Sentinel;

/// Identity payload embedded in a vendor frame's name at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIdentity {
    pub sentinel: Sentinel,
    /// Bootstrap script the frame should load before announcing readiness.
    #[serde(
        rename = "scriptSrc",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub script_src: Option<String>,
}

impl FrameIdentity {
    pub fn new(sentinel: Sentinel) -> Self {
        Self {
            sentinel,
            script_src: None,
        }
    }

    pub fn with_script_src(mut self, script_src: impl Into<String>) -> Self {
        self.script_src = Some(script_src.into());
        self
    }

    /// Serialize into the string stored in the frame's name.
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the payload found in a frame's name.
    ///
    /// An empty payload or an empty sentinel is [`WireError::MissingIdentity`];
    /// anything that is not a JSON object with a string sentinel is
    /// [`WireError::MalformedIdentity`].
    pub fn parse(payload: &str) -> Result<Self> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(WireError::MissingIdentity);
        }

        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|err| WireError::MalformedIdentity(err.to_string()))?;
        match value.get("sentinel") {
            None | Some(serde_json::Value::Null) => return Err(WireError::MissingIdentity),
            Some(serde_json::Value::String(_)) => {}
            Some(other) => {
                return Err(WireError::MalformedIdentity(format!(
                    "sentinel must be a string, got {other}"
                )))
            }
        }

        let identity: Self = serde_json::from_value(value)
            .map_err(|err| WireError::MalformedIdentity(err.to_string()))?;
        if identity.sentinel.is_empty() {
            return Err(WireError::MissingIdentity);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_camel_case_script_src() {
        let identity = FrameIdentity::new(Sentinel::from("3"))
            .with_script_src("https://cdn.example/ampanalytics-lib.js");
        let payload = identity.to_payload().unwrap();

        assert!(payload.contains(r#""sentinel":"3""#));
        assert!(payload.contains(r#""scriptSrc":"https://cdn.example/ampanalytics-lib.js""#));
        assert_eq!(FrameIdentity::parse(&payload).unwrap(), identity);
    }

    #[test]
    fn parses_payload_with_whitespace() {
        let identity = FrameIdentity::parse(r#"{"sentinel": "5001"}"#).unwrap();
        assert_eq!(identity.sentinel.as_str(), "5001");
        assert!(identity.script_src.is_none());
    }

    #[test]
    fn empty_payload_is_missing_identity() {
        assert!(matches!(
            FrameIdentity::parse(""),
            Err(WireError::MissingIdentity)
        ));
    }

    #[test]
    fn object_without_sentinel_is_missing_identity() {
        assert!(matches!(
            FrameIdentity::parse(r#"{"scriptSrc":"x"}"#),
            Err(WireError::MissingIdentity)
        ));
        assert!(matches!(
            FrameIdentity::parse(r#"{"sentinel":""}"#),
            Err(WireError::MissingIdentity)
        ));
    }

    #[test]
    fn plain_window_name_is_malformed() {
        assert!(matches!(
            FrameIdentity::parse("some_name"),
            Err(WireError::MalformedIdentity(_))
        ));
        assert!(matches!(
            FrameIdentity::parse(r#"{"sentinel":7}"#),
            Err(WireError::MalformedIdentity(_))
        ));
    }
}
