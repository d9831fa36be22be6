/// Errors that can occur while encoding or decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The message does not start with the envelope marker.
    #[error("missing envelope marker (expected \"amp-\" prefix)")]
    MissingMarker,

    /// The envelope or identity body is not valid JSON for its shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame identity payload is empty or carries no sentinel.
    #[error("frame identity payload has no sentinel")]
    MissingIdentity,

    /// The frame identity payload is present but unusable.
    #[error("malformed frame identity payload: {0}")]
    MalformedIdentity(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
