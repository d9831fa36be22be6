use xframe_wire::{CallerId, WireError};

/// Errors that can occur on the host side of cross-frame delivery.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No frame record exists for the vendor type.
    #[error("trying to use non-existent frame for vendor type '{0}'")]
    NonExistentFrame(String),

    /// A release did not match any outstanding acquisition.
    #[error("marked the '{0}' frame as done, but there is no record of it existing")]
    InconsistentState(String),

    /// Teardown was requested for a transport that never acquired a frame.
    #[error("transport {0} has no frame acquisition to release")]
    NotAcquired(CallerId),

    /// The request URL is not HTTPS.
    #[error("analytics request must use https: {0}")]
    InsecureUrl(String),

    /// The request URL could not be parsed.
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// A ping frame would load from the document's own origin.
    #[error("origin of iframe request must not be equal to the document origin: {0}")]
    SameOriginPing(String),

    /// Envelope or identity encoding failed.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

pub type Result<T> = std::result::Result<T, HostError>;
