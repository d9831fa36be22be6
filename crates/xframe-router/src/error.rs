use xframe_wire::{TransportId, WireError};

/// Errors that can occur in the vendor frame's router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The frame's identity payload is missing or unusable.
    #[error("cannot create router from frame identity: {0}")]
    Identity(#[source] WireError),

    /// Encoding an outgoing envelope failed.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// A creative received events before any listener was registered.
    #[error("no events listener registered for transport {0}")]
    NoListener(TransportId),

    /// Vendor code is not wired up correctly. Returned under strict assertions.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
