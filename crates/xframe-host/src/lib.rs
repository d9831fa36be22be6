//! Host-page side of cross-frame analytics delivery.
//!
//! Many creatives on one page may report to the same analytics vendor. This
//! crate shares one hidden vendor frame per vendor type between them:
//! - [`FrameRegistry`] creates the frame on first use and removes it when the
//!   last user releases it
//! - [`MessageQueue`] buffers events per sender until the frame announces
//!   readiness, then flushes them as one batch
//! - [`OutboundTransport`] is one creative's handle on a vendor type
//!
//! Requests that do not go through a vendor frame use the direct-send
//! fallback chain in [`direct`].

pub mod config;
pub mod direct;
pub mod error;
pub mod memory;
pub mod ping;
pub mod queue;
pub mod registry;
pub mod traits;
pub mod transport;

pub use config::{RegistryConfig, DEFAULT_FRAME_SANDBOX, SENTINEL_ATTRIBUTE};
pub use direct::{assert_https_url, send_direct, Delivery, Mechanism, XhrRequest};
pub use error::{HostError, Result};
pub use memory::{MemoryDocument, MemoryFrame};
pub use ping::{send_ping_iframe, PingFrame, PING_FRAME_LINGER};
pub use queue::MessageQueue;
pub use registry::{FrameRecord, FrameRegistry, ReleaseOutcome};
pub use traits::{FrameHost, FrameSpec, MessagePort, RequestSender, SendOutcome};
pub use transport::{OutboundTransport, TransportConfig, TransportOptions};
