//! Wire-level building blocks for cross-frame analytics delivery.
//!
//! Every message crossing the frame boundary is a string envelope:
//! - A fixed `amp-` marker so unrelated `postMessage` traffic is skipped cheaply
//! - A JSON body carrying the message type and the target frame's sentinel
//! - Either a batch of `{transportId, message}` events or a raw data payload
//!
//! Frames learn their own sentinel from the identity payload written into
//! their name at creation time.

pub mod envelope;
pub mod error;
pub mod identity;
pub mod ids;
pub mod message_type;

pub use envelope::{decode_envelope, encode_envelope, Envelope, EventMessage, MARKER};
pub use error::{Result, WireError};
pub use identity::FrameIdentity;
pub use ids::{CallerId, IdAllocator, Sentinel, TransportId};
pub use message_type::{DATA, EVENT_BATCH, READY};
