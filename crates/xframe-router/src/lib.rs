//! Vendor-frame side of cross-frame analytics delivery.
//!
//! A vendor frame receives every creative's events over one channel. The
//! [`InboundRouter`] checks each envelope's sentinel against the one the frame
//! was created with, then fans events out to one [`CreativeRouter`] per
//! transport id. Vendor code sees each new creative once, through the handler
//! set with [`InboundRouter::set_instance_handler`], and registers its events
//! listener there.

pub mod config;
pub mod creative;
pub mod error;
pub mod report;
pub mod router;

pub use config::{AssertionMode, RouterConfig};
pub use creative::CreativeRouter;
pub use error::{Result, RouterError};
pub use report::{Reporter, MAX_RETAINED_REPORTS};
pub use router::{IgnoreReason, InboundRouter, RouteOutcome, DEFAULT_TRANSPORT_ID};
