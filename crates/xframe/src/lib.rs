//! Cross-frame analytics transport.
//!
//! Many ad creatives on a page share one hidden frame per analytics vendor.
//! The host side acquires that frame, queues each creative's events until the
//! frame signals readiness, and then delivers them in batches. Inside the
//! frame, an inbound router checks the sentinel and fans batches out to one
//! creative router per sending creative.
//!
//! # Crate Structure
//!
//! - [`wire`]: envelope, identity payload, and id types shared by both sides
//! - [`host`]: frame registry, message queue, outbound transport, direct sends
//! - [`router`]: inbound and per-creative routing inside the vendor frame
//! - [`scenario`]: in-memory replay of a page and its vendor frames

pub mod scenario;

/// Re-export wire types.
pub mod wire {
    pub use xframe_wire::*;
}

/// Re-export host-side types.
pub mod host {
    pub use xframe_host::*;
}

/// Re-export vendor-frame routing types.
pub mod router {
    pub use xframe_router::*;
}

pub use scenario::{run_scenario, DeliveredBatch, Scenario, ScenarioError, SimulationReport};
