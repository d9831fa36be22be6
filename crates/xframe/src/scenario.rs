//! Replay a page's analytics traffic against in-memory vendor frames.
//!
//! A [`Scenario`] lists the creatives' transports and a sequence of steps.
//! Every transport acquires its vendor frame up front. Frame traffic is
//! pumped into that frame's [`InboundRouter`] after each step, and every
//! batch a creative listener receives ends up in the [`SimulationReport`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use xframe_host::{
    FrameRegistry, HostError, MemoryDocument, MemoryFrame, OutboundTransport, RegistryConfig,
    ReleaseOutcome, TransportConfig,
};
use xframe_router::{CreativeRouter, InboundRouter, RouterConfig, RouterError};

/// Errors raised while replaying a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("router error: {0}")]
    Router(#[from] RouterError),

    #[error("scenario step refers to unknown transport '{0}'")]
    UnknownTransport(String),

    #[error("scenario step refers to vendor '{0}' which has no frame")]
    UnknownVendor(String),

    #[error("transport name '{0}' is used twice")]
    DuplicateTransport(String),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// A creative's transport as declared in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSpec {
    /// Name used by steps to refer to this transport.
    pub name: String,
    /// Analytics vendor type.
    pub vendor: String,
    #[serde(flatten)]
    pub config: TransportConfig,
}

/// One action against the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Queue an event on the transport's vendor frame.
    Send { transport: String, event: String },
    /// The vendor frame finished loading and posted its readiness signal.
    Ready { vendor: String },
    /// The creative went away.
    Teardown { transport: String },
}

/// A recorded page session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Bootstrap script URL written into frame identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_script_url: Option<String>,
    /// Fail on vendor misconfiguration instead of reporting it.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub transports: Vec<TransportSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            bootstrap_script_url: self.bootstrap_script_url.clone(),
            ..RegistryConfig::default()
        }
    }

    fn router_config(&self) -> RouterConfig {
        if self.strict {
            RouterConfig::strict()
        } else {
            RouterConfig::default()
        }
    }
}

/// A batch handed to a creative's events listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredBatch {
    pub vendor: String,
    pub transport_id: String,
    pub events: Vec<String>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Batches in delivery order.
    pub batches: Vec<DeliveredBatch>,
    /// Envelopes the host posted into vendor frames.
    pub posted_messages: usize,
    /// Vendor frames created over the session.
    pub frames_created: usize,
    /// Vendor frames still attached at the end.
    pub frames_remaining: usize,
    /// Misconfigurations reported by vendor-side routers.
    pub reported_errors: Vec<String>,
}

impl SimulationReport {
    pub fn event_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.events.len()).sum()
    }
}

type Deliveries = Rc<RefCell<Vec<DeliveredBatch>>>;

struct VendorSide {
    frame: MemoryFrame,
    router: InboundRouter,
}

/// Replay `scenario` and collect what the creatives' listeners received.
pub fn run_scenario(scenario: &Scenario) -> Result<SimulationReport> {
    let mut registry =
        FrameRegistry::with_config(MemoryDocument::new(), scenario.registry_config());
    let deliveries: Deliveries = Rc::new(RefCell::new(Vec::new()));
    let mut transports: HashMap<String, OutboundTransport> = HashMap::new();
    let mut vendors: BTreeMap<String, VendorSide> = BTreeMap::new();
    let mut report = SimulationReport::default();

    for spec in &scenario.transports {
        if transports.contains_key(&spec.name) {
            return Err(ScenarioError::DuplicateTransport(spec.name.clone()));
        }
        let transport = OutboundTransport::new(&mut registry, &spec.vendor, &spec.config)?;
        if registry.has_frame(&spec.vendor) && !vendors.contains_key(&spec.vendor) {
            let side = vendor_side(&registry, &spec.vendor, scenario.router_config(), &deliveries)?;
            vendors.insert(spec.vendor.clone(), side);
        }
        transports.insert(spec.name.clone(), transport);
    }

    for step in &scenario.steps {
        tracing::debug!(?step, "Replaying step");
        match step {
            Step::Send { transport, event } => {
                let transport = transports
                    .get(transport)
                    .ok_or_else(|| ScenarioError::UnknownTransport(transport.clone()))?;
                transport.send_via_iframe(&mut registry, event)?;
            }
            Step::Ready { vendor } => {
                let side = vendors
                    .get(vendor)
                    .ok_or_else(|| ScenarioError::UnknownVendor(vendor.clone()))?;
                let ready = side.router.ready_message()?;
                registry.handle_frame_message(&ready)?;
            }
            Step::Teardown { transport } => {
                let owned = transports
                    .remove(transport)
                    .ok_or_else(|| ScenarioError::UnknownTransport(transport.clone()))?;
                let vendor = owned.vendor_type().to_string();
                if owned.teardown(&mut registry)? == ReleaseOutcome::Destroyed {
                    tracing::debug!(vendor = %vendor, "Vendor frame destroyed");
                }
            }
        }
        report.posted_messages += pump(&mut vendors)?;
    }

    report.frames_created = registry.host().created_count();
    report.frames_remaining = registry.host().attached_count();
    report.reported_errors = vendors
        .values()
        .flat_map(|side| side.router.reported_errors().iter().cloned())
        .collect();
    report.batches = deliveries.borrow().clone();

    tracing::info!(
        batches = report.batches.len(),
        events = report.event_count(),
        frames_remaining = report.frames_remaining,
        "Scenario complete"
    );
    Ok(report)
}

fn vendor_side(
    registry: &FrameRegistry<MemoryDocument>,
    vendor: &str,
    config: RouterConfig,
    deliveries: &Deliveries,
) -> Result<VendorSide> {
    let frame = registry.frame_record(vendor)?.frame().clone();
    let identity = frame.spec().name.clone().unwrap_or_default();
    let mut router = InboundRouter::new(&identity, config)?;

    let vendor = vendor.to_string();
    let deliveries = Rc::clone(deliveries);
    router.set_instance_handler(move |creative: &mut CreativeRouter| {
        let sink = Rc::clone(&deliveries);
        let vendor = vendor.clone();
        let transport_id = creative.transport_id().to_string();
        creative.register_events_listener(move |events: &[String]| {
            sink.borrow_mut().push(DeliveredBatch {
                vendor: vendor.clone(),
                transport_id: transport_id.clone(),
                events: events.to_vec(),
            });
        });
    });

    Ok(VendorSide { frame, router })
}

fn pump(vendors: &mut BTreeMap<String, VendorSide>) -> Result<usize> {
    let mut posted = 0;
    for side in vendors.values_mut() {
        for raw in side.frame.take_posted() {
            side.router.on_message(&raw)?;
            posted += 1;
        }
    }
    Ok(posted)
}
