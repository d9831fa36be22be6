//! Two creatives share one vendor frame.
//!
//! Run with:
//!   cargo run --example shared-frame
//!
//! Events queued before the frame is ready arrive in a single batch; later
//! events are posted one envelope at a time.

use xframe::host::{FrameRegistry, MemoryDocument, OutboundTransport, TransportConfig};
use xframe::router::{InboundRouter, RouterConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = FrameRegistry::new(MemoryDocument::new());
    let config = TransportConfig {
        iframe: Some("https://vendor.example/frame.html".to_string()),
    };

    let first = OutboundTransport::new(&mut registry, "vendor", &config)?;
    let second = OutboundTransport::new(&mut registry, "vendor", &config)?;

    let frame = registry.frame_record("vendor")?.frame().clone();
    let name = frame.spec().name.clone().unwrap_or_default();
    let mut router = InboundRouter::new(&name, RouterConfig::default())?;
    router.set_instance_handler(|creative| {
        let id = creative.transport_id().to_string();
        eprintln!("New analytics instance {id}");
        creative.register_events_listener(move |events| {
            eprintln!("[{id}] {}", events.join(", "));
        });
    });

    first.send_via_iframe(&mut registry, "impression")?;
    second.send_via_iframe(&mut registry, "impression")?;
    first.send_via_iframe(&mut registry, "click")?;

    // The frame announces itself once its router is set up.
    registry.handle_frame_message(&router.ready_message()?)?;
    second.send_via_iframe(&mut registry, "visible")?;

    for raw in frame.take_posted() {
        eprintln!("Frame received {} bytes", raw.len());
        router.on_message(&raw)?;
    }

    first.teardown(&mut registry)?;
    second.teardown(&mut registry)?;
    eprintln!("Frames left attached: {}", registry.host().attached_count());
    Ok(())
}
