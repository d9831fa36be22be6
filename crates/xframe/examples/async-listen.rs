//! Vendor-side router fed from an async channel.
//!
//! Run with:
//!   cargo run --example async-listen --features async

use xframe::host::{FrameRegistry, MemoryDocument, OutboundTransport, TransportConfig};
use xframe::router::{InboundRouter, RouterConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = FrameRegistry::new(MemoryDocument::new());
    let config = TransportConfig {
        iframe: Some("https://vendor.example/frame.html".to_string()),
    };
    let transport = OutboundTransport::new(&mut registry, "vendor", &config)?;

    let frame = registry.frame_record("vendor")?.frame().clone();
    let name = frame.spec().name.clone().unwrap_or_default();
    let mut router = InboundRouter::new(&name, RouterConfig::default())?;
    router.set_instance_handler(|creative| {
        creative.register_events_listener(|events| eprintln!("events: {events:?}"));
    });

    registry.handle_frame_message(&router.ready_message()?)?;
    for event in ["load", "scroll", "unload"] {
        transport.send_via_iframe(&mut registry, event)?;
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    for raw in frame.take_posted() {
        tx.send(raw).await?;
    }
    drop(tx);

    let routed = router.listen(&mut rx).await?;
    eprintln!("Routed {routed} messages");

    transport.teardown(&mut registry)?;
    Ok(())
}
