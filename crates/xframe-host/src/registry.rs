use std::collections::hash_map::Entry;
use std::collections::HashMap;

use xframe_wire::{decode_envelope, CallerId, FrameIdentity, IdAllocator, Sentinel, WireError, READY};

use crate::config::{RegistryConfig, SENTINEL_ATTRIBUTE};
use crate::error::{HostError, Result};
use crate::queue::MessageQueue;
use crate::traits::{FrameHost, FrameSpec};

/// A shared vendor frame and the queue feeding it.
#[derive(Debug)]
pub struct FrameRecord<F> {
    frame: F,
    sentinel: Sentinel,
    frame_url: String,
    usage_count: usize,
    queue: MessageQueue<F>,
}

impl<F> FrameRecord<F> {
    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    pub fn frame_url(&self) -> &str {
        &self.frame_url
    }

    /// Number of outstanding acquisitions. Always at least 1.
    pub fn usage_count(&self) -> usize {
        self.usage_count
    }

    pub fn queue(&self) -> &MessageQueue<F> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut MessageQueue<F> {
        &mut self.queue
    }
}

/// Result of a successful [`FrameRegistry::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Other users still hold the frame.
    StillInUse { remaining: usize },
    /// The last user released the frame; it was removed from the document.
    Destroyed,
}

/// Vendor-type keyed registry of shared frames.
///
/// One registry per document. Transports borrow it to acquire, send through,
/// and release frames; the registry is the only writer of frame existence and
/// usage counts.
pub struct FrameRegistry<H: FrameHost> {
    host: H,
    ids: IdAllocator,
    config: RegistryConfig,
    frames: HashMap<String, FrameRecord<H::Frame>>,
}

impl<H: FrameHost> FrameRegistry<H> {
    /// Create an empty registry with default config.
    pub fn new(host: H) -> Self {
        Self::with_config(host, RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(host: H, config: RegistryConfig) -> Self {
        Self::with_allocator(host, config, IdAllocator::new())
    }

    /// Create an empty registry drawing ids from `ids`.
    pub fn with_allocator(host: H, config: RegistryConfig, ids: IdAllocator) -> Self {
        Self {
            host,
            ids,
            config,
            frames: HashMap::new(),
        }
    }

    /// Allocate an id for a new sender.
    pub fn next_caller_id(&mut self) -> CallerId {
        self.ids.next_caller_id()
    }

    /// Check if a frame exists for a vendor type.
    pub fn has_frame(&self, vendor_type: &str) -> bool {
        self.frames.contains_key(vendor_type)
    }

    /// Get the record for a vendor type.
    pub fn frame_record(&self, vendor_type: &str) -> Result<&FrameRecord<H::Frame>> {
        self.frames
            .get(vendor_type)
            .ok_or_else(|| HostError::NonExistentFrame(vendor_type.to_string()))
    }

    /// Get the record for a vendor type mutably.
    pub fn frame_record_mut(&mut self, vendor_type: &str) -> Result<&mut FrameRecord<H::Frame>> {
        self.frames
            .get_mut(vendor_type)
            .ok_or_else(|| HostError::NonExistentFrame(vendor_type.to_string()))
    }

    /// Take a reference on the frame for `vendor_type`, creating and attaching
    /// it if this is the first user.
    ///
    /// `frame_url` is only used when the frame is created.
    pub fn acquire(&mut self, vendor_type: &str, frame_url: &str) -> Result<&FrameRecord<H::Frame>> {
        match self.frames.entry(vendor_type.to_string()) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.usage_count += 1;
                tracing::debug!(
                    vendor_type,
                    sentinel = %record.sentinel,
                    usage_count = record.usage_count,
                    "Reusing vendor frame"
                );
                Ok(record)
            }
            Entry::Vacant(entry) => {
                let record = create_frame_record(
                    &mut self.host,
                    &mut self.ids,
                    &self.config,
                    vendor_type,
                    frame_url,
                )?;
                Ok(entry.insert(record))
            }
        }
    }

    /// Drop a reference on the frame for `vendor_type`.
    ///
    /// When the last reference goes, the frame is removed from the document and
    /// any events still queued for it are discarded.
    pub fn release(&mut self, vendor_type: &str) -> Result<ReleaseOutcome> {
        let record = match self.frames.get_mut(vendor_type) {
            Some(record) if record.usage_count > 0 => record,
            _ => return Err(HostError::InconsistentState(vendor_type.to_string())),
        };

        record.usage_count -= 1;
        if record.usage_count > 0 {
            return Ok(ReleaseOutcome::StillInUse {
                remaining: record.usage_count,
            });
        }

        if let Some(record) = self.frames.remove(vendor_type) {
            let dropped = record.queue.pending_events();
            if dropped > 0 {
                tracing::debug!(
                    vendor_type,
                    sentinel = %record.sentinel,
                    dropped,
                    "Discarding events queued for released frame"
                );
            }
            self.host.remove(&record.frame);
            tracing::info!(vendor_type, sentinel = %record.sentinel, "Removed vendor frame");
        }
        Ok(ReleaseOutcome::Destroyed)
    }

    /// Forget every frame without touching the document.
    pub fn reset_all(&mut self) {
        self.frames.clear();
    }

    /// Handle a message posted back to the host by a vendor frame.
    ///
    /// A readiness signal carrying a known sentinel flushes that frame's
    /// queue. Everything else is ignored. Returns true if a queue was
    /// marked ready by this call.
    pub fn handle_frame_message(&mut self, raw: &str) -> Result<bool> {
        let envelope = match decode_envelope(raw) {
            Ok(envelope) => envelope,
            Err(WireError::MissingMarker) => return Ok(false),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring undecodable frame message");
                return Ok(false);
            }
        };

        if envelope.msg_type != READY {
            tracing::debug!(msg_type = %envelope.msg_type, "Ignoring frame message");
            return Ok(false);
        }

        let Some(record) = self
            .frames
            .values_mut()
            .find(|record| record.sentinel == envelope.sentinel)
        else {
            tracing::debug!(sentinel = %envelope.sentinel, "Readiness signal for unknown frame");
            return Ok(false);
        };

        if record.queue.is_ready() {
            return Ok(false);
        }
        tracing::info!(sentinel = %record.sentinel, "Vendor frame ready");
        record.queue.set_ready()?;
        Ok(true)
    }

    /// Sentinel of the frame for a vendor type, if one exists.
    pub fn sentinel_for(&self, vendor_type: &str) -> Option<&Sentinel> {
        self.frames.get(vendor_type).map(|record| &record.sentinel)
    }

    /// Number of live frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Vendor types with a live frame, sorted.
    pub fn vendor_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.frames.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

fn create_frame_record<H: FrameHost>(
    host: &mut H,
    ids: &mut IdAllocator,
    config: &RegistryConfig,
    vendor_type: &str,
    frame_url: &str,
) -> Result<FrameRecord<H::Frame>> {
    let sentinel = ids.next_sentinel();
    let mut identity = FrameIdentity::new(sentinel.clone());
    if let Some(script_src) = &config.bootstrap_script_url {
        identity = identity.with_script_src(script_src.clone());
    }

    let spec = FrameSpec {
        src: frame_url.to_string(),
        name: Some(identity.to_payload()?),
        sandbox: config.frame_sandbox.clone(),
        attributes: vec![(SENTINEL_ATTRIBUTE.to_string(), sentinel.to_string())],
        hidden: true,
    };
    let frame = host.create_frame(&spec);
    host.attach(&frame);

    tracing::info!(vendor_type, sentinel = %sentinel, frame_url, "Created vendor frame");

    Ok(FrameRecord {
        queue: MessageQueue::new(sentinel.clone(), frame.clone()),
        frame,
        sentinel,
        frame_url: frame_url.to_string(),
        usage_count: 1,
    })
}
