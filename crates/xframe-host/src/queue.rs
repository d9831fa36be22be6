use std::collections::HashMap;

use xframe_wire::{encode_envelope, CallerId, Envelope, EventMessage, Sentinel};

use crate::error::Result;
use crate::traits::MessagePort;

/// Per-frame buffer of events waiting for the frame to become ready.
///
/// Events are grouped by sender. Before readiness, [`enqueue`](Self::enqueue)
/// only appends. [`set_ready`](Self::set_ready) flushes everything collected so
/// far as one batch; from then on every enqueue is flushed immediately.
#[derive(Debug)]
pub struct MessageQueue<P> {
    sentinel: Sentinel,
    port: P,
    ready: bool,
    pending: HashMap<CallerId, Vec<String>>,
}

impl<P: MessagePort> MessageQueue<P> {
    /// Create a queue for the frame identified by `sentinel`, posting through `port`.
    pub fn new(sentinel: Sentinel, port: P) -> Self {
        Self {
            sentinel,
            port,
            ready: false,
            pending: HashMap::new(),
        }
    }

    /// Buffer `payload` for `sender`, flushing right away if the frame is ready.
    pub fn enqueue(&mut self, sender: &CallerId, payload: impl Into<String>) -> Result<()> {
        self.pending
            .entry(sender.clone())
            .or_default()
            .push(payload.into());

        if self.ready {
            self.flush()?;
        } else {
            tracing::debug!(
                sentinel = %self.sentinel,
                sender = %sender,
                senders = self.pending.len(),
                "Queued event until frame is ready"
            );
        }
        Ok(())
    }

    /// Mark the frame ready and flush all pending events.
    ///
    /// Calling this again has no effect.
    pub fn set_ready(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        self.ready = true;
        self.flush()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of senders with at least one pending event.
    pub fn queue_size(&self) -> usize {
        self.pending.len()
    }

    /// Pending events for `sender`, oldest first.
    pub fn messages_for(&self, sender: &CallerId) -> &[String] {
        self.pending.get(sender).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total pending events across all senders.
    pub fn pending_events(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let senders = self.pending.len();
        let events: Vec<EventMessage> = self
            .pending
            .drain()
            .flat_map(|(sender, messages)| {
                let transport_id = sender.to_transport_id();
                messages
                    .into_iter()
                    .map(move |message| EventMessage::new(transport_id.clone(), message))
            })
            .collect();
        let count = events.len();

        let wire = encode_envelope(&Envelope::event_batch(self.sentinel.clone(), events))?;
        self.port.post_message(&wire);

        tracing::debug!(
            sentinel = %self.sentinel,
            senders,
            events = count,
            "Flushed event batch to frame"
        );
        Ok(())
    }
}
