use std::fmt;

use xframe_wire::TransportId;

use crate::error::{Result, RouterError};

type EventsListener = Box<dyn FnMut(&[String])>;

/// One creative's event stream inside the vendor frame.
///
/// Batches that arrive before a listener is registered are kept and replayed,
/// one callback per buffered batch, when the listener arrives.
pub struct CreativeRouter {
    transport_id: TransportId,
    listener: Option<EventsListener>,
    backlog: Vec<Vec<String>>,
    delivered_batches: usize,
}

impl CreativeRouter {
    pub fn new(transport_id: TransportId) -> Self {
        Self {
            transport_id,
            listener: None,
            backlog: Vec::new(),
            delivered_batches: 0,
        }
    }

    pub fn transport_id(&self) -> &TransportId {
        &self.transport_id
    }

    /// Register the vendor's events callback, replacing any previous one.
    pub fn register_events_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&[String]) + 'static,
    {
        let mut listener: EventsListener = Box::new(listener);
        let backlog = std::mem::take(&mut self.backlog);
        if !backlog.is_empty() {
            tracing::debug!(
                transport_id = %self.transport_id,
                batches = backlog.len(),
                "Replaying buffered batches to new listener"
            );
        }
        for batch in &backlog {
            listener(batch.as_slice());
            self.delivered_batches += 1;
        }
        self.listener = Some(listener);
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Hand one batch to the listener.
    ///
    /// Without a listener the batch is buffered and
    /// [`RouterError::NoListener`] is returned for the caller to report.
    pub fn dispatch(&mut self, events: Vec<String>) -> Result<()> {
        match self.listener.as_mut() {
            Some(listener) => {
                listener(events.as_slice());
                self.delivered_batches += 1;
                Ok(())
            }
            None => {
                self.buffer(events);
                Err(RouterError::NoListener(self.transport_id.clone()))
            }
        }
    }

    /// Keep `events` until a listener registers.
    pub(crate) fn buffer(&mut self, events: Vec<String>) {
        self.backlog.push(events);
    }

    /// Batches waiting for a listener.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Batches handed to a listener so far.
    pub fn delivered_batches(&self) -> usize {
        self.delivered_batches
    }
}

impl fmt::Debug for CreativeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreativeRouter")
            .field("transport_id", &self.transport_id)
            .field("has_listener", &self.listener.is_some())
            .field("backlog", &self.backlog.len())
            .field("delivered_batches", &self.delivered_batches)
            .finish()
    }
}
