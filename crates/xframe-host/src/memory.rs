//! In-process [`FrameHost`] that keeps frames and posted messages in memory.
//!
//! Used by the CLI simulator and by tests on both sides of the boundary.

use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::{FrameHost, FrameSpec, MessagePort};

/// Handle to a frame created by a [`MemoryDocument`].
///
/// Clones share the same outbox.
#[derive(Debug, Clone)]
pub struct MemoryFrame {
    inner: Rc<FrameState>,
}

#[derive(Debug)]
struct FrameState {
    id: usize,
    spec: FrameSpec,
    outbox: RefCell<Vec<String>>,
}

impl MemoryFrame {
    pub fn id(&self) -> usize {
        self.inner.id
    }

    pub fn spec(&self) -> &FrameSpec {
        &self.inner.spec
    }

    /// Messages posted to this frame so far.
    pub fn posted(&self) -> Vec<String> {
        self.inner.outbox.borrow().clone()
    }

    /// Drain messages posted since the last call.
    pub fn take_posted(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.outbox.borrow_mut())
    }
}

impl MessagePort for MemoryFrame {
    fn post_message(&self, message: &str) {
        self.inner.outbox.borrow_mut().push(message.to_string());
    }
}

/// A document body holding attached frames.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    created: usize,
    attached: Vec<MemoryFrame>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames currently attached, in attach order.
    pub fn attached_frames(&self) -> &[MemoryFrame] {
        &self.attached
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Frames ever created, attached or not.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Find an attached frame by one of its extra attributes.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<&MemoryFrame> {
        self.attached
            .iter()
            .find(|frame| frame.spec().attribute(name) == Some(value))
    }
}

impl FrameHost for MemoryDocument {
    type Frame = MemoryFrame;

    fn create_frame(&mut self, spec: &FrameSpec) -> MemoryFrame {
        self.created += 1;
        MemoryFrame {
            inner: Rc::new(FrameState {
                id: self.created,
                spec: spec.clone(),
                outbox: RefCell::new(Vec::new()),
            }),
        }
    }

    fn attach(&mut self, frame: &MemoryFrame) {
        if !self.attached.iter().any(|f| f.id() == frame.id()) {
            self.attached.push(frame.clone());
        }
    }

    fn remove(&mut self, frame: &MemoryFrame) {
        self.attached.retain(|f| f.id() != frame.id());
    }
}
