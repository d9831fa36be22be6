use std::future::Future;

use url::Url;

use crate::direct::XhrRequest;

/// The send side of a frame's message channel.
///
/// For a browser frame this is `contentWindow.postMessage`.
pub trait MessagePort {
    fn post_message(&self, message: &str);
}

/// Everything the host needs to build a frame element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub src: String,
    pub name: Option<String>,
    pub sandbox: String,
    /// Extra attributes, in insertion order.
    pub attributes: Vec<(String, String)>,
    pub hidden: bool,
}

impl FrameSpec {
    /// Look up an extra attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The document that owns frame elements.
pub trait FrameHost {
    type Frame: MessagePort + Clone;

    /// Create a frame element. It is not part of the document until attached.
    fn create_frame(&mut self, spec: &FrameSpec) -> Self::Frame;

    /// Append the frame to the document body.
    fn attach(&mut self, frame: &Self::Frame);

    /// Remove the frame from the document.
    fn remove(&mut self, frame: &Self::Frame);
}

/// Completion signal of one direct-send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The environment lacks the mechanism.
    Unsupported,
    Failed(String),
}

/// Fire-and-forget network mechanisms of the embedding environment.
pub trait RequestSender {
    fn send_beacon(&self, url: &Url) -> impl Future<Output = SendOutcome>;

    fn send_xhr(&self, request: &XhrRequest) -> impl Future<Output = SendOutcome>;

    /// Load a 1x1 image from `url`.
    fn send_image(&self, url: &Url) -> impl Future<Output = SendOutcome>;
}
