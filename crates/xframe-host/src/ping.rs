//! One-shot ping frames for allow-listed requests.
//!
//! Unrelated to the shared vendor frames: each ping loads `request` in its own
//! hidden frame, which is removed a fixed time after it finishes loading.

use std::time::Duration;

use url::Url;

use crate::direct::assert_https_url;
use crate::error::{HostError, Result};
use crate::traits::{FrameHost, FrameSpec};

/// How long a ping frame stays attached after its load completes.
pub const PING_FRAME_LINGER: Duration = Duration::from_secs(5);

/// Marker attribute set on ping frames.
pub const PING_ATTRIBUTE: &str = "amp-analytics";

/// Sandbox flags applied to ping frames.
pub const PING_SANDBOX: &str = "allow-scripts allow-same-origin";

/// An attached ping frame awaiting retirement.
#[derive(Debug)]
pub struct PingFrame<F> {
    frame: F,
    request: Url,
}

impl<F> PingFrame<F> {
    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn request(&self) -> &Url {
        &self.request
    }

    /// Remove the frame `linger` after its load (or error) completed.
    ///
    /// Call once the host observed the frame's load event.
    pub async fn retire<H>(self, host: &mut H, linger: Duration)
    where
        H: FrameHost<Frame = F>,
    {
        tokio::time::sleep(linger).await;
        host.remove(&self.frame);
        tracing::debug!(request = %self.request, "Removed ping frame");
    }
}

/// Load `request` in a new hidden frame attached to `host`.
///
/// The request must be HTTPS and must not share the document's origin.
pub fn send_ping_iframe<H: FrameHost>(
    host: &mut H,
    request: &str,
    document_url: &str,
) -> Result<PingFrame<H::Frame>> {
    let url = assert_https_url(request)?;
    let document = Url::parse(document_url).map_err(|source| HostError::InvalidUrl {
        url: document_url.to_string(),
        source,
    })?;

    if url.origin() == document.origin() {
        return Err(HostError::SameOriginPing(request.to_string()));
    }

    let spec = FrameSpec {
        src: url.to_string(),
        name: None,
        sandbox: PING_SANDBOX.to_string(),
        attributes: vec![(PING_ATTRIBUTE.to_string(), String::new())],
        hidden: true,
    };
    let frame = host.create_frame(&spec);
    host.attach(&frame);
    tracing::debug!(request = %url, "Attached ping frame");

    Ok(PingFrame {
        frame,
        request: url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    const DOCUMENT: &str = "https://publisher.example/article.html";

    #[test]
    fn attaches_sandboxed_hidden_frame() {
        let mut doc = MemoryDocument::new();
        let ping = send_ping_iframe(&mut doc, "https://tracker.example/p?x=1", DOCUMENT).unwrap();

        assert_eq!(doc.attached_count(), 1);
        let spec = ping.frame().spec();
        assert_eq!(spec.src, "https://tracker.example/p?x=1");
        assert_eq!(spec.sandbox, "allow-scripts allow-same-origin");
        assert_eq!(spec.attribute(PING_ATTRIBUTE), Some(""));
        assert!(spec.hidden);
        assert_eq!(ping.request().host_str(), Some("tracker.example"));
    }

    #[test]
    fn same_origin_request_is_rejected_before_creation() {
        let mut doc = MemoryDocument::new();
        let err = send_ping_iframe(&mut doc, "https://publisher.example/ping", DOCUMENT)
            .unwrap_err();

        assert!(matches!(err, HostError::SameOriginPing(_)));
        assert_eq!(doc.created_count(), 0);
    }

    #[test]
    fn insecure_request_is_rejected() {
        let mut doc = MemoryDocument::new();
        let err = send_ping_iframe(&mut doc, "http://tracker.example/p", DOCUMENT).unwrap_err();
        assert!(matches!(err, HostError::InsecureUrl(_)));
        assert_eq!(doc.created_count(), 0);
    }

    #[tokio::test]
    async fn retire_removes_frame_after_linger() {
        let mut doc = MemoryDocument::new();
        let ping = send_ping_iframe(&mut doc, "https://tracker.example/p", DOCUMENT).unwrap();
        assert_eq!(doc.attached_count(), 1);

        ping.retire(&mut doc, Duration::from_millis(1)).await;
        assert_eq!(doc.attached_count(), 0);
    }
}
