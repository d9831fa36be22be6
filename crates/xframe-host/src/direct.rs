//! Direct sends that bypass vendor frames.
//!
//! Mechanisms are tried in a fixed order, beacon, then credentialed XHR POST,
//! then a 1x1 image. Only mechanisms enabled in [`TransportOptions`] are
//! attempted and the first one reporting [`SendOutcome::Sent`] wins. Delivery
//! is best-effort: running out of mechanisms is logged, not returned as an
//! error.

use std::fmt;

use url::Url;

use crate::error::{HostError, Result};
use crate::traits::{RequestSender, SendOutcome};
use crate::transport::TransportOptions;

/// Content type that keeps the POST a CORS "simple request" (no preflight).
pub const XHR_CONTENT_TYPE: &str = "text/plain";

/// A direct-send mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanism {
    Beacon,
    XhrPost,
    Image,
}

impl Mechanism {
    /// Fallback order.
    pub const ORDER: [Mechanism; 3] = [Mechanism::Beacon, Mechanism::XhrPost, Mechanism::Image];

    pub fn as_str(self) -> &'static str {
        match self {
            Mechanism::Beacon => "beacon",
            Mechanism::XhrPost => "xhrpost",
            Mechanism::Image => "image",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an event left the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the vendor frame's queue.
    Queued,
    /// Sent directly with the given mechanism.
    Sent(Mechanism),
    /// No enabled mechanism succeeded.
    Dropped,
}

/// A credentialed POST with an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XhrRequest {
    pub url: Url,
    pub method: &'static str,
    pub with_credentials: bool,
    pub content_type: &'static str,
    pub body: String,
}

impl XhrRequest {
    pub fn credentialed_post(url: Url) -> Self {
        Self {
            url,
            method: "POST",
            with_credentials: true,
            content_type: XHR_CONTENT_TYPE,
            body: String::new(),
        }
    }
}

/// Parse `request` and require a secure scheme.
///
/// `https` is always accepted; plain `http` only for localhost.
pub fn assert_https_url(request: &str) -> Result<Url> {
    let url = Url::parse(request).map_err(|source| HostError::InvalidUrl {
        url: request.to_string(),
        source,
    })?;

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_localhost(&url) => Ok(url),
        _ => Err(HostError::InsecureUrl(request.to_string())),
    }
}

fn is_localhost(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => {
            host == "localhost" || host == "127.0.0.1" || host.ends_with(".localhost")
        }
        None => false,
    }
}

/// Send `request` with the first enabled mechanism that succeeds.
///
/// Fails only when the URL itself is rejected.
pub async fn send_direct<S: RequestSender>(
    sender: &S,
    request: &str,
    options: &TransportOptions,
) -> Result<Delivery> {
    let url = assert_https_url(request)?;

    for mechanism in Mechanism::ORDER {
        if !options.enables(mechanism) {
            continue;
        }

        let outcome = match mechanism {
            Mechanism::Beacon => sender.send_beacon(&url).await,
            Mechanism::XhrPost => {
                sender
                    .send_xhr(&XhrRequest::credentialed_post(url.clone()))
                    .await
            }
            Mechanism::Image => sender.send_image(&url).await,
        };

        match outcome {
            SendOutcome::Sent => {
                tracing::debug!(%mechanism, request, "Sent direct request");
                return Ok(Delivery::Sent(mechanism));
            }
            SendOutcome::Unsupported => {
                tracing::debug!(%mechanism, "Mechanism unsupported, falling back");
            }
            SendOutcome::Failed(reason) => {
                tracing::debug!(%mechanism, %reason, "Mechanism failed, falling back");
            }
        }
    }

    tracing::warn!(request, ?options, "Failed to send request");
    Ok(Delivery::Dropped)
}
