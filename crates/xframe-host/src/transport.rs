use serde::{Deserialize, Serialize};
use xframe_wire::CallerId;

use crate::direct::{send_direct, Delivery, Mechanism};
use crate::error::{HostError, Result};
use crate::registry::{FrameRegistry, ReleaseOutcome};
use crate::traits::{FrameHost, RequestSender};

/// Per-tag configuration, as found in the vendor's analytics config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// URL of the vendor frame. When set, the transport shares that vendor's frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframe: Option<String>,
}

/// Which delivery mechanisms a single request may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    pub iframe: bool,
    pub beacon: bool,
    pub xhrpost: bool,
    pub image: bool,
}

impl TransportOptions {
    /// Options routing every request through the vendor frame.
    pub fn iframe() -> Self {
        Self {
            iframe: true,
            ..Self::default()
        }
    }

    pub fn enables(&self, mechanism: Mechanism) -> bool {
        match mechanism {
            Mechanism::Beacon => self.beacon,
            Mechanism::XhrPost => self.xhrpost,
            Mechanism::Image => self.image,
        }
    }
}

/// One creative's handle on an analytics vendor.
///
/// Transports configured with a frame URL hold one acquisition on the
/// vendor's shared frame until [`teardown`](Self::teardown).
#[derive(Debug)]
pub struct OutboundTransport {
    vendor_type: String,
    caller_id: CallerId,
    frame_url: Option<String>,
}

impl OutboundTransport {
    /// Create a transport for `vendor_type`, acquiring the vendor frame if
    /// `config.iframe` is set.
    pub fn new<H: FrameHost>(
        registry: &mut FrameRegistry<H>,
        vendor_type: impl Into<String>,
        config: &TransportConfig,
    ) -> Result<Self> {
        let vendor_type = vendor_type.into();
        let caller_id = registry.next_caller_id();

        if let Some(frame_url) = &config.iframe {
            registry.acquire(&vendor_type, frame_url)?;
        }

        tracing::debug!(
            vendor_type = %vendor_type,
            caller_id = %caller_id,
            iframe = config.iframe.is_some(),
            "Created outbound transport"
        );

        Ok(Self {
            vendor_type,
            caller_id,
            frame_url: config.iframe.clone(),
        })
    }

    pub fn caller_id(&self) -> &CallerId {
        &self.caller_id
    }

    pub fn vendor_type(&self) -> &str {
        &self.vendor_type
    }

    pub fn frame_url(&self) -> Option<&str> {
        self.frame_url.as_deref()
    }

    /// Send `event` by the mechanisms `options` allow.
    ///
    /// With `options.iframe`, the event is queued on the vendor frame;
    /// otherwise `event` is treated as a request URL for the direct-send chain.
    pub async fn send_event<H: FrameHost, S: RequestSender>(
        &self,
        registry: &mut FrameRegistry<H>,
        sender: &S,
        event: &str,
        options: &TransportOptions,
    ) -> Result<Delivery> {
        if options.iframe {
            self.send_via_iframe(registry, event)?;
            return Ok(Delivery::Queued);
        }
        send_direct(sender, event, options).await
    }

    /// Queue `event` on the vendor frame under this transport's caller id.
    pub fn send_via_iframe<H: FrameHost>(
        &self,
        registry: &mut FrameRegistry<H>,
        event: &str,
    ) -> Result<()> {
        let record = registry.frame_record_mut(&self.vendor_type)?;
        record.queue_mut().enqueue(&self.caller_id, event)
    }

    /// Release this transport's frame acquisition.
    pub fn teardown<H: FrameHost>(self, registry: &mut FrameRegistry<H>) -> Result<ReleaseOutcome> {
        if self.frame_url.is_none() {
            return Err(HostError::NotAcquired(self.caller_id));
        }
        tracing::debug!(
            vendor_type = %self.vendor_type,
            caller_id = %self.caller_id,
            "Tearing down outbound transport"
        );
        registry.release(&self.vendor_type)
    }
}
