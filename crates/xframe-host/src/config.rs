/// Sandbox flags applied to shared vendor frames.
pub const DEFAULT_FRAME_SANDBOX: &str = "allow-scripts";

/// Attribute carrying the frame's sentinel on the frame element.
pub const SENTINEL_ATTRIBUTE: &str = "data-amp-3p-sentinel";

/// Controls how the registry builds vendor frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Script the vendor frame loads to bootstrap its router. Written into the
    /// frame identity payload as `scriptSrc` when set.
    pub bootstrap_script_url: Option<String>,
    /// Value of the frame's `sandbox` attribute.
    pub frame_sandbox: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            bootstrap_script_url: None,
            frame_sandbox: DEFAULT_FRAME_SANDBOX.to_string(),
        }
    }
}
