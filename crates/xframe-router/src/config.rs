/// What happens when vendor code is misconfigured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssertionMode {
    /// Log and record the error, keep routing. Production behaviour.
    #[default]
    Report,
    /// Log and record the error, then fail the current message.
    Strict,
}

/// Controls router behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterConfig {
    pub assertion_mode: AssertionMode,
}

impl RouterConfig {
    /// Config for development and tests: configuration errors fail fast.
    pub fn strict() -> Self {
        Self {
            assertion_mode: AssertionMode::Strict,
        }
    }
}
