use crate::config::AssertionMode;
use crate::error::{Result, RouterError};

/// Most recent reports kept by a [`Reporter`].
pub const MAX_RETAINED_REPORTS: usize = 64;

/// Records configuration errors raised while routing.
///
/// Only the last [`MAX_RETAINED_REPORTS`] messages are kept; the total count
/// covers everything ever reported.
#[derive(Debug, Default)]
pub struct Reporter {
    mode: AssertionMode,
    reported: Vec<String>,
    total: usize,
}

impl Reporter {
    pub fn new(mode: AssertionMode) -> Self {
        Self {
            mode,
            reported: Vec::new(),
            total: 0,
        }
    }

    /// Log and record `message`. Under [`AssertionMode::Strict`] the message
    /// is also returned as [`RouterError::Configuration`].
    pub fn report(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        tracing::error!(%message, "Analytics frame configuration error");
        if self.reported.len() == MAX_RETAINED_REPORTS {
            self.reported.remove(0);
        }
        self.reported.push(message.clone());
        self.total += 1;

        match self.mode {
            AssertionMode::Report => Ok(()),
            AssertionMode::Strict => Err(RouterError::Configuration(message)),
        }
    }

    /// Retained reports, oldest first.
    pub fn reported(&self) -> &[String] {
        &self.reported
    }

    /// Number of reports since creation, including ones no longer retained.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn mode(&self) -> AssertionMode {
        self.mode
    }
}
