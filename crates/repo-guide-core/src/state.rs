//! UI-agnostic application state types
//!
//! This module contains data structures that are shared between the terminal
//! UI and the headless commands and don't depend on any specific UI framework.

/// Where the controller is in the analyze / ask lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// `/analyze` is streaming.
    Analyzing,
    /// Analysis reached end-of-stream; questions may be asked.
    Ready,
    /// Analysis aborted with a transport or decode error.
    Failed,
    /// `/ask` is in flight.
    Asking,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Analyzing | Phase::Asking)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Analyzing => "analyzing",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
            Phase::Asking => "asking",
        }
    }
}
