//! Service state definitions.

use std::fmt;

/// Rate service operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// The first refresh pass has not completed yet.
    Starting,
    /// The cache is populated and the refresh worker is scheduled.
    Running,
    /// Shutdown was requested; an in-flight pass may still be finishing.
    ShuttingDown,
    Stopped,
}

impl ServiceState {
    /// Check if the service is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceState::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::ShuttingDown => "shutting_down",
            ServiceState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
