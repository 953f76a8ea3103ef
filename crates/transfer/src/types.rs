use serde::{Deserialize, Serialize};

/// Lifecycle of one transfer session.
///
/// `Idle → Initializing → Uploading → Finalizing → Completed`, with
/// `Failed` reachable from the three active states. `Completed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    #[default]
    Idle,
    Initializing,
    Uploading,
    Finalizing,
    Completed,
    Failed,
}

impl TransferState {
    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` while a network exchange is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Initializing | Self::Uploading | Self::Finalizing)
    }

    /// Whether `self → next` is a legal forward transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Idle, Initializing)
                | (Initializing, Uploading)
                | (Uploading, Finalizing)
                | (Finalizing, Completed)
                | (Initializing | Uploading | Finalizing, Failed)
        )
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Uploading => "uploading",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
