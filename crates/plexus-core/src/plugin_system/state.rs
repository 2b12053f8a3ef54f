use std::fmt;

use serde::Serialize;

/// Lifecycle state of a plugin unit.
///
/// The variants are declared in lifecycle order; the derived `Ord` is that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PluginState {
    /// Metadata could not be read
    Invalid,
    /// Metadata was parsed
    Read,
    /// Every required provider was found and is itself resolved
    Resolved,
    /// The backend loaded the unit's code
    Loaded,
    /// The unit's own initialization ran
    Initialized,
    /// Extensions of every unit were initialized
    Running,
    /// The unit was asked to shut down
    Stopped,
    /// The unit was torn down
    Deleted,
}

impl PluginState {
    /// All states, in lifecycle order
    pub const ALL: [PluginState; 8] = [
        PluginState::Invalid,
        PluginState::Read,
        PluginState::Resolved,
        PluginState::Loaded,
        PluginState::Initialized,
        PluginState::Running,
        PluginState::Stopped,
        PluginState::Deleted,
    ];

    /// The state one step further along, if any
    pub fn next(self) -> Option<PluginState> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// The state one step back, if any
    pub fn previous(self) -> Option<PluginState> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Whether a unit in this state may move to `target`.
    ///
    /// Only single forward steps are allowed, plus `Deleted` from anywhere.
    pub fn can_transition_to(self, target: PluginState) -> bool {
        target == PluginState::Deleted || self.next() == Some(target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginState::Invalid => "invalid",
            PluginState::Read => "read",
            PluginState::Resolved => "resolved",
            PluginState::Loaded => "loaded",
            PluginState::Initialized => "initialized",
            PluginState::Running => "running",
            PluginState::Stopped => "stopped",
            PluginState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
