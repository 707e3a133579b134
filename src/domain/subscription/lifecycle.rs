//! Session phase state machine.
//!
//! Tracks purchase-service availability for the current app session.
//! Configuration happens at most once per session; a failed configuration is
//! terminal and the entitlement feature degrades to the backend-only signal.
//! Login/logout cycling happens within `Ready` and is tracked by the
//! identity binder, not here.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Purchase-service phase of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing attempted yet.
    Uninitialized,

    /// Configuration call in flight.
    Configuring,

    /// Purchase service configured and usable.
    Ready,

    /// Configuration failed. Terminal for this session.
    ConfigFailed,
}

impl SessionPhase {
    /// Returns true if purchase-service calls may be issued.
    pub fn purchase_service_available(&self) -> bool {
        matches!(self, SessionPhase::Ready)
    }
}

impl StateMachine for SessionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionPhase::*;
        matches!(
            (self, target),
            (Uninitialized, Configuring) | (Configuring, Ready) | (Configuring, ConfigFailed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionPhase::*;
        match self {
            Uninitialized => vec![Configuring],
            Configuring => vec![Ready, ConfigFailed],
            Ready => vec![],
            ConfigFailed => vec![],
        }
    }
}
