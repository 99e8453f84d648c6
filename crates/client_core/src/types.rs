use serde::{Deserialize, Serialize};
use shared::domain::{MatterId, MatterStatus};

use crate::error::TransitionError;

/// A column slot as reported by the drag-and-drop layer. `droppable_id` is the
/// column's status string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragLocation {
    pub droppable_id: String,
    pub index: usize,
}

impl DragLocation {
    pub fn new(status: MatterStatus, index: usize) -> Self {
        Self {
            droppable_id: status.as_str().to_string(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEndEvent {
    pub draggable_id: String,
    pub source: DragLocation,
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

impl DragEndEvent {
    pub fn new(matter_id: MatterId, source: DragLocation, destination: Option<DragLocation>) -> Self {
        Self {
            draggable_id: matter_id.to_string(),
            source,
            destination,
        }
    }
}

/// One optimistic status change, alive until the gateway call settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub matter_id: MatterId,
    pub from_status: MatterStatus,
    pub to_status: MatterStatus,
    pub origin_index: usize,
    pub destination_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Pending,
    Committed,
    RolledBack,
    /// Persistence failed but a newer drag of the same matter owns the card.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    NoDestination,
    SameSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Ignored(NoOpReason),
    Rejected(TransitionError),
    Committed(PendingTransition),
    RolledBack {
        transition: PendingTransition,
        error: TransitionError,
    },
    Superseded {
        transition: PendingTransition,
        error: TransitionError,
    },
}

impl TransitionOutcome {
    pub fn state(&self) -> Option<TransitionState> {
        match self {
            TransitionOutcome::Ignored(_) | TransitionOutcome::Rejected(_) => None,
            TransitionOutcome::Committed(_) => Some(TransitionState::Committed),
            TransitionOutcome::RolledBack { .. } => Some(TransitionState::RolledBack),
            TransitionOutcome::Superseded { .. } => Some(TransitionState::Superseded),
        }
    }

    pub fn error(&self) -> Option<&TransitionError> {
        match self {
            TransitionOutcome::Rejected(error)
            | TransitionOutcome::RolledBack { error, .. }
            | TransitionOutcome::Superseded { error, .. } => Some(error),
            TransitionOutcome::Ignored(_) | TransitionOutcome::Committed(_) => None,
        }
    }
}

/// Change notifications for whatever renders the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    StatusChanged {
        matter_id: MatterId,
        status: MatterStatus,
        state: TransitionState,
    },
    RolledBack {
        matter_id: MatterId,
        status: MatterStatus,
    },
    Error(String),
}
