//! Client-side state for the matters kanban board.
//!
//! [`MatterStatusStore`] holds the matters currently shown on the board,
//! [`KanbanTransitionController`] turns drag-and-drop gestures into optimistic
//! status changes, and [`StatusPersistenceGateway`] is the seam to the matters
//! API ([`HttpMatterGateway`] in production).

pub mod controller;
pub mod error;
pub mod gateway;
pub mod store;
pub mod types;

pub use controller::{ControllerOptions, KanbanTransitionController, ReconcileMode};
pub use error::{GatewayError, StoreError, TransitionError};
pub use gateway::{HttpMatterGateway, StatusPersistenceGateway};
pub use store::MatterStatusStore;
pub use types::{
    BoardEvent, DragEndEvent, DragLocation, NoOpReason, PendingTransition, TransitionOutcome,
    TransitionState,
};
