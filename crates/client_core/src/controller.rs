use std::{collections::HashMap, sync::Arc, time::Duration};

use shared::domain::{MatterId, MatterStatus};
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{GatewayError, StoreError, TransitionError},
    gateway::StatusPersistenceGateway,
    store::MatterStatusStore,
    types::{
        BoardEvent, DragEndEvent, DragLocation, NoOpReason, PendingTransition, TransitionOutcome,
        TransitionState,
    },
};

pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

/// How overlapping drags of the same matter are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Gateway calls for one matter run in drag order. A failure restores the
    /// matter's last persisted status, and only when no newer drag exists.
    #[default]
    Serialized,
    /// Every failure restores the status captured at drag time, even if a
    /// later drag of the same matter has since moved the card.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub mode: ReconcileMode,
    pub persist_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::default(),
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }
}

/// Per-matter bookkeeping while at least one transition is in flight.
struct MatterLane {
    latest_generation: u64,
    persisted: MatterStatus,
    in_flight: usize,
    /// Resolves once the most recently queued transition has persisted.
    tail: Option<oneshot::Receiver<()>>,
}

impl MatterLane {
    fn new(persisted: MatterStatus) -> Self {
        Self {
            latest_generation: 0,
            persisted,
            in_flight: 0,
            tail: None,
        }
    }
}

struct LaneTicket {
    generation: u64,
    after: Option<oneshot::Receiver<()>>,
    // Dropping it releases the next transition of the same matter.
    _done: oneshot::Sender<()>,
}

pub struct KanbanTransitionController {
    store: Arc<MatterStatusStore>,
    gateway: Arc<dyn StatusPersistenceGateway>,
    options: ControllerOptions,
    lanes: Mutex<HashMap<MatterId, MatterLane>>,
    events: broadcast::Sender<BoardEvent>,
}

impl KanbanTransitionController {
    pub fn new(store: Arc<MatterStatusStore>, gateway: Arc<dyn StatusPersistenceGateway>) -> Self {
        Self::with_options(store, gateway, ControllerOptions::default())
    }

    pub fn with_options(
        store: Arc<MatterStatusStore>,
        gateway: Arc<dyn StatusPersistenceGateway>,
        options: ControllerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            store,
            gateway,
            options,
            lanes: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn store(&self) -> &Arc<MatterStatusStore> {
        &self.store
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Applies a finished drag: optimistic store update, then persistence,
    /// then commit or rollback. Failures are reported to the store's error
    /// slot and returned in the outcome, never as `Err`.
    pub async fn handle_drag_end(&self, event: DragEndEvent) -> TransitionOutcome {
        let Some(destination) = event.destination.as_ref() else {
            debug!(draggable_id = %event.draggable_id, "drop outside any column ignored");
            return TransitionOutcome::Ignored(NoOpReason::NoDestination);
        };
        if *destination == event.source {
            return TransitionOutcome::Ignored(NoOpReason::SameSlot);
        }

        let (matter_id, to_status) = match self.resolve(&event.draggable_id, destination).await {
            Ok(resolved) => resolved,
            Err(error) => {
                self.report(&error).await;
                return TransitionOutcome::Rejected(error);
            }
        };
        let (from_status, ticket) = match self.apply_optimistic(matter_id, to_status).await {
            Ok(applied) => applied,
            Err(StoreError::MatterNotFound(_)) => {
                let error = TransitionError::MatterNotFound {
                    draggable_id: event.draggable_id.clone(),
                };
                self.report(&error).await;
                return TransitionOutcome::Rejected(error);
            }
        };
        let transition = PendingTransition {
            matter_id,
            from_status,
            to_status,
            origin_index: event.source.index,
            destination_index: destination.index,
        };
        self.emit(BoardEvent::StatusChanged {
            matter_id,
            status: to_status,
            state: TransitionState::Pending,
        });

        match ticket {
            Some(ticket) => self.persist_serialized(transition, ticket).await,
            None => self.persist_legacy(transition).await,
        }
    }

    async fn resolve(
        &self,
        draggable_id: &str,
        destination: &DragLocation,
    ) -> Result<(MatterId, MatterStatus), TransitionError> {
        let not_found = || TransitionError::MatterNotFound {
            draggable_id: draggable_id.to_string(),
        };
        let matter_id = draggable_id
            .trim()
            .parse::<i64>()
            .map(MatterId)
            .map_err(|_| not_found())?;
        if self.store.status_of(matter_id).await.is_none() {
            return Err(not_found());
        }
        let to_status = destination.droppable_id.parse::<MatterStatus>().map_err(|_| {
            TransitionError::UnknownColumn {
                droppable_id: destination.droppable_id.clone(),
            }
        })?;
        Ok((matter_id, to_status))
    }

    /// Writes the new status into the store before any network call. In
    /// serialized mode this happens under the lane lock, which also fixes the
    /// transition's place in the matter's persistence queue.
    async fn apply_optimistic(
        &self,
        matter_id: MatterId,
        to_status: MatterStatus,
    ) -> Result<(MatterStatus, Option<LaneTicket>), StoreError> {
        match self.options.mode {
            ReconcileMode::Legacy => {
                let previous = self.store.set_status(matter_id, to_status).await?;
                Ok((previous, None))
            }
            ReconcileMode::Serialized => {
                let mut lanes = self.lanes.lock().await;
                let previous = self.store.set_status(matter_id, to_status).await?;
                let lane = lanes
                    .entry(matter_id)
                    .or_insert_with(|| MatterLane::new(previous));
                lane.latest_generation += 1;
                lane.in_flight += 1;
                let (done_tx, done_rx) = oneshot::channel();
                let after = lane.tail.replace(done_rx);
                Ok((
                    previous,
                    Some(LaneTicket {
                        generation: lane.latest_generation,
                        after,
                        _done: done_tx,
                    }),
                ))
            }
        }
    }

    async fn persist_legacy(&self, transition: PendingTransition) -> TransitionOutcome {
        match self.persist(&transition).await {
            Ok(()) => self.committed(transition),
            Err(error) => {
                self.roll_back(transition.matter_id, transition.from_status)
                    .await;
                let error = TransitionError::Persistence(error);
                self.report(&error).await;
                TransitionOutcome::RolledBack { transition, error }
            }
        }
    }

    async fn persist_serialized(
        &self,
        transition: PendingTransition,
        mut ticket: LaneTicket,
    ) -> TransitionOutcome {
        if let Some(previous) = ticket.after.take() {
            // Err only means the sender was dropped, which is the signal.
            let _ = previous.await;
        }
        let result = self.persist(&transition).await;

        let mut lanes = self.lanes.lock().await;
        let Some(lane) = lanes.get_mut(&transition.matter_id) else {
            warn!(matter_id = %transition.matter_id, "transition lane vanished before reconciliation");
            return match result {
                Ok(()) => self.committed(transition),
                Err(error) => TransitionOutcome::Superseded {
                    transition,
                    error: TransitionError::Persistence(error),
                },
            };
        };
        let superseded = lane.latest_generation != ticket.generation;
        let restore_to = lane.persisted;
        if result.is_ok() {
            lane.persisted = transition.to_status;
        }
        lane.in_flight -= 1;
        if lane.in_flight == 0 {
            lanes.remove(&transition.matter_id);
        }

        match result {
            Ok(()) => {
                drop(lanes);
                self.committed(transition)
            }
            Err(error) if superseded => {
                drop(lanes);
                debug!(
                    matter_id = %transition.matter_id,
                    "failed transition superseded by a newer drag; leaving card in place"
                );
                let error = TransitionError::Persistence(error);
                self.report(&error).await;
                TransitionOutcome::Superseded { transition, error }
            }
            Err(error) => {
                self.roll_back(transition.matter_id, restore_to).await;
                drop(lanes);
                let error = TransitionError::Persistence(error);
                self.report(&error).await;
                TransitionOutcome::RolledBack { transition, error }
            }
        }
    }

    async fn persist(&self, transition: &PendingTransition) -> Result<(), GatewayError> {
        let call = self
            .gateway
            .update_status(transition.matter_id, transition.to_status);
        match tokio::time::timeout(self.options.persist_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.options.persist_timeout)),
        }
    }

    fn committed(&self, transition: PendingTransition) -> TransitionOutcome {
        info!(
            matter_id = %transition.matter_id,
            from = %transition.from_status,
            to = %transition.to_status,
            "matter status transition committed"
        );
        self.emit(BoardEvent::StatusChanged {
            matter_id: transition.matter_id,
            status: transition.to_status,
            state: TransitionState::Committed,
        });
        TransitionOutcome::Committed(transition)
    }

    async fn roll_back(&self, matter_id: MatterId, status: MatterStatus) {
        match self.store.set_status(matter_id, status).await {
            Ok(_) => self.emit(BoardEvent::RolledBack { matter_id, status }),
            Err(error) => {
                warn!(matter_id = %matter_id, %error, "matter left the board before rollback")
            }
        }
    }

    async fn report(&self, error: &TransitionError) {
        match error {
            TransitionError::Persistence(cause) if cause.is_http() => {
                warn!(%cause, "matter status update rejected by server")
            }
            TransitionError::Persistence(cause) => {
                warn!(%cause, "network error while updating matter status")
            }
            other => info!(error = %other, "drag rejected"),
        }
        let message = error.user_message();
        self.store.report_error(message).await;
        self.emit(BoardEvent::Error(message.to_string()));
    }

    fn emit(&self, event: BoardEvent) {
        // No subscribers is fine; the store is the source of truth.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
