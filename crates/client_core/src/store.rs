use std::collections::BTreeMap;

use shared::domain::{Matter, MatterId, MatterStatus};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// In-memory projection of the matters on one board.
///
/// Owned by the view that loads it and shared with the controller behind an
/// `Arc`. Every method takes the lock once, so readers never observe a
/// half-applied change.
#[derive(Default)]
pub struct MatterStatusStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    matters: Vec<Matter>,
    last_error: Option<String>,
}

impl MatterStatusStore {
    pub fn new(matters: Vec<Matter>) -> Self {
        Self {
            inner: RwLock::new(StoreState {
                matters,
                last_error: None,
            }),
        }
    }

    pub async fn all(&self) -> Vec<Matter> {
        self.inner.read().await.matters.clone()
    }

    pub async fn get(&self, matter_id: MatterId) -> Option<Matter> {
        self.inner
            .read()
            .await
            .matters
            .iter()
            .find(|m| m.id == matter_id)
            .cloned()
    }

    pub async fn status_of(&self, matter_id: MatterId) -> Option<MatterStatus> {
        self.inner
            .read()
            .await
            .matters
            .iter()
            .find(|m| m.id == matter_id)
            .map(|m| m.status)
    }

    pub async fn group_by_status(&self) -> BTreeMap<MatterStatus, Vec<Matter>> {
        group_by_status(&self.inner.read().await.matters)
    }

    /// Column and index the matter's card currently occupies.
    pub async fn position_of(&self, matter_id: MatterId) -> Option<(MatterStatus, usize)> {
        let guard = self.inner.read().await;
        let status = guard.matters.iter().find(|m| m.id == matter_id)?.status;
        let index = guard
            .matters
            .iter()
            .filter(|m| m.status == status)
            .position(|m| m.id == matter_id)?;
        Some((status, index))
    }

    /// Overwrites one matter's status in place and returns the status it had
    /// immediately before.
    pub async fn set_status(
        &self,
        matter_id: MatterId,
        status: MatterStatus,
    ) -> Result<MatterStatus, StoreError> {
        let mut guard = self.inner.write().await;
        let matter = guard
            .matters
            .iter_mut()
            .find(|m| m.id == matter_id)
            .ok_or(StoreError::MatterNotFound(matter_id))?;
        Ok(std::mem::replace(&mut matter.status, status))
    }

    /// Wholesale refresh after the page reloads from the matters API.
    pub async fn replace_all(&self, matters: Vec<Matter>) {
        self.inner.write().await.matters = matters;
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    pub async fn report_error(&self, message: impl Into<String>) {
        self.inner.write().await.last_error = Some(message.into());
    }

    pub async fn dismiss_error(&self) {
        self.inner.write().await.last_error = None;
    }
}

/// Partitions matters into the five board columns. Every status has an entry,
/// and each column keeps the input's relative order.
pub fn group_by_status(matters: &[Matter]) -> BTreeMap<MatterStatus, Vec<Matter>> {
    let mut columns: BTreeMap<MatterStatus, Vec<Matter>> = MatterStatus::ALL
        .into_iter()
        .map(|status| (status, Vec::new()))
        .collect();
    for matter in matters {
        columns
            .entry(matter.status)
            .or_default()
            .push(matter.clone());
    }
    columns
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
