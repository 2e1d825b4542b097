//! In-process state store: one document, fan-out subscriptions.
//!
//! Used by the terminal binary and by tests. The document is a plain field
//! map so merge-writes behave exactly like a remote document store: each
//! patch field overwrites its slot, untouched fields survive. Snapshots fan
//! out only once the document carries both presenter fields.

use serde_json::{Map, Value};
use tokio::sync::{Mutex, mpsc};

use async_trait::async_trait;

use crate::presenter::{DeckId, PresenterState, StatePatch};
use crate::store::{DeckEntry, StateStore, StateUpdates, StoreError};

/// Snapshot channel depth per subscriber. A subscriber this far behind is
/// skipped rather than awaited.
const SUBSCRIBER_CAPACITY: usize = 256;

/// In-memory [`StateStore`] backing a single presenter document.
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    decks: Vec<DeckEntry>,
    document: Map<String, Value>,
    writable: bool,
    write_calls: usize,
    subscribers: Vec<mpsc::Sender<PresenterState>>,
}

impl MemoryStore {
    /// Empty store: no decks, no document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                decks: Vec::new(),
                document: Map::new(),
                writable: true,
                write_calls: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Seed the deck catalog. Enumeration preserves this order.
    #[must_use]
    pub fn with_decks(mut self, decks: impl IntoIterator<Item = DeckId>) -> Self {
        let inner = self.inner.get_mut();
        inner.decks = decks.into_iter().map(|id| DeckEntry { id }).collect();
        self
    }

    /// Seed the presenter document with a full snapshot.
    #[must_use]
    pub fn with_state(mut self, state: &PresenterState) -> Self {
        let inner = self.inner.get_mut();
        if let Ok(Value::Object(map)) = serde_json::to_value(state) {
            inner.document = map;
        }
        self
    }

    /// Flip the store between writable and read-only. Writes against a
    /// read-only store fail with [`StoreError::PermissionDenied`].
    pub async fn set_writable(&self, writable: bool) {
        self.inner.lock().await.writable = writable;
    }

    /// Number of `update` calls received, accepted or not.
    pub async fn write_count(&self) -> usize {
        self.inner.lock().await.write_calls
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn list_decks(&self) -> Result<Vec<DeckEntry>, StoreError> {
        Ok(self.inner.lock().await.decks.clone())
    }

    async fn read(&self) -> Result<PresenterState, StoreError> {
        let inner = self.inner.lock().await;
        snapshot(&inner.document).ok_or(StoreError::NotFound)
    }

    async fn update(&self, patch: StatePatch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.write_calls += 1;

        if !inner.writable {
            return Err(StoreError::PermissionDenied("store is read-only".into()));
        }

        if patch.is_empty() {
            return Ok(());
        }

        for (key, value) in patch.fields() {
            inner.document.insert(key, value);
        }

        if let Some(state) = snapshot(&inner.document) {
            fan_out(&mut inner.subscribers, &state);
        }
        Ok(())
    }

    async fn subscribe(&self) -> StateUpdates {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);

        // Attach semantics: current snapshot first, if the document exists.
        if let Some(state) = snapshot(&inner.document) {
            let _ = tx.try_send(state);
        }

        inner.subscribers.push(tx);
        rx
    }
}

/// A readable snapshot exists only once both fields are present.
fn snapshot(document: &Map<String, Value>) -> Option<PresenterState> {
    match serde_json::from_value(Value::Object(document.clone())) {
        Ok(state) => Some(state),
        Err(_) => None,
    }
}

/// Best-effort fan-out: drop closed subscribers, skip full ones.
fn fan_out(subscribers: &mut Vec<mpsc::Sender<PresenterState>>, state: &PresenterState) {
    subscribers.retain(|tx| !tx.is_closed());
    for tx in subscribers.iter() {
        let _ = tx.try_send(state.clone());
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
