//! Document store seam — where the shared presenter state lives.
//!
//! DESIGN
//! ======
//! The console never talks to a concrete backend. It holds an
//! `Arc<dyn StateStore>` and uses four operations: enumerate decks, read the
//! presenter document, merge-write a patch, and subscribe to snapshots.
//! Everything backend-specific (transport, retries, auth plumbing) stays
//! behind the trait.
//!
//! Subscriptions deliver the current snapshot immediately on attach, then one
//! snapshot per accepted write. Deduplication is the subscriber's problem:
//! a writer hears its own writes back.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::presenter::{DeckId, PresenterState, StatePatch};

/// Errors surfaced by state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The presenter document does not exist yet.
    #[error("presenter state document not found")]
    NotFound,

    /// The backend rejected the write (rules, ownership, read-only mode).
    #[error("write rejected: {0}")]
    PermissionDenied(String),

    /// Transport-level failure talking to the backend.
    #[error("store transport failed: {0}")]
    Transport(String),
}

/// One deck known to the store. Enumeration yields identifiers only;
/// deck content lives with the viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub id: DeckId,
}

/// Receiver half of a presenter-state subscription.
pub type StateUpdates = mpsc::Receiver<PresenterState>;

/// Shared presenter-state document operations.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Enumerate every deck the store knows about, in stable order.
    async fn list_decks(&self) -> Result<Vec<DeckEntry>, StoreError>;

    /// Read the current presenter snapshot.
    async fn read(&self) -> Result<PresenterState, StoreError>;

    /// Merge-write a partial patch. Fields absent from the patch keep their
    /// stored value. Concurrent writers race under last-write-wins.
    async fn update(&self, patch: StatePatch) -> Result<(), StoreError>;

    /// Subscribe to presenter snapshots. The current snapshot (if the
    /// document exists) is delivered first, then one per accepted write.
    async fn subscribe(&self) -> StateUpdates;
}
