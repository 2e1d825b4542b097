//! Lectern: an operator console for a remotely mirrored slide presentation.
//!
//! ARCHITECTURE
//! ============
//! One shared presenter-state record (active deck + current page) lives in a
//! document store and is mirrored by every viewer. This crate is the
//! operator's side of that mirror: a headless console that turns control
//! gestures (deck selection, page entry, prev/next, arrow keys) into store
//! writes, and store snapshots into viewer and panel updates.
//!
//! The console's collaborators are trait seams:
//! - [`StateStore`] — where the shared record lives
//! - [`AuthProvider`] — whether the operator may publish
//! - [`DeckViewer`] — the rendering engine being driven
//!
//! In-process implementations of all three ship for the terminal binary and
//! for tests; production embeddings supply their own.
//!
//! The correctness contract is loopback avoidance: store snapshots are
//! compared to local state field by field, echoes of the console's own
//! writes drop out, and only operator-origin changes ever write back.

pub mod auth;
pub mod config;
pub mod console;
pub mod presenter;
pub mod store;
pub mod viewer;

pub use auth::{AuthError, AuthProvider, AuthUpdates, MemoryAuth, Operator};
pub use config::ConsoleConfig;
pub use console::input::{ControlEvent, Key, StepDirection};
pub use console::panel::{PanelState, ViewEvent};
pub use console::{ConsoleHandle, spawn_console};
pub use presenter::{DeckId, PresenterState, StatePatch};
pub use store::{DeckEntry, MemoryStore, StateStore, StateUpdates, StoreError};
pub use viewer::{DeckViewer, MemoryViewer, PagesReady, ViewerError};
