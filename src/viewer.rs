//! Viewer seam — the rendering engine the console drives.
//!
//! The console treats rendering as opaque: it asks for a deck to be loaded,
//! waits for the page count, and afterwards moves the visible page around.
//! Loading is the only slow operation; page moves are local.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::presenter::DeckId;

/// Signal that a loaded deck is ready to page through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagesReady {
    /// Total pages in the loaded deck. Always at least 1 for a real deck.
    pub page_count: u32,
}

/// Errors surfaced by the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The requested deck could not be fetched or opened.
    #[error("deck unavailable: {0}")]
    DeckUnavailable(DeckId),

    /// The deck loaded but could not be rendered.
    #[error("render failed: {0}")]
    Render(String),
}

/// Rendering engine operations.
#[async_trait]
pub trait DeckViewer: Send + Sync {
    /// Replace the displayed deck. Resolves with the page count once the new
    /// deck is ready; the previous deck stays visible until then.
    async fn load_deck(&self, deck: &DeckId) -> Result<PagesReady, ViewerError>;

    /// Move the visible page. Ignored until a deck has finished loading.
    /// The console applies page moves inline, so implementations must
    /// return promptly; anything slow belongs in [`DeckViewer::load_deck`].
    async fn set_page(&self, page: u32);

    /// The page currently displayed.
    async fn current_page(&self) -> u32;
}

/// In-process [`DeckViewer`] for the terminal binary and tests.
///
/// Decks come from a fixed catalog mapping identifiers to page counts. Every
/// `load_deck` and `set_page` call is recorded so tests can assert exactly
/// what the console drove.
pub struct MemoryViewer {
    inner: Mutex<ViewerInner>,
    load_delay: Duration,
}

struct ViewerInner {
    catalog: HashMap<DeckId, u32>,
    loaded: Option<DeckId>,
    page: u32,
    load_log: Vec<DeckId>,
    page_log: Vec<u32>,
}

impl MemoryViewer {
    /// Viewer with an empty catalog: every load fails.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ViewerInner {
                catalog: HashMap::new(),
                loaded: None,
                page: 1,
                load_log: Vec::new(),
                page_log: Vec::new(),
            }),
            load_delay: Duration::ZERO,
        }
    }

    /// Seed the deck catalog with `(identifier, page count)` pairs.
    #[must_use]
    pub fn with_catalog(mut self, decks: impl IntoIterator<Item = (DeckId, u32)>) -> Self {
        self.inner.get_mut().catalog = decks.into_iter().collect();
        self
    }

    /// Make every load take this long before resolving.
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// The deck whose load most recently completed, if any.
    pub async fn loaded_deck(&self) -> Option<DeckId> {
        self.inner.lock().await.loaded.clone()
    }

    /// Every deck identifier `load_deck` was called with, in call order.
    pub async fn load_log(&self) -> Vec<DeckId> {
        self.inner.lock().await.load_log.clone()
    }

    /// Every page `set_page` accepted, in call order.
    pub async fn page_log(&self) -> Vec<u32> {
        self.inner.lock().await.page_log.clone()
    }
}

impl Default for MemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeckViewer for MemoryViewer {
    async fn load_deck(&self, deck: &DeckId) -> Result<PagesReady, ViewerError> {
        let page_count = {
            let mut inner = self.inner.lock().await;
            inner.load_log.push(deck.clone());
            inner.catalog.get(deck).copied()
        };

        // Simulated fetch/render time. The lock is not held across it so
        // loads and page moves stay concurrent, as in a real engine.
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let Some(page_count) = page_count else {
            return Err(ViewerError::DeckUnavailable(deck.clone()));
        };

        let mut inner = self.inner.lock().await;
        inner.loaded = Some(deck.clone());
        inner.page = 1;
        Ok(PagesReady { page_count })
    }

    async fn set_page(&self, page: u32) {
        let mut inner = self.inner.lock().await;
        if inner.loaded.is_none() {
            tracing::debug!(page, "page move before any deck is ready; ignored");
            return;
        }
        inner.page = page;
        inner.page_log.push(page);
    }

    async fn current_page(&self) -> u32 {
        self.inner.lock().await.page
    }
}

#[cfg(test)]
#[path = "viewer_test.rs"]
mod tests;
