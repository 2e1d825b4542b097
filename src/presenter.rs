//! Presenter state — the single shared record mirrored across viewers.
//!
//! DESIGN
//! ======
//! The remote document holds exactly two fields: the active deck and the
//! current page number. Writers publish partial patches ([`StatePatch`]) and
//! the store merges them field by field, last writer wins. Readers always see
//! a full [`PresenterState`] snapshot.

use serde::{Deserialize, Serialize};

/// Store field name for the active deck.
pub const DECK_FIELD: &str = "currentDeck";

/// Store field name for the current page number.
pub const PAGE_FIELD: &str = "currentPageNumber";

/// Identifier of a deck as stored in the shared document.
///
/// Decks are named elsewhere; the console only moves identifiers around.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the selector's empty placeholder value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeckId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for DeckId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The shared presenter record: which deck is active and which page is shown.
///
/// Page numbers are 1-based. There is no version field; concurrent writers
/// race under last-write-wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenterState {
    #[serde(rename = "currentDeck")]
    pub deck: DeckId,
    #[serde(rename = "currentPageNumber")]
    pub page: u32,
}

impl PresenterState {
    /// Build a full snapshot.
    pub fn new(deck: impl Into<DeckId>, page: u32) -> Self {
        Self { deck: deck.into(), page }
    }
}

/// Partial merge-write record. Absent fields are left untouched by the store.
///
/// Each write site constructs the patch for exactly the field it publishes,
/// so "which write touches what" is visible at the call site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(rename = "currentDeck", skip_serializing_if = "Option::is_none")]
    pub deck: Option<DeckId>,
    #[serde(rename = "currentPageNumber", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl StatePatch {
    /// Patch publishing only the active deck.
    #[must_use]
    pub fn deck(deck: impl Into<DeckId>) -> Self {
        Self { deck: Some(deck.into()), page: None }
    }

    /// Patch publishing only the current page number.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self { deck: None, page: Some(page) }
    }

    /// `true` when the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deck.is_none() && self.page.is_none()
    }

    /// The patch as a flat field map, ready for a merge-write.
    ///
    /// Absent fields are omitted entirely rather than serialized as null.
    #[must_use]
    pub fn fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
