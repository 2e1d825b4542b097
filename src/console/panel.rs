//! Panel mirror — the console's picture of its own controls.
//!
//! The console is headless. Instead of touching widgets it maintains a
//! [`PanelState`] snapshot and emits [`ViewEvent`]s; whatever surface hosts
//! the console (terminal shell, GUI) renders from those. The mirror is the
//! single source of truth for what the controls currently show.

use crate::auth::Operator;
use crate::presenter::DeckId;

/// What the console's controls currently display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelState {
    /// Deck identifiers offered by the selector, in enumeration order.
    pub deck_options: Vec<DeckId>,
    /// Identifier the selector currently shows.
    pub selected_deck: Option<DeckId>,
    /// Text the page field currently shows.
    pub page_entry: String,
    /// Page count of the deck the viewer has ready, if any.
    pub page_count: Option<u32>,
    /// Operator shown as signed in, if any.
    pub operator: Option<Operator>,
}

impl PanelState {
    /// `true` when the panel shows a signed-in operator.
    #[must_use]
    pub fn signed_in(&self) -> bool {
        self.operator.is_some()
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            deck_options: Vec::new(),
            selected_deck: None,
            page_entry: "1".to_owned(),
            page_count: None,
            operator: None,
        }
    }
}

/// One display-worthy change, emitted as the console applies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// The deck selector's option list arrived or changed.
    DeckOptions(Vec<DeckId>),
    /// A deck finished loading and is now the one on screen.
    DeckShown { deck: DeckId, page_count: u32 },
    /// The visible page changed.
    PageShown(u32),
    /// The session flipped. `None` means signed out.
    AuthChanged(Option<Operator>),
    /// The operator should be taken to the login surface.
    NavigateToLogin { url: String },
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
