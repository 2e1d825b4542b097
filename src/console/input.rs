//! Control events — everything an operator can do to the console.
//!
//! Input surfaces (a terminal shell, a GUI panel) translate their native
//! gestures into [`ControlEvent`]s and queue them on the console handle. The
//! console is the only place that decides what a gesture means.

use crate::presenter::DeckId;

/// One operator gesture, already translated from its input surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// The deck selector changed to this identifier.
    DeckSelected(DeckId),
    /// The page field was committed with this raw text.
    PageEntered(String),
    /// A prev/next control was pressed.
    StepRequested(StepDirection),
    /// A key went down somewhere on the presentation surface.
    KeyPressed(Key),
    /// The operator asked to sign in.
    LoginRequested,
    /// The operator asked to sign out.
    LogoutRequested,
}

/// Direction of a relative page step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Back,
    Forward,
}

impl StepDirection {
    /// Signed page delta for this direction.
    #[must_use]
    pub fn delta(self) -> i64 {
        match self {
            Self::Back => -1,
            Self::Forward => 1,
        }
    }
}

/// Keys the presentation surface reports. Only the arrow keys mean anything
/// to the console; everything else arrives as [`Key::Other`] and is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Map a key press to the step it requests, if any.
#[must_use]
pub(crate) fn route_key(key: Key) -> Option<StepDirection> {
    match key {
        Key::ArrowLeft => Some(StepDirection::Back),
        Key::ArrowRight => Some(StepDirection::Forward),
        Key::Other => None,
    }
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
