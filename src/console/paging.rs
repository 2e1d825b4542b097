//! Page arithmetic for the navigation controls.
//!
//! Step navigation clamps to the loaded deck's bounds. Typed page entry is
//! deliberately looser: any non-negative integer that parses is accepted and
//! published as-is, and the shared viewer clamps when it renders. The two
//! paths have always behaved differently and downstream surfaces rely on it.

use crate::console::input::StepDirection;

/// Target page for a relative step, clamped to `1..=page_count`.
///
/// The result can equal `current` (stepping back on page 1, forward on the
/// last page); callers treat that as "nothing to do".
#[must_use]
pub(crate) fn step_target(current: u32, direction: StepDirection, page_count: u32) -> u32 {
    let stepped = i64::from(current) + direction.delta();
    let clamped = stepped.clamp(1, i64::from(page_count.max(1)));
    // Range is 1..=page_count, both u32-representable.
    u32::try_from(clamped).unwrap_or(1)
}

/// Parse a typed page entry. Whitespace is trimmed; anything that is not a
/// plain non-negative integer is rejected.
#[must_use]
pub(crate) fn parse_page_entry(raw: &str) -> Option<u32> {
    match raw.trim().parse() {
        Ok(page) => Some(page),
        Err(_) => None,
    }
}

#[cfg(test)]
#[path = "paging_test.rs"]
mod tests;
