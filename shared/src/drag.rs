//! Drag-to-reorder for the pinned row
//!
//! A small state machine: Idle until an item is picked up, Dragging while the
//! pointer moves over other items, and back to Idle on release or cancel.
//! The drop indicator only appears after the pointer has rested on the same
//! target for the dwell time, so fast passes over several cards don't flicker.

use std::time::{Duration, Instant};

use crate::timezones::Timezone;

/// Continuous hover needed before the drop indicator shows
pub const DROP_INDICATOR_DWELL: Duration = Duration::from_millis(500);

/// Which side of the hovered item the dragged item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionSide {
    Before,
    After,
}

/// Moving forward in the list lands after the target, moving back lands before
pub fn insertion_side(active_index: usize, target_index: usize) -> InsertionSide {
    if active_index < target_index {
        InsertionSide::After
    } else {
        InsertionSide::Before
    }
}

/// Transient fields of an active gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub active_id: String,
    pub hovered_id: Option<String>,
    pub hover_started_at: Option<Instant>,
    pub side: Option<InsertionSide>,
    pub indicator_visible: bool,
}

impl DragState {
    fn new(active_id: &str) -> Self {
        Self {
            active_id: active_id.to_string(),
            hovered_id: None,
            hover_started_at: None,
            side: None,
            indicator_visible: false,
        }
    }

    fn clear_target(&mut self) {
        self.hovered_id = None;
        self.hover_started_at = None;
        self.side = None;
        self.indicator_visible = false;
    }
}

/// Visible "drop here" marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropIndicator<'a> {
    pub target_id: &'a str,
    pub side: InsertionSide,
}

/// Result of releasing a drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The new full ordering to hand to the pinned list
    Reordered(Vec<Timezone>),
    /// No target, the origin itself, or a target that vanished
    Abandoned,
}

/// Keyboard reordering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Earlier,
    Later,
}

#[derive(Debug, Clone)]
pub struct DragReorderController {
    dwell: Duration,
    state: Option<DragState>,
}

impl Default for DragReorderController {
    fn default() -> Self {
        Self::with_dwell(DROP_INDICATOR_DWELL)
    }
}

impl DragReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dwell(dwell: Duration) -> Self {
        Self { dwell, state: None }
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.active_id.as_str())
    }

    /// Pick up a pinned item. Returns false (and stays Idle) if the id is not
    /// in `items`. A gesture already in progress is discarded.
    pub fn begin(&mut self, active_id: &str, items: &[Timezone]) -> bool {
        self.state = None;
        if !items.iter().any(|tz| tz.id == active_id) {
            return false;
        }
        self.state = Some(DragState::new(active_id));
        true
    }

    /// Report the item under the pointer. Entering a new target restarts the
    /// dwell timer; staying on the same one keeps it running.
    pub fn hover(&mut self, over_id: Option<&str>, items: &[Timezone], now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let target = over_id.filter(|id| *id != state.active_id).and_then(|id| {
            let target_index = items.iter().position(|tz| tz.id == id)?;
            let active_index = items.iter().position(|tz| tz.id == state.active_id)?;
            Some((id, insertion_side(active_index, target_index)))
        });

        match target {
            None => state.clear_target(),
            Some((id, side)) => {
                if state.hovered_id.as_deref() != Some(id) {
                    state.hovered_id = Some(id.to_string());
                    state.hover_started_at = Some(now);
                    state.indicator_visible = false;
                }
                state.side = Some(side);
            }
        }
        self.refresh(now);
    }

    /// Advance the dwell timer. Returns whether the indicator is visible.
    pub fn refresh(&mut self, now: Instant) -> bool {
        let dwell = self.dwell;
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if let Some(started) = state.hover_started_at {
            if now.saturating_duration_since(started) >= dwell {
                state.indicator_visible = true;
            }
        }
        state.indicator_visible
    }

    pub fn drop_indicator(&self) -> Option<DropIndicator<'_>> {
        let state = self.state.as_ref()?;
        if !state.indicator_visible {
            return None;
        }
        Some(DropIndicator {
            target_id: state.hovered_id.as_deref()?,
            side: state.side?,
        })
    }

    /// End the gesture over the current target. Always returns to Idle.
    pub fn release(&mut self, items: &[Timezone]) -> DragOutcome {
        let Some(state) = self.state.take() else {
            return DragOutcome::Abandoned;
        };
        let Some(target_id) = state.hovered_id.as_deref() else {
            return DragOutcome::Abandoned;
        };

        // Indices may have shifted since the last hover
        let active_index = items.iter().position(|tz| tz.id == state.active_id);
        let target_index = items.iter().position(|tz| tz.id == target_id);
        match (active_index, target_index) {
            (Some(from), Some(to)) => {
                move_item(items, &state.active_id, target_id, insertion_side(from, to))
                    .map_or(DragOutcome::Abandoned, DragOutcome::Reordered)
            }
            _ => DragOutcome::Abandoned,
        }
    }

    /// Abandon the gesture and clear every transient field
    pub fn cancel(&mut self) {
        self.state = None;
    }
}

/// Stable move of `active_id` next to `target_id`; every other item keeps its
/// relative order.
///
/// The insertion index is taken in the list with the dragged item removed:
/// the target's index there, plus one when landing after it.
pub fn move_item(
    items: &[Timezone],
    active_id: &str,
    target_id: &str,
    side: InsertionSide,
) -> Option<Vec<Timezone>> {
    if active_id == target_id {
        return None;
    }
    let from = items.iter().position(|tz| tz.id == active_id)?;
    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);

    let target = reordered.iter().position(|tz| tz.id == target_id)?;
    let insert_at = match side {
        InsertionSide::Before => target,
        InsertionSide::After => target + 1,
    };
    reordered.insert(insert_at, moved);
    Some(reordered)
}

/// Keyboard equivalent of a drag: move one slot earlier or later. `None` at
/// either end or for an unknown id.
pub fn nudge(items: &[Timezone], id: &str, direction: MoveDirection) -> Option<Vec<Timezone>> {
    let index = items.iter().position(|tz| tz.id == id)?;
    let (target_index, side) = match direction {
        MoveDirection::Earlier => (index.checked_sub(1)?, InsertionSide::Before),
        MoveDirection::Later => (index + 1, InsertionSide::After),
    };
    let target = items.get(target_index)?;
    move_item(items, id, &target.id, side)
}
