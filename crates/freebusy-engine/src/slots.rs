//! Compute free time slots from merged busy intervals.
//!
//! Busy intervals are clipped to the window, then the gaps between them are
//! reported as free slots.

use serde::{Deserialize, Serialize};

use crate::merger::MergedInterval;
use crate::occurrence::TimeWindow;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: i64,
    pub end: i64,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            duration_minutes: end.saturating_sub(start) / 60,
        }
    }
}

/// Find free slots within `window`, given busy intervals sorted by start.
///
/// Intervals partly outside the window are clipped; intervals entirely
/// outside it are ignored. Adjacent busy intervals leave no gap between them.
pub fn free_slots(intervals: &[MergedInterval], window: &TimeWindow) -> Vec<FreeSlot> {
    let mut slots = Vec::new();
    let mut cursor = window.start;

    for interval in intervals {
        if interval.end <= window.start || interval.start >= window.end {
            continue;
        }
        let busy_start = interval.start.max(window.start);
        if cursor < busy_start {
            slots.push(FreeSlot::new(cursor, busy_start));
        }
        cursor = cursor.max(interval.end.min(window.end));
    }

    if cursor < window.end {
        slots.push(FreeSlot::new(cursor, window.end));
    }

    slots
}

/// First free slot of at least `min_duration_minutes` within the window.
pub fn first_free_slot(
    intervals: &[MergedInterval],
    window: &TimeWindow,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    free_slots(intervals, window)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
