//! Merge overlapping occurrences into non-overlapping free/busy intervals.
//!
//! Every occurrence contributes a START and an END boundary. The boundaries are
//! swept in time order while tracking the set of active occurrences; each time
//! the sweep reaches a new timestamp the span since the previous boundary is
//! closed as one interval. An interval carries the subjects of everything
//! active during it and the highest busy status among them. Free intervals
//! are never emitted.
//!
//! The active set is keyed by the position of each occurrence in the input
//! slice. Two concurrently active occurrences with identical subject and status
//! therefore stay distinguishable, and ending one of them always removes that
//! exact occurrence rather than "some matching entry".

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::occurrence::Occurrence;
use crate::status::BusyStatus;

/// Separator used when subjects of one interval are joined into a single string.
pub const DEFAULT_SUBJECT_SEPARATOR: &str = ", ";

/// A maximal span of time during which the set of active occurrences does not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedInterval {
    pub start: i64,
    pub end: i64,
    /// Subjects of the active occurrences, in the order they became active.
    pub subjects: Vec<String>,
    /// Highest status among the active occurrences. Never `FREE`.
    pub status: BusyStatus,
}

impl MergedInterval {
    /// Subjects joined into one display string, e.g. `"Standup, Review"`.
    pub fn joined_subjects(&self, separator: &str) -> String {
        self.subjects.join(separator)
    }

    /// Length of the interval in seconds, saturating at `i64::MAX`.
    pub fn duration_seconds(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

// Variant order is the tie-break: at equal time an END sorts before a START,
// so back-to-back occurrences never register as overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BoundaryKind {
    End,
    Start,
}

#[derive(Debug, Clone, Copy)]
struct TimePoint {
    time: i64,
    kind: BoundaryKind,
    index: usize,
}

fn boundary_order(a: &TimePoint, b: &TimePoint) -> Ordering {
    a.time.cmp(&b.time).then(a.kind.cmp(&b.kind))
}

fn time_points(occurrences: &[Occurrence]) -> Vec<TimePoint> {
    let mut points = Vec::with_capacity(occurrences.len() * 2);
    for (index, occurrence) in occurrences.iter().enumerate() {
        points.push(TimePoint {
            time: occurrence.start,
            kind: BoundaryKind::Start,
            index,
        });
        points.push(TimePoint {
            time: occurrence.end,
            kind: BoundaryKind::End,
            index,
        });
    }
    // Stable: STARTs sharing a timestamp keep input order, which fixes the
    // subject order inside an interval.
    points.sort_by(boundary_order);
    points
}

/// Occurrences whose interval contains the current sweep position.
#[derive(Default)]
struct ActiveSet<'a> {
    entries: Vec<(usize, &'a Occurrence)>,
    // Occurrences whose END was swept before their START (zero or negative
    // length). Their START is swallowed so they never become active.
    ended_early: HashSet<usize>,
}

impl<'a> ActiveSet<'a> {
    fn level(&self) -> usize {
        self.entries.len()
    }

    fn activate(&mut self, index: usize, occurrence: &'a Occurrence) {
        if self.ended_early.remove(&index) {
            return;
        }
        self.entries.push((index, occurrence));
    }

    fn deactivate(&mut self, index: usize) {
        match self.entries.iter().position(|(i, _)| *i == index) {
            Some(pos) => {
                self.entries.remove(pos);
            }
            None => {
                self.ended_early.insert(index);
            }
        }
    }

    fn status(&self) -> BusyStatus {
        self.entries
            .iter()
            .map(|(_, o)| o.status)
            .max()
            .unwrap_or(BusyStatus::FREE)
    }

    /// Close `[start, end)` over the current active set, keeping it only if busy.
    fn close(&self, start: i64, end: i64, merged: &mut Vec<MergedInterval>) {
        let status = self.status();
        if status.is_free() {
            return;
        }
        merged.push(MergedInterval {
            start,
            end,
            subjects: self.entries.iter().map(|(_, o)| o.subject.clone()).collect(),
            status,
        });
    }
}

/// Merge occurrences into a sorted list of non-overlapping busy intervals.
///
/// The result is ordered by `start`, intervals never overlap, and none has
/// status `FREE`. Back-to-back occurrences (one ending exactly when the next
/// starts) stay separate intervals. Zero and negative length occurrences are
/// accepted and contribute no busy time.
///
/// This is a pure function of its input and cannot fail.
pub fn merge(occurrences: &[Occurrence]) -> Vec<MergedInterval> {
    let points = time_points(occurrences);
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let mut active = ActiveSet::default();
    let mut merged = Vec::new();
    let mut last_boundary = first.time;

    for point in &points {
        match point.kind {
            BoundaryKind::Start => {
                if active.level() != 0 && last_boundary != point.time {
                    active.close(last_boundary, point.time, &mut merged);
                }
                active.activate(point.index, &occurrences[point.index]);
            }
            BoundaryKind::End => {
                // The ending occurrence is still active for the closed span.
                if last_boundary != point.time {
                    active.close(last_boundary, point.time, &mut merged);
                }
                active.deactivate(point.index);
            }
        }
        last_boundary = point.time;
    }

    debug_assert_eq!(active.level(), 0);
    merged
}
