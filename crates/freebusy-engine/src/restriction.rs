//! Store query restrictions.
//!
//! A restriction is a predicate over a [`PropertyRow`]. Stores evaluate it to
//! decide which calendar rows a query returns.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::occurrence::TimeWindow;

/// Calendar item properties understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropTag {
    Subject,
    StartDate,
    EndDate,
    BusyStatus,
    Recurring,
    /// First instant a recurring item can produce an occurrence.
    ClipStart,
    /// Last instant a recurring item can produce an occurrence.
    ClipEnd,
    RecurrenceRule,
    RecurrenceStart,
    RecurrenceTimezone,
    /// Duration of each recurring instance, in minutes.
    Duration,
    /// Comma-separated local datetimes excluded from the recurrence.
    ExceptionDates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PropValue {
    /// Ordering between values of the same type; `None` across types.
    fn compare(&self, other: &PropValue) -> Option<Ordering> {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => Some(a.cmp(b)),
            (PropValue::Int(a), PropValue::Int(b)) => Some(a.cmp(b)),
            (PropValue::Text(a), PropValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Text(v)
    }
}

/// One row returned by a store query.
pub type PropertyRow = BTreeMap<PropTag, PropValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl RelOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            RelOp::Lt => ordering == Ordering::Less,
            RelOp::Le => ordering != Ordering::Greater,
            RelOp::Gt => ordering == Ordering::Greater,
            RelOp::Ge => ordering != Ordering::Less,
            RelOp::Eq => ordering == Ordering::Equal,
            RelOp::Ne => ordering != Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Restriction {
    And(Vec<Restriction>),
    Or(Vec<Restriction>),
    Not(Box<Restriction>),
    /// Compare the row's value for `tag` against `value`.
    Property {
        tag: PropTag,
        op: RelOp,
        value: PropValue,
    },
    Exist(PropTag),
}

impl Restriction {
    pub fn property(tag: PropTag, op: RelOp, value: impl Into<PropValue>) -> Self {
        Restriction::Property {
            tag,
            op,
            value: value.into(),
        }
    }

    /// Evaluate against a row.
    ///
    /// A comparison against a missing property, or a property holding a value
    /// of another type, is false. An empty `And` is true and an empty `Or` is false.
    pub fn matches(&self, row: &PropertyRow) -> bool {
        match self {
            Restriction::And(parts) => parts.iter().all(|r| r.matches(row)),
            Restriction::Or(parts) => parts.iter().any(|r| r.matches(row)),
            Restriction::Not(inner) => !inner.matches(row),
            Restriction::Property { tag, op, value } => row
                .get(tag)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| op.holds(ordering)),
            Restriction::Exist(tag) => row.contains_key(tag),
        }
    }
}

/// Rows whose busy time may intersect the closed `window`.
///
/// Single items match when `[start, end]` touches the window. Recurring
/// masters match when their clip range touches it; their concrete
/// occurrences are produced later by the recurrence expander.
pub fn window_restriction(window: &TimeWindow) -> Restriction {
    Restriction::Or(vec![
        Restriction::And(vec![
            Restriction::property(PropTag::EndDate, RelOp::Ge, window.start),
            Restriction::property(PropTag::StartDate, RelOp::Le, window.end),
        ]),
        Restriction::And(vec![
            Restriction::Exist(PropTag::Recurring),
            Restriction::property(PropTag::Recurring, RelOp::Eq, true),
            Restriction::property(PropTag::ClipEnd, RelOp::Ge, window.start),
            Restriction::property(PropTag::ClipStart, RelOp::Le, window.end),
        ]),
    ])
}
