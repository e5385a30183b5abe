//! Recurrence expansion -- turns recurring calendar items into concrete occurrences.
//!
//! Wraps the `rrule` crate (v0.13) and `chrono-tz`. Local datetimes are
//! interpreted in the recurrence's IANA timezone, so instances keep their wall
//! clock time across DST transitions.

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::error::{FreeBusyError, Result};
use crate::item::{CalendarItem, Recurrence};
use crate::occurrence::{Occurrence, TimeWindow};

/// Upper bound on instances produced for one recurring item in one window.
pub const DEFAULT_MAX_INSTANCES: u16 = 500;

/// A single expanded instance of a recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedInstance {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Turns calendar items into the occurrences that intersect a window.
pub trait RecurrenceExpander {
    /// Non-recurring items pass through as a single occurrence.
    fn expand(&self, item: &CalendarItem, window: &TimeWindow) -> Result<Vec<Occurrence>>;
}

/// [`RecurrenceExpander`] backed by RFC 5545 RRULE expansion.
#[derive(Debug, Clone, Copy)]
pub struct RRuleExpander {
    pub max_instances: u16,
}

impl Default for RRuleExpander {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl RecurrenceExpander for RRuleExpander {
    fn expand(&self, item: &CalendarItem, window: &TimeWindow) -> Result<Vec<Occurrence>> {
        let Some(recurrence) = &item.recurrence else {
            return Ok(vec![Occurrence::new(
                item.start,
                item.end,
                item.subject.clone(),
                item.status,
            )]);
        };

        let instances = expand_instances(recurrence, window, self.max_instances)?;
        tracing::debug!(
            subject = %item.subject,
            rrule = %recurrence.rrule,
            instances = instances.len(),
            "expanded recurring item"
        );

        Ok(instances
            .into_iter()
            .map(|i| Occurrence::from_datetimes(i.start, i.end, item.subject.clone(), item.status))
            .collect())
    }
}

/// Build the rule set for a recurrence, including EXDATE exclusions.
fn rule_set(recurrence: &Recurrence) -> Result<RRuleSet> {
    if recurrence.rrule.trim().is_empty() {
        return Err(FreeBusyError::InvalidRule("empty RRULE string".to_string()));
    }

    let _tz: chrono_tz::Tz = recurrence
        .timezone
        .parse()
        .map_err(|_| FreeBusyError::InvalidTimezone(recurrence.timezone.clone()))?;

    // "2026-02-17T14:00:00" -> "20260217T140000"
    let dtstart_ical = recurrence.dtstart.replace(['-', ':'], "");

    let mut text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        recurrence.timezone, dtstart_ical, recurrence.rrule
    );

    if !recurrence.exdates.is_empty() {
        let exdates: Vec<String> = recurrence
            .exdates
            .iter()
            .map(|d| d.replace(['-', ':'], ""))
            .collect();
        text.push_str(&format!(
            "\nEXDATE;TZID={}:{}",
            recurrence.timezone,
            exdates.join(",")
        ));
    }

    text.parse::<RRuleSet>()
        .map_err(|e| FreeBusyError::InvalidRule(format!("{}", e)))
}

fn out_of_range(timestamp: i64) -> FreeBusyError {
    FreeBusyError::Expansion(format!("timestamp out of range: {}", timestamp))
}

fn to_datetime(timestamp: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| out_of_range(timestamp))
}

/// Expand a recurrence into the instances whose `[start, end]` touches `window`.
///
/// At most `max_instances` instances are produced. Instances starting before
/// the window but still running at its start are included.
///
/// # Errors
/// Returns `FreeBusyError::InvalidRule` if the RRULE string is empty or unparseable.
/// Returns `FreeBusyError::InvalidTimezone` if the timezone is not a valid IANA identifier.
pub fn expand_instances(
    recurrence: &Recurrence,
    window: &TimeWindow,
    max_instances: u16,
) -> Result<Vec<ExpandedInstance>> {
    let set = rule_set(recurrence)?;
    if max_instances == 0 {
        return Ok(Vec::new());
    }

    let duration = Duration::minutes(i64::from(recurrence.duration_minutes));
    let window_start = to_datetime(window.start)?;
    let window_end = to_datetime(window.end)?;

    // Instances starting up to one duration before the window still touch it.
    let lookback = window_start
        .checked_sub_signed(duration)
        .ok_or_else(|| out_of_range(window.start))?;
    let set = set
        .after(lookback.with_timezone(&rrule::Tz::UTC))
        .before(window_end.with_timezone(&rrule::Tz::UTC));

    let mut instances = Vec::new();
    for dt in set.all(max_instances).dates {
        let start = dt.with_timezone(&Utc);
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| out_of_range(start.timestamp()))?;
        if start <= window_end && end >= window_start {
            instances.push(ExpandedInstance { start, end });
        }
    }

    Ok(instances)
}

/// End of the last instance of a bounded recurrence, as a timestamp.
///
/// Returns `None` for rules without COUNT or UNTIL, and for rules with more
/// instances than can be enumerated in one pass.
///
/// # Errors
/// Same as [`expand_instances`].
pub fn recurrence_end(recurrence: &Recurrence) -> Result<Option<i64>> {
    let set = rule_set(recurrence)?;
    let upper = recurrence.rrule.to_uppercase();
    if !upper.contains("COUNT=") && !upper.contains("UNTIL=") {
        return Ok(None);
    }

    let result = set.all(u16::MAX);
    if result.limited {
        return Ok(None);
    }

    let duration = Duration::minutes(i64::from(recurrence.duration_minutes));
    result
        .dates
        .last()
        .map(|dt| {
            let start = dt.with_timezone(&Utc);
            start
                .checked_add_signed(duration)
                .map(|end| end.timestamp())
                .ok_or_else(|| out_of_range(start.timestamp()))
        })
        .transpose()
}
