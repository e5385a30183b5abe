//! Calendar items as stored, and their row encoding.

use serde::{Deserialize, Serialize};

use crate::error::{FreeBusyError, Result};
use crate::expander;
use crate::restriction::{PropTag, PropValue, PropertyRow};
use crate::status::BusyStatus;

/// Recurrence definition of a recurring calendar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// RFC 5545 RRULE body, e.g. `FREQ=WEEKLY;BYDAY=TU,TH`.
    pub rrule: String,
    /// Local datetime of the first instance, e.g. `2026-02-17T14:00:00`.
    pub dtstart: String,
    /// IANA timezone the local datetimes are expressed in.
    pub timezone: String,
    pub duration_minutes: u32,
    /// Local datetimes (same format as `dtstart`) excluded from the set.
    #[serde(default)]
    pub exdates: Vec<String>,
}

/// A calendar item returned by the store.
///
/// For recurring items `start`/`end` describe the first instance; concrete
/// occurrences come from expanding `recurrence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    #[serde(default)]
    pub subject: String,
    pub start: i64,
    pub end: i64,
    #[serde(default = "default_status")]
    pub status: BusyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

fn default_status() -> BusyStatus {
    BusyStatus::BUSY
}

impl CalendarItem {
    pub fn single(start: i64, end: i64, subject: impl Into<String>, status: BusyStatus) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
            status,
            recurrence: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Encode as a store row.
    ///
    /// Recurring items also get `ClipStart`/`ClipEnd`. An unbounded rule (no
    /// COUNT or UNTIL) clips at `i64::MAX`, and so does a rule that cannot be
    /// parsed; such an item is reported when it is expanded.
    pub fn to_row(&self) -> PropertyRow {
        let mut row = PropertyRow::new();
        row.insert(PropTag::Subject, self.subject.clone().into());
        row.insert(PropTag::StartDate, self.start.into());
        row.insert(PropTag::EndDate, self.end.into());
        row.insert(PropTag::BusyStatus, i64::from(self.status.0).into());
        row.insert(PropTag::Recurring, self.recurrence.is_some().into());

        if let Some(rec) = &self.recurrence {
            let clip_end = match expander::recurrence_end(rec) {
                Ok(end) => end.unwrap_or(i64::MAX),
                Err(e) => {
                    tracing::warn!(
                        subject = %self.subject,
                        error = %e,
                        "unreadable recurrence, not clipping"
                    );
                    i64::MAX
                }
            };
            row.insert(PropTag::ClipStart, self.start.into());
            row.insert(PropTag::ClipEnd, clip_end.into());
            row.insert(PropTag::RecurrenceRule, rec.rrule.clone().into());
            row.insert(PropTag::RecurrenceStart, rec.dtstart.clone().into());
            row.insert(PropTag::RecurrenceTimezone, rec.timezone.clone().into());
            row.insert(PropTag::Duration, i64::from(rec.duration_minutes).into());
            if !rec.exdates.is_empty() {
                row.insert(PropTag::ExceptionDates, rec.exdates.join(",").into());
            }
        }

        row
    }

    /// Decode a store row.
    ///
    /// A missing subject decodes as empty and a missing busy status as `BUSY`.
    ///
    /// # Errors
    /// `MissingProperty` when a required property is absent, `PropertyType`
    /// when a property holds a value of the wrong type.
    pub fn from_row(row: &PropertyRow) -> Result<Self> {
        let subject = opt_text(row, PropTag::Subject)?.unwrap_or_default();
        let start = int(row, PropTag::StartDate)?;
        let end = int(row, PropTag::EndDate)?;
        let status = match opt_int(row, PropTag::BusyStatus)? {
            Some(code) => BusyStatus(
                i32::try_from(code).map_err(|_| FreeBusyError::PropertyType {
                    tag: PropTag::BusyStatus,
                })?,
            ),
            None => BusyStatus::BUSY,
        };

        let recurring = match row.get(&PropTag::Recurring) {
            None => false,
            Some(PropValue::Bool(b)) => *b,
            Some(_) => {
                return Err(FreeBusyError::PropertyType {
                    tag: PropTag::Recurring,
                })
            }
        };

        let recurrence = if recurring {
            let duration = int(row, PropTag::Duration)?;
            Some(Recurrence {
                rrule: text(row, PropTag::RecurrenceRule)?,
                dtstart: text(row, PropTag::RecurrenceStart)?,
                timezone: text(row, PropTag::RecurrenceTimezone)?,
                duration_minutes: u32::try_from(duration).map_err(|_| {
                    FreeBusyError::PropertyType {
                        tag: PropTag::Duration,
                    }
                })?,
                exdates: opt_text(row, PropTag::ExceptionDates)?
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|d| !d.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
        } else {
            None
        };

        Ok(Self {
            subject,
            start,
            end,
            status,
            recurrence,
        })
    }
}

fn opt_int(row: &PropertyRow, tag: PropTag) -> Result<Option<i64>> {
    match row.get(&tag) {
        None => Ok(None),
        Some(PropValue::Int(v)) => Ok(Some(*v)),
        Some(_) => Err(FreeBusyError::PropertyType { tag }),
    }
}

fn int(row: &PropertyRow, tag: PropTag) -> Result<i64> {
    opt_int(row, tag)?.ok_or(FreeBusyError::MissingProperty(tag))
}

fn opt_text(row: &PropertyRow, tag: PropTag) -> Result<Option<String>> {
    match row.get(&tag) {
        None => Ok(None),
        Some(PropValue::Text(v)) => Ok(Some(v.clone())),
        Some(_) => Err(FreeBusyError::PropertyType { tag }),
    }
}

fn text(row: &PropertyRow, tag: PropTag) -> Result<String> {
    opt_text(row, tag)?.ok_or(FreeBusyError::MissingProperty(tag))
}
