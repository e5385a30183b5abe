//! Tests for recurrence expansion into window-bounded occurrences.

use chrono::{TimeZone, Timelike, Utc};
use freebusy_engine::{
    expand_instances, BusyStatus, CalendarItem, FreeBusyError, RRuleExpander, Recurrence,
    RecurrenceExpander, TimeWindow,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn recurrence(rrule: &str, dtstart: &str, duration_minutes: u32, timezone: &str) -> Recurrence {
    Recurrence {
        rrule: rrule.to_string(),
        dtstart: dtstart.to_string(),
        timezone: timezone.to_string(),
        duration_minutes,
        exdates: vec![],
    }
}

fn window(from: (i32, u32, u32), to: (i32, u32, u32)) -> TimeWindow {
    TimeWindow::from_datetimes(
        Utc.with_ymd_and_hms(from.0, from.1, from.2, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(to.0, to.1, to.2, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// DST handling
// ---------------------------------------------------------------------------

#[test]
fn third_tuesday_monthly_across_dst() {
    // 3rd Tuesday of each month at 14:00 America/Los_Angeles.
    let rec = recurrence(
        "FREQ=MONTHLY;BYDAY=TU;BYSETPOS=3;COUNT=3",
        "2026-02-17T14:00:00",
        60,
        "America/Los_Angeles",
    );
    let result = expand_instances(&rec, &window((2026, 1, 1), (2026, 12, 31)), 500)
        .expect("should expand successfully");

    assert_eq!(result.len(), 3);

    // Feb 17, 14:00 PST = 22:00 UTC
    assert_eq!(
        result[0].start,
        Utc.with_ymd_and_hms(2026, 2, 17, 22, 0, 0).unwrap()
    );
    assert_eq!(
        result[0].end,
        Utc.with_ymd_and_hms(2026, 2, 17, 23, 0, 0).unwrap()
    );
    // Mar 17, 14:00 PDT = 21:00 UTC (DST started Mar 8)
    assert_eq!(result[1].start.hour(), 21);
    assert_eq!(
        result[2].start,
        Utc.with_ymd_and_hms(2026, 4, 21, 21, 0, 0).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Window bounding
// ---------------------------------------------------------------------------

#[test]
fn only_instances_in_window_are_returned() {
    let rec = recurrence("FREQ=DAILY", "2026-03-01T09:00:00", 30, "UTC");
    let result = expand_instances(&rec, &window((2026, 3, 10), (2026, 3, 13)), 500).unwrap();

    let days: Vec<u32> = result
        .iter()
        .map(|i| chrono::Datelike::day(&i.start))
        .collect();
    assert_eq!(days, vec![10, 11, 12]);
}

#[test]
fn instance_running_into_window_start_is_included() {
    // 23:00-01:00 instances; the window starts at midnight.
    let rec = recurrence("FREQ=DAILY;COUNT=5", "2026-03-01T23:00:00", 120, "UTC");
    let result = expand_instances(&rec, &window((2026, 3, 3), (2026, 3, 4)), 500).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result[0].start,
        Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap()
    );
    assert_eq!(
        result[1].start,
        Utc.with_ymd_and_hms(2026, 3, 3, 23, 0, 0).unwrap()
    );
}

#[test]
fn distant_window_is_reached_for_long_running_series() {
    // More than 500 daily instances precede the window.
    let rec = recurrence("FREQ=DAILY", "2024-01-01T08:00:00", 60, "UTC");
    let result = expand_instances(&rec, &window((2026, 6, 1), (2026, 6, 3)), 500).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(
        result[0].start,
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    );
}

#[test]
fn max_instances_caps_expansion() {
    let rec = recurrence("FREQ=DAILY", "2026-03-01T12:00:00", 30, "UTC");
    let result = expand_instances(&rec, &window((2026, 3, 1), (2026, 4, 1)), 10).unwrap();
    assert_eq!(result.len(), 10);
}

#[test]
fn exdates_are_excluded() {
    let mut rec = recurrence(
        "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6",
        "2026-03-02T10:00:00",
        45,
        "UTC",
    );
    rec.exdates = vec!["2026-03-04T10:00:00".to_string()];
    let result = expand_instances(&rec, &window((2026, 3, 1), (2026, 4, 1)), 500).unwrap();

    assert_eq!(result.len(), 5);
    assert!(result
        .iter()
        .all(|i| i.start != Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn empty_rrule_returns_error() {
    let rec = recurrence("", "2026-03-01T09:00:00", 30, "UTC");
    let result = expand_instances(&rec, &window((2026, 3, 1), (2026, 3, 2)), 500);
    assert!(matches!(result, Err(FreeBusyError::InvalidRule(_))));
}

#[test]
fn invalid_timezone_returns_error() {
    let rec = recurrence("FREQ=DAILY;COUNT=1", "2026-03-01T09:00:00", 30, "Mars/Olympus_Mons");
    let result = expand_instances(&rec, &window((2026, 3, 1), (2026, 3, 2)), 500);
    assert!(matches!(result, Err(FreeBusyError::InvalidTimezone(_))));
}

#[test]
fn garbage_rrule_returns_error() {
    let rec = recurrence("NOT A RULE", "2026-03-01T09:00:00", 30, "UTC");
    let result = expand_instances(&rec, &window((2026, 3, 1), (2026, 3, 2)), 500);
    assert!(matches!(result, Err(FreeBusyError::InvalidRule(_))));
}

#[test]
fn window_at_edge_of_datetime_range_returns_error() {
    let rec = recurrence("FREQ=DAILY", "2026-03-01T09:00:00", 30, "UTC");
    let earliest = chrono::DateTime::<Utc>::MIN_UTC.timestamp();
    let result = expand_instances(&rec, &TimeWindow::new(earliest, 0).unwrap(), 500);
    assert!(matches!(result, Err(FreeBusyError::Expansion(_))));

    let result = expand_instances(&rec, &TimeWindow::new(i64::MIN, 0).unwrap(), 500);
    assert!(matches!(result, Err(FreeBusyError::Expansion(_))));
}

// ---------------------------------------------------------------------------
// RecurrenceExpander
// ---------------------------------------------------------------------------

#[test]
fn single_item_passes_through() {
    let item = CalendarItem::single(100, 200, "Dentist", BusyStatus::OUT_OF_OFFICE);
    let result = RRuleExpander::default()
        .expand(&item, &TimeWindow::new(0, 1000).unwrap())
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!((result[0].start, result[0].end), (100, 200));
    assert_eq!(result[0].subject, "Dentist");
    assert_eq!(result[0].status, BusyStatus::OUT_OF_OFFICE);
}

#[test]
fn recurring_item_occurrences_carry_subject_and_status() {
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
    let mut item = CalendarItem::single(
        start.timestamp(),
        start.timestamp() + 2700,
        "Standup",
        BusyStatus::TENTATIVE,
    );
    item.recurrence = Some(recurrence(
        "FREQ=WEEKLY;BYDAY=MO,WE,FR",
        "2026-03-02T10:00:00",
        45,
        "UTC",
    ));

    let result = RRuleExpander::default()
        .expand(&item, &window((2026, 3, 2), (2026, 3, 9)))
        .unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.iter().all(|o| o.subject == "Standup"));
    assert!(result.iter().all(|o| o.status == BusyStatus::TENTATIVE));
    assert!(result.iter().all(|o| o.end - o.start == 2700));
    assert_eq!(result[0].start, start.timestamp());
}
