//! Recurrence pattern → RRULE translation.
//!
//! The output format is fixed and case-sensitive: `FREQ` carries the
//! capitalized pattern type, `INTERVAL` is emitted only when greater than 1,
//! `BYDAY` maps zero-based weekday indices (Sunday = 0) onto the two-letter
//! ICS codes, `UNTIL` uses compact UTC basic format, and `COUNT` follows
//! when a repetition count exists.

use domain::{RecurrencePattern, RecurrenceType};

const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

/// Render the pattern as an RRULE value (without the `RRULE:` prefix).
pub fn rrule_from_pattern(pattern: &RecurrencePattern) -> String {
    let mut parts = vec![format!("FREQ={}", freq(pattern.kind))];

    if pattern.interval > 1 {
        parts.push(format!("INTERVAL={}", pattern.interval));
    }

    if !pattern.days_of_week.is_empty() {
        let days: Vec<&str> = pattern
            .days_of_week
            .iter()
            .filter_map(|&d| WEEKDAY_CODES.get(usize::from(d)).copied())
            .collect();
        if !days.is_empty() {
            parts.push(format!("BYDAY={}", days.join(",")));
        }
    }

    if let Some(end) = pattern.end_date {
        parts.push(format!("UNTIL={}", end.format("%Y%m%dT%H%M%SZ")));
    }

    if let Some(count) = pattern.count {
        parts.push(format!("COUNT={count}"));
    }

    parts.join(";")
}

fn freq(kind: RecurrenceType) -> &'static str {
    match kind {
        RecurrenceType::Daily => "Daily",
        RecurrenceType::Weekly => "Weekly",
        RecurrenceType::Monthly => "Monthly",
        RecurrenceType::Yearly => "Yearly",
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use domain::{RecurrencePattern, RecurrenceType};

    use super::rrule_from_pattern;

    fn pattern(kind: RecurrenceType) -> RecurrencePattern {
        RecurrencePattern {
            kind,
            interval: 1,
            days_of_week: vec![],
            end_date: None,
            count: None,
        }
    }

    #[test]
    fn weekly_with_interval_days_and_count() {
        let p = RecurrencePattern {
            kind: RecurrenceType::Weekly,
            interval: 2,
            days_of_week: vec![1, 3],
            end_date: None,
            count: Some(5),
        };
        assert_eq!(
            rrule_from_pattern(&p),
            "FREQ=Weekly;INTERVAL=2;BYDAY=MO,WE;COUNT=5"
        );
    }

    #[test]
    fn interval_of_one_is_omitted() {
        assert_eq!(rrule_from_pattern(&pattern(RecurrenceType::Daily)), "FREQ=Daily");
    }

    #[test]
    fn until_uses_compact_utc_basic_format() {
        let mut p = pattern(RecurrenceType::Monthly);
        p.end_date = Some(Utc.with_ymd_and_hms(2026, 3, 15, 8, 30, 0).unwrap());
        assert_eq!(
            rrule_from_pattern(&p),
            "FREQ=Monthly;UNTIL=20260315T083000Z"
        );
    }

    #[test]
    fn sunday_is_index_zero() {
        let mut p = pattern(RecurrenceType::Weekly);
        p.days_of_week = vec![0, 6];
        assert_eq!(rrule_from_pattern(&p), "FREQ=Weekly;BYDAY=SU,SA");
    }

    #[test]
    fn out_of_range_weekday_indices_are_dropped() {
        let mut p = pattern(RecurrenceType::Weekly);
        p.days_of_week = vec![2, 9];
        assert_eq!(rrule_from_pattern(&p), "FREQ=Weekly;BYDAY=TU");
    }
}
