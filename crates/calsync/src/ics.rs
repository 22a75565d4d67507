//! iCalendar export.
//!
//! Produces a `VCALENDAR` document with one `VEVENT` block per event.
//! Timestamps use compact UTC basic format (`YYYYMMDDTHHMMSSZ`), description
//! newlines are escaped as literal `\n`, and lines are CRLF-terminated so
//! the output round-trips through standard ICS parsers.

use chrono::{DateTime, Utc};
use providers::CalendarEvent;

/// Render `events` as a complete iCalendar document.
pub fn export_ics(events: &[CalendarEvent]) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, "PRODID:-//taskforge//calsync//EN");

    for event in events {
        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}", event.id));
        push_line(&mut out, &format!("DTSTART:{}", utc_basic(event.start)));
        push_line(&mut out, &format!("DTEND:{}", utc_basic(event.end)));
        push_line(&mut out, &format!("SUMMARY:{}", event.title));
        if let Some(description) = &event.description {
            push_line(
                &mut out,
                &format!("DESCRIPTION:{}", escape_text(description)),
            );
        }
        if let Some(rrule) = &event.rrule {
            push_line(&mut out, &format!("RRULE:{rrule}"));
        }
        push_line(&mut out, &format!("CREATED:{}", utc_basic(event.created_at)));
        push_line(
            &mut out,
            &format!("LAST-MODIFIED:{}", utc_basic(event.updated_at)),
        );
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

fn utc_basic(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape newlines as the literal two characters `\n`.
fn escape_text(text: &str) -> String {
    text.replace("\r\n", "\\n").replace('\n', "\\n")
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use providers::CalendarSource;
    use uuid::Uuid;

    use super::*;

    fn event() -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        CalendarEvent {
            id: Uuid::nil(),
            title: "Standup".into(),
            description: Some("agenda:\n- yesterday\n- today".into()),
            location: None,
            start,
            end: start + chrono::Duration::minutes(30),
            all_day: false,
            task_id: None,
            calendar_id: Uuid::new_v4(),
            source: CalendarSource::Local,
            rrule: Some("FREQ=Daily".into()),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn document_structure_is_bit_exact() {
        let ics = export_ics(&[event()]);
        let expected = "BEGIN:VCALENDAR\r\n\
                        VERSION:2.0\r\n\
                        PRODID:-//taskforge//calsync//EN\r\n\
                        BEGIN:VEVENT\r\n\
                        UID:00000000-0000-0000-0000-000000000000\r\n\
                        DTSTART:20260110T090000Z\r\n\
                        DTEND:20260110T093000Z\r\n\
                        SUMMARY:Standup\r\n\
                        DESCRIPTION:agenda:\\n- yesterday\\n- today\r\n\
                        RRULE:FREQ=Daily\r\n\
                        CREATED:20260101T120000Z\r\n\
                        LAST-MODIFIED:20260102T120000Z\r\n\
                        END:VEVENT\r\n\
                        END:VCALENDAR\r\n";
        assert_eq!(ics, expected);
    }

    #[test]
    fn events_without_description_or_rrule_omit_those_lines() {
        let mut e = event();
        e.description = None;
        e.rrule = None;
        let ics = export_ics(&[e]);
        assert!(!ics.contains("DESCRIPTION"));
        assert!(!ics.contains("RRULE"));
    }

    #[test]
    fn empty_input_still_yields_a_valid_calendar() {
        let ics = export_ics(&[]);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.contains("VEVENT"));
    }
}
