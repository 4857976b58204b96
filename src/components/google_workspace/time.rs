use super::models::CalendarEvent;
use chrono::{DateTime, NaiveDate, Utc};

/// Get event start time as a UTC instant
///
/// All-day events start at midnight UTC of their date.
pub fn get_event_start(event: &CalendarEvent) -> Option<DateTime<Utc>> {
    if let Some(start_time) = &event.start.date_time {
        DateTime::parse_from_rfc3339(start_time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else if let Some(start_date) = &event.start.date {
        NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    } else {
        None
    }
}

/// Order events by start time and keep at most `limit` of them
///
/// Events without a readable start go last, keeping their relative order.
pub fn order_upcoming(mut events: Vec<CalendarEvent>, limit: usize) -> Vec<CalendarEvent> {
    events.sort_by_key(|event| match get_event_start(event) {
        Some(start) => (false, Some(start)),
        None => (true, None),
    });
    events.truncate(limit);
    events
}
