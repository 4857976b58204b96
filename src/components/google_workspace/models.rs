use crate::error::AgentResult;
use crate::utils::time::Timestamp;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Calendar event as returned by the Calendar API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
}

/// Start or end of an event: a `dateTime` for timed events, a `date` for all-day ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// Build the API representation of a timestamp
    ///
    /// Floating timestamps are sent as local wall time with an explicit `timeZone`.
    pub fn from_timestamp(timestamp: &Timestamp, tz: Tz) -> Self {
        Self {
            date_time: Some(timestamp.to_string()),
            date: None,
            time_zone: timestamp.is_floating().then(|| tz.name().to_string()),
        }
    }
}

/// Task as returned by the Tasks API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

/// Event to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Timezone floating timestamps are read in
    pub time_zone: Tz,
}

/// Task to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due: Option<Timestamp>,
    pub time_zone: Tz,
}

/// Request body for `events.insert`
#[derive(Debug, Serialize)]
pub(crate) struct EventInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventInsert {
    pub(crate) fn new(event: NewEvent, default_description: &str) -> Self {
        Self {
            start: EventDateTime::from_timestamp(&event.start, event.time_zone),
            end: EventDateTime::from_timestamp(&event.end, event.time_zone),
            summary: event.summary,
            description: event
                .description
                .unwrap_or_else(|| default_description.to_string()),
        }
    }
}

/// Request body for `tasks.insert`
#[derive(Debug, Serialize)]
pub(crate) struct TaskInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl TaskInsert {
    pub(crate) fn new(task: NewTask) -> AgentResult<Self> {
        // The Tasks API only accepts RFC 3339 with an offset
        let due = task
            .due
            .map(|due| due.to_rfc3339(task.time_zone))
            .transpose()?;

        Ok(Self {
            title: task.title,
            notes: task.notes,
            due,
        })
    }
}

/// Response of `events.list`
#[derive(Debug, Deserialize)]
pub(crate) struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorBody {
    pub error: GoogleErrorDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorDetails {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}
