use crate::error::AgentResult;
use crate::utils::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Action names the language model may choose from
pub const ACTION_NAMES: [&str; 4] = ["create_event", "create_task", "list_events", "unknown"];

/// Action field of the model output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateEvent,
    CreateTask,
    ListEvents,
    #[serde(other)]
    Unknown,
}

/// Raw structured output of the language model
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentPayload {
    pub action: ActionKind,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Parameters of an event the user asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIntent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

/// Parameters of a task the user asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIntent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<Timestamp>,
}

/// A resolved intent with its extracted parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionDescriptor {
    CreateEvent(EventIntent),
    CreateTask(TaskIntent),
    ListEvents,
    Unknown,
}

impl ActionDescriptor {
    /// Name of the action, as used in the model schema
    pub fn name(&self) -> &'static str {
        match self {
            ActionDescriptor::CreateEvent(_) => "create_event",
            ActionDescriptor::CreateTask(_) => "create_task",
            ActionDescriptor::ListEvents => "list_events",
            ActionDescriptor::Unknown => "unknown",
        }
    }
}

impl TryFrom<IntentPayload> for ActionDescriptor {
    type Error = crate::error::Error;

    fn try_from(payload: IntentPayload) -> AgentResult<Self> {
        let descriptor = match payload.action {
            ActionKind::CreateEvent => ActionDescriptor::CreateEvent(EventIntent {
                summary: non_blank(payload.summary),
                description: non_blank(payload.description),
                start_time: timestamp(payload.start_time)?,
                end_time: timestamp(payload.end_time)?,
            }),
            ActionKind::CreateTask => ActionDescriptor::CreateTask(TaskIntent {
                summary: non_blank(payload.summary),
                description: non_blank(payload.description),
                start_time: timestamp(payload.start_time)?,
            }),
            ActionKind::ListEvents => ActionDescriptor::ListEvents,
            ActionKind::Unknown => ActionDescriptor::Unknown,
        };
        Ok(descriptor)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn timestamp(value: Option<String>) -> AgentResult<Option<Timestamp>> {
    non_blank(value).map(|v| v.parse()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json};

    #[test]
    fn test_unknown_action_names_map_to_unknown() {
        let payload: IntentPayload = from_value(json!({ "action": "delete_event" })).unwrap();
        assert_eq!(payload.action, ActionKind::Unknown);
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let payload: IntentPayload = from_value(json!({
            "action": "create_event",
            "summary": "  Dentist ",
            "description": "",
            "startTime": " ",
        }))
        .unwrap();

        let descriptor = ActionDescriptor::try_from(payload).unwrap();

        assert_eq!(
            descriptor,
            ActionDescriptor::CreateEvent(EventIntent {
                summary: Some("Dentist".to_string()),
                description: None,
                start_time: None,
                end_time: None,
            })
        );
    }

    #[test]
    fn test_malformed_timestamp_is_rejected() {
        let payload: IntentPayload = from_value(json!({
            "action": "create_task",
            "summary": "Call mom",
            "startTime": "next friday",
        }))
        .unwrap();

        assert!(ActionDescriptor::try_from(payload).is_err());
    }

    #[test]
    fn test_descriptor_serializes_with_action_tag() {
        let descriptor = ActionDescriptor::CreateTask(TaskIntent {
            summary: Some("Buy milk".to_string()),
            description: None,
            start_time: Some("2024-01-02T09:00:00".parse().unwrap()),
        });

        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "action": "create_task",
                "summary": "Buy milk",
                "description": null,
                "startTime": "2024-01-02T09:00:00",
            })
        );
        assert_eq!(ActionDescriptor::ListEvents.name(), "list_events");
    }
}
