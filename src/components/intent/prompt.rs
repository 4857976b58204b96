use super::models::ACTION_NAMES;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

const SYSTEM_PROMPT_TEMPLATE: &str = "You are a helpful calendar assistant.
Current date and time: {now}.
User timezone: {timezone}.

Classify the user's request as exactly one action:
- create_event: the user wants something placed on their calendar at a time.
- create_task: the user wants a to-do item added to their task list.
- list_events: the user asks what is coming up on their calendar.
- unknown: anything else.

Put a short title in summary and any extra details in description.
Times must be absolute ISO 8601 timestamps (YYYY-MM-DDTHH:mm:ss) in the user's timezone.
Resolve relative expressions such as \"tomorrow at 3pm\" against the current date and time above.
Leave endTime empty unless the user states an end time or a duration.
For a task with a deadline, put the deadline in startTime.";

/// Build the system instruction for a request
pub fn build_system_instruction(now: DateTime<Utc>, timezone: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{now}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{timezone}", timezone)
}

/// Response schema the model output must conform to
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "action": {
                "type": "STRING",
                "enum": ACTION_NAMES,
                "description": "The action to perform"
            },
            "summary": {
                "type": "STRING",
                "description": "Title of event or task"
            },
            "description": {
                "type": "STRING",
                "description": "Details or notes"
            },
            "startTime": {
                "type": "STRING",
                "description": "ISO 8601 start date and time"
            },
            "endTime": {
                "type": "STRING",
                "description": "ISO 8601 end date and time"
            }
        },
        "required": ["action"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_instruction_embeds_context() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let instruction = build_system_instruction(now, "Europe/Helsinki");

        assert!(instruction.contains("Current date and time: 2024-01-01T00:00:00Z."));
        assert!(instruction.contains("User timezone: Europe/Helsinki."));
        assert!(!instruction.contains("{now}"));
    }

    #[test]
    fn test_schema_requires_action() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["action"]));
        assert_eq!(schema["properties"]["action"]["enum"].as_array().unwrap().len(), 4);
    }
}
