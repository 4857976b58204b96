use crate::components::google_workspace::{CalendarEvent, TaskItem};
use crate::error::{Error, ErrorKind};
use serde::Serialize;

/// Payload returned alongside a successful action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionData {
    Event(CalendarEvent),
    Task(TaskItem),
    Events(Vec<CalendarEvent>),
}

/// Uniform response of one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionData>,
    /// What went wrong, if anything; not part of the response body
    #[serde(skip)]
    failure: Option<ErrorKind>,
}

impl ResultEnvelope {
    /// A completed action
    pub fn success(message: impl Into<String>, data: ActionData) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            failure: None,
        }
    }

    /// A request that finished without doing anything, such as an unrecognized intent
    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            failure: None,
        }
    }

    /// A failed request carrying the error's message
    pub fn from_error(err: &Error) -> Self {
        Self::failed(err.kind(), err.to_string())
    }

    /// A failed request with an explicit message
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            failure: Some(kind),
        }
    }

    /// Kind of failure, `None` when the request did not fail
    pub fn failure(&self) -> Option<ErrorKind> {
        self.failure
    }
}
