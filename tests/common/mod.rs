#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use voice_agent::components::intent::GenerationRequest;
use voice_agent::components::{
    ActionBackend, BackendCredential, CalendarEvent, LanguageModel, NewEvent, NewTask, TaskItem,
};
use voice_agent::components::google_workspace::EventDateTime;
use voice_agent::error::{backend_error, resolution_error, AgentResult};

/// Language model stub returning a canned output
pub struct StubModel {
    output: Result<String, String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl StubModel {
    /// Stub that answers every request with `output`
    pub fn returning(output: &str) -> Self {
        Self {
            output: Ok(output.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stub whose service is unreachable
    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(&self, request: &GenerationRequest) -> AgentResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.output.clone().map_err(|e| resolution_error(&e))
    }
}

/// Backend stub recording every call
#[derive(Default)]
pub struct StubBackend {
    pub events: Mutex<Vec<NewEvent>>,
    pub tasks: Mutex<Vec<NewTask>>,
    pub list_calls: AtomicUsize,
    /// Instants passed to `list_upcoming_events`
    pub listed_from: Mutex<Vec<DateTime<Utc>>>,
    pub credentials: Mutex<Vec<BackendCredential>>,
    pub upcoming: Vec<CalendarEvent>,
    pub fail_with: Option<String>,
}

impl StubBackend {
    /// Backend whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Backend listing the given events
    pub fn with_upcoming(upcoming: Vec<CalendarEvent>) -> Self {
        Self {
            upcoming,
            ..Default::default()
        }
    }

    /// Number of calls of any kind
    pub fn total_calls(&self) -> usize {
        self.events.lock().unwrap().len()
            + self.tasks.lock().unwrap().len()
            + self.list_calls.load(Ordering::SeqCst)
    }

    fn check(&self, credential: &BackendCredential) -> AgentResult<()> {
        self.credentials.lock().unwrap().push(credential.clone());
        match &self.fail_with {
            Some(message) => Err(backend_error(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActionBackend for StubBackend {
    async fn create_event(
        &self,
        credential: &BackendCredential,
        event: NewEvent,
    ) -> AgentResult<CalendarEvent> {
        self.events.lock().unwrap().push(event.clone());
        self.check(credential)?;
        Ok(CalendarEvent {
            id: "evt-1".to_string(),
            summary: event.summary,
            description: event.description,
            start: EventDateTime {
                date_time: Some(event.start.to_string()),
                ..Default::default()
            },
            end: EventDateTime {
                date_time: Some(event.end.to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn create_task(
        &self,
        credential: &BackendCredential,
        task: NewTask,
    ) -> AgentResult<TaskItem> {
        self.tasks.lock().unwrap().push(task.clone());
        self.check(credential)?;
        Ok(TaskItem {
            id: "task-1".to_string(),
            title: task.title,
            notes: task.notes,
            status: Some("needsAction".to_string()),
            ..Default::default()
        })
    }

    async fn list_upcoming_events(
        &self,
        credential: &BackendCredential,
        now: DateTime<Utc>,
    ) -> AgentResult<Vec<CalendarEvent>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listed_from.lock().unwrap().push(now);
        self.check(credential)?;
        Ok(self.upcoming.clone())
    }
}

/// Timed event starting at `start`
pub fn event(id: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(format!("Event {}", id)),
        start: EventDateTime {
            date_time: Some(start.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}
