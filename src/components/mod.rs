use crate::error::AgentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

// Export components
pub mod dispatcher;
pub mod google_workspace;
pub mod intent;

pub use dispatcher::{ActionData, Dispatcher, ResultEnvelope};
pub use google_workspace::{CalendarEvent, GoogleWorkspaceClient, NewEvent, NewTask, TaskItem};
pub use intent::{ActionDescriptor, GeminiModel, IntentResolver, LanguageModel};

/// Bearer token that authorizes Google API calls on the user's behalf
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCredential(String);

impl BackendCredential {
    /// Wrap an access token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BackendCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackendCredential(***)")
    }
}

/// Calendar and task operations the dispatcher can invoke
#[async_trait]
pub trait ActionBackend: Send + Sync + 'static {
    /// Create an event in the calendar
    async fn create_event(
        &self,
        credential: &BackendCredential,
        event: NewEvent,
    ) -> AgentResult<CalendarEvent>;

    /// Add a task to the task list
    async fn create_task(&self, credential: &BackendCredential, task: NewTask)
        -> AgentResult<TaskItem>;

    /// Next upcoming events from `now`, ordered by start time
    async fn list_upcoming_events(
        &self,
        credential: &BackendCredential,
        now: DateTime<Utc>,
    ) -> AgentResult<Vec<CalendarEvent>>;
}
