mod models;

pub use models::{ActionData, ResultEnvelope};

use crate::components::intent::{ActionDescriptor, EventIntent, TaskIntent};
use crate::components::{ActionBackend, BackendCredential, NewEvent, NewTask};
use crate::config::Config;
use crate::error::{AgentResult, Error};
use crate::utils::time::{localize, Clock};
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use rust_i18n::t;
use std::sync::Arc;
use tracing::{info, warn};

/// Routes resolved intents to the calendar and task backend
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ActionBackend>,
    event_duration: Duration,
    locale: String,
    clock: Clock,
}

impl Dispatcher {
    /// Create a dispatcher with a one hour default event duration and English messages
    pub fn new(backend: Arc<dyn ActionBackend>) -> Self {
        Self {
            backend,
            event_duration: Duration::hours(1),
            locale: "en".to_string(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Create a dispatcher using the configured duration and locale
    ///
    /// A duration rejected by [`Config::validate`] falls back to one hour.
    pub fn from_config(backend: Arc<dyn ActionBackend>, config: &Config) -> Self {
        let event_duration = config.event_duration().unwrap_or_else(|e| {
            warn!("{}, using one hour", e);
            Duration::hours(1)
        });
        Self::new(backend)
            .with_event_duration(event_duration)
            .with_locale(&config.locale)
    }

    /// Duration given to events without an end time
    pub fn with_event_duration(mut self, duration: Duration) -> Self {
        self.event_duration = duration;
        self
    }

    /// Locale of the confirmation messages
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    /// Source of the current time for listings
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Execute the descriptor and describe the outcome
    ///
    /// Never fails: errors from validation or the backend become an
    /// unsuccessful envelope carrying the error message.
    pub async fn dispatch(
        &self,
        descriptor: ActionDescriptor,
        credential: &BackendCredential,
        timezone: Tz,
    ) -> ResultEnvelope {
        let action = descriptor.name();
        match self.execute(descriptor, credential, timezone).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Action {} failed: {}", action, e);
                ResultEnvelope::from_error(&e)
            }
        }
    }

    async fn execute(
        &self,
        descriptor: ActionDescriptor,
        credential: &BackendCredential,
        timezone: Tz,
    ) -> AgentResult<ResultEnvelope> {
        match descriptor {
            ActionDescriptor::CreateEvent(intent) => {
                self.create_event(intent, credential, timezone).await
            }
            ActionDescriptor::CreateTask(intent) => {
                self.create_task(intent, credential, timezone).await
            }
            ActionDescriptor::ListEvents => {
                let events = self
                    .backend
                    .list_upcoming_events(credential, (self.clock)())
                    .await?;
                let message = t!(
                    "upcoming_events",
                    locale = self.locale.as_str(),
                    count = events.len()
                );
                Ok(ResultEnvelope::success(message, ActionData::Events(events)))
            }
            ActionDescriptor::Unknown => {
                info!("Request not understood, no action taken");
                Ok(ResultEnvelope::declined(t!(
                    "not_understood",
                    locale = self.locale.as_str()
                )))
            }
        }
    }

    async fn create_event(
        &self,
        intent: EventIntent,
        credential: &BackendCredential,
        timezone: Tz,
    ) -> AgentResult<ResultEnvelope> {
        let start = intent
            .start_time
            .ok_or_else(|| Error::MissingField("start time".to_string()))?;
        let end = match intent.end_time {
            Some(end) => end,
            None => start.plus(self.event_duration)?,
        };

        let message = t!(
            "event_created",
            locale = self.locale.as_str(),
            summary = self.title(intent.summary.as_deref()),
            start = localize(&start, timezone)
        );

        let event = NewEvent {
            summary: intent.summary,
            description: intent.description,
            start,
            end,
            time_zone: timezone,
        };
        let created = self.backend.create_event(credential, event).await?;

        Ok(ResultEnvelope::success(message, ActionData::Event(created)))
    }

    async fn create_task(
        &self,
        intent: TaskIntent,
        credential: &BackendCredential,
        timezone: Tz,
    ) -> AgentResult<ResultEnvelope> {
        let message = t!(
            "task_added",
            locale = self.locale.as_str(),
            summary = self.title(intent.summary.as_deref())
        );

        let task = NewTask {
            title: intent.summary,
            notes: intent.description,
            due: intent.start_time,
            time_zone: timezone,
        };
        let created = self.backend.create_task(credential, task).await?;

        Ok(ResultEnvelope::success(message, ActionData::Task(created)))
    }

    fn title(&self, summary: Option<&str>) -> String {
        match summary {
            Some(summary) => summary.to_string(),
            None => t!("untitled", locale = self.locale.as_str()).to_string(),
        }
    }
}
