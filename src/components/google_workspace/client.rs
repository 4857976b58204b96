use super::models::{
    CalendarEvent, EventInsert, EventList, GoogleErrorBody, NewEvent, NewTask, TaskInsert, TaskItem,
};
use super::time::order_upcoming;
use crate::components::{ActionBackend, BackendCredential};
use crate::config::Config;
use crate::error::{backend_error, AgentResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// Description given to events created without one
pub const DEFAULT_EVENT_DESCRIPTION: &str = "Created via Voice Agent";

/// Google Calendar and Tasks REST client
#[derive(Debug, Clone)]
pub struct GoogleWorkspaceClient {
    client: Client,
    calendar_api_base: String,
    tasks_api_base: String,
    calendar_id: String,
    task_list: String,
    events_limit: usize,
}

impl GoogleWorkspaceClient {
    /// Create a new client from the configuration
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            calendar_api_base: config.calendar_api_base.clone(),
            tasks_api_base: config.tasks_api_base.clone(),
            calendar_id: config.calendar_id.clone(),
            task_list: config.task_list.clone(),
            events_limit: config.upcoming_events_limit,
        }
    }

    fn events_url(&self) -> AgentResult<Url> {
        endpoint(
            &self.calendar_api_base,
            &["calendars", self.calendar_id.as_str(), "events"],
        )
    }

    fn tasks_url(&self) -> AgentResult<Url> {
        endpoint(&self.tasks_api_base, &["lists", self.task_list.as_str(), "tasks"])
    }

    /// Send an authorized request and decode the JSON response
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: &BackendCredential,
        action: &str,
    ) -> AgentResult<T> {
        let response = request
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| backend_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());

            // Prefer the API's own message when the body is a Google error
            let detail = match serde_json::from_str::<GoogleErrorBody>(&error_body) {
                Ok(body) if !body.error.message.is_empty() => match body.error.code {
                    Some(code) => format!("{} (code {})", body.error.message, code),
                    None => body.error.message,
                },
                _ => error_body,
            };

            return Err(backend_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| backend_error(&format!("Failed to parse {} response: {}", action, e)))
    }
}

#[async_trait]
impl ActionBackend for GoogleWorkspaceClient {
    async fn create_event(
        &self,
        credential: &BackendCredential,
        event: NewEvent,
    ) -> AgentResult<CalendarEvent> {
        let body = EventInsert::new(event, DEFAULT_EVENT_DESCRIPTION);
        let request = self.client.post(self.events_url()?).json(&body);

        let created: CalendarEvent = self.send_json(request, credential, "create event").await?;
        info!("Created calendar event {}", created.id);
        Ok(created)
    }

    async fn create_task(
        &self,
        credential: &BackendCredential,
        task: NewTask,
    ) -> AgentResult<TaskItem> {
        let body = TaskInsert::new(task)?;
        let request = self.client.post(self.tasks_url()?).json(&body);

        let created: TaskItem = self.send_json(request, credential, "create task").await?;
        info!("Created task {}", created.id);
        Ok(created)
    }

    async fn list_upcoming_events(
        &self,
        credential: &BackendCredential,
        now: DateTime<Utc>,
    ) -> AgentResult<Vec<CalendarEvent>> {
        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = self.events_limit.to_string();

        let mut url = self.events_url()?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min)
            .append_pair("maxResults", &max_results)
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let list: EventList = self
            .send_json(self.client.get(url), credential, "fetch events")
            .await?;
        debug!("Fetched {} upcoming events", list.items.len());

        Ok(order_upcoming(list.items, self.events_limit))
    }
}

/// Append percent-encoded path segments to an API base URL
fn endpoint(base: &str, segments: &[&str]) -> AgentResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| backend_error(&format!("Failed to parse URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| backend_error(&format!("Invalid API base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
