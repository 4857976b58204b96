use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use voice_agent::components::{
    ActionBackend, BackendCredential, GoogleWorkspaceClient, NewEvent, NewTask,
};
use voice_agent::config::Config;
use voice_agent::error::Error;

/// A request received by the fake Google endpoints
#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    authorization: Option<String>,
    query: HashMap<String, String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeGoogle {
    requests: Arc<Mutex<Vec<Recorded>>>,
    reject: bool,
}

impl FakeGoogle {
    fn record(&self, path: String, headers: &HeaderMap, query: HashMap<String, String>, body: Value) {
        self.requests.lock().unwrap().push(Recorded {
            path,
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            query,
            body,
        });
    }

    fn rejection(&self) -> Option<Response> {
        self.reject.then(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "code": 401, "message": "Invalid Credentials" } })),
            )
                .into_response()
        })
    }
}

async fn list_events(
    State(fake): State<FakeGoogle>,
    Path(calendar_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    fake.record(format!("events.list/{}", calendar_id), &headers, query, Value::Null);
    if let Some(rejection) = fake.rejection() {
        return rejection;
    }

    // Deliberately unordered and longer than the limit
    Json(json!({
        "kind": "calendar#events",
        "items": [
            { "id": "e4", "start": { "dateTime": "2030-01-04T09:00:00Z" } },
            { "id": "e1", "start": { "dateTime": "2030-01-01T09:00:00Z" } },
            { "id": "e6", "start": { "dateTime": "2030-01-06T09:00:00Z" } },
            { "id": "e2", "start": { "date": "2030-01-02" } },
            { "id": "e5", "start": { "dateTime": "2030-01-05T11:00:00+02:00" } },
            { "id": "e3", "start": { "dateTime": "2030-01-03T09:00:00Z" } },
            { "id": "e7", "start": { "dateTime": "2030-01-07T09:00:00Z" } }
        ]
    }))
    .into_response()
}

async fn insert_event(
    State(fake): State<FakeGoogle>,
    Path(calendar_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(format!("events.insert/{}", calendar_id), &headers, HashMap::new(), body.clone());
    if let Some(rejection) = fake.rejection() {
        return rejection;
    }

    let mut created = body;
    created["id"] = json!("created-event");
    created["htmlLink"] = json!("https://calendar.google.com/event?eid=created-event");
    Json(created).into_response()
}

async fn insert_task(
    State(fake): State<FakeGoogle>,
    Path(task_list): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(format!("tasks.insert/{}", task_list), &headers, HashMap::new(), body.clone());
    if let Some(rejection) = fake.rejection() {
        return rejection;
    }

    let mut created = body;
    created["id"] = json!("created-task");
    created["status"] = json!("needsAction");
    Json(created).into_response()
}

/// Start the fake on an ephemeral port and point a client at it
async fn spawn_fake(fake: FakeGoogle) -> GoogleWorkspaceClient {
    let app = Router::new()
        .route(
            "/calendar/v3/calendars/{calendar_id}/events",
            get(list_events).post(insert_event),
        )
        .route("/tasks/v1/lists/{task_list}/tasks", post(insert_task))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config {
        calendar_api_base: format!("http://{}/calendar/v3", addr),
        tasks_api_base: format!("http://{}/tasks/v1", addr),
        ..Config::default()
    };
    GoogleWorkspaceClient::new(&config)
}

fn credential() -> BackendCredential {
    BackendCredential::new("ya29.test")
}

/// Listing queries from now, expands recurrences and returns at most five ordered events
#[tokio::test]
async fn test_list_upcoming_events() {
    let fake = FakeGoogle::default();
    let client = spawn_fake(fake.clone()).await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
    let events = client.list_upcoming_events(&credential(), now).await.unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e1", "e2", "e3", "e4", "e5"]);

    let requests = fake.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.path, "events.list/primary");
    assert_eq!(request.authorization.as_deref(), Some("Bearer ya29.test"));
    assert_eq!(request.query["maxResults"], "5");
    assert_eq!(request.query["singleEvents"], "true");
    assert_eq!(request.query["orderBy"], "startTime");
    assert_eq!(request.query["timeMin"], "2024-01-01T08:30:00Z");
}

/// Events go to the primary calendar with a default description
#[tokio::test]
async fn test_create_event() {
    let fake = FakeGoogle::default();
    let client = spawn_fake(fake.clone()).await;

    let created = client
        .create_event(
            &credential(),
            NewEvent {
                summary: Some("Meeting with John".to_string()),
                description: None,
                start: "2024-01-02T14:00:00".parse().unwrap(),
                end: "2024-01-02T15:00:00".parse().unwrap(),
                time_zone: chrono_tz::Europe::Helsinki,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, "created-event");
    assert_eq!(created.summary.as_deref(), Some("Meeting with John"));
    assert_eq!(created.start.date_time.as_deref(), Some("2024-01-02T14:00:00"));

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests[0].path, "events.insert/primary");
    assert_eq!(
        requests[0].body,
        json!({
            "summary": "Meeting with John",
            "description": "Created via Voice Agent",
            "start": { "dateTime": "2024-01-02T14:00:00", "timeZone": "Europe/Helsinki" },
            "end": { "dateTime": "2024-01-02T15:00:00", "timeZone": "Europe/Helsinki" }
        })
    );
}

/// Tasks go to the default list with the start mapped to the due date
#[tokio::test]
async fn test_create_task() {
    let fake = FakeGoogle::default();
    let client = spawn_fake(fake.clone()).await;

    let created = client
        .create_task(
            &credential(),
            NewTask {
                title: Some("Buy milk".to_string()),
                notes: Some("Oat".to_string()),
                due: Some("2024-01-02T00:00:00".parse().unwrap()),
                time_zone: chrono_tz::UTC,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, "created-task");
    assert_eq!(created.title.as_deref(), Some("Buy milk"));

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests[0].path, "tasks.insert/@default");
    assert_eq!(
        requests[0].body,
        json!({ "title": "Buy milk", "notes": "Oat", "due": "2024-01-02T00:00:00Z" })
    );
}

/// API errors become backend errors carrying Google's message
#[tokio::test]
async fn test_expired_credential() {
    let fake = FakeGoogle {
        reject: true,
        ..Default::default()
    };
    let client = spawn_fake(fake).await;

    let err = client.list_upcoming_events(&credential(), Utc::now()).await.unwrap_err();

    match err {
        Error::Backend(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("Invalid Credentials"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// An unreachable service is a backend error
#[tokio::test]
async fn test_unreachable_service() {
    let config = Config {
        calendar_api_base: "http://127.0.0.1:1/calendar/v3".to_string(),
        ..Config::default()
    };
    let client = GoogleWorkspaceClient::new(&config);

    let err = client.list_upcoming_events(&credential(), Utc::now()).await.unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
}
