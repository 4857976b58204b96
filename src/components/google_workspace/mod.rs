mod client;
pub mod models;
pub mod time;

pub use client::{GoogleWorkspaceClient, DEFAULT_EVENT_DESCRIPTION};
pub use models::{CalendarEvent, EventDateTime, NewEvent, NewTask, TaskItem};
