use crate::error::{config_error, env_error, AgentResult};
use chrono::Duration;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::str::FromStr;

/// Default Gemini model used for intent resolution
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Default Gemini API base URL
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default Google Calendar API base URL
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Default Google Tasks API base URL
pub const DEFAULT_TASKS_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";
/// Longest default duration accepted for events without an end
pub const MAX_EVENT_MINUTES: i64 = 7 * 24 * 60;
/// Path of the optional overrides file
pub const OVERRIDES_PATH: &str = "config/agent.toml";

/// Main configuration structure for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key
    pub gemini_api_key: String,
    /// Gemini model name
    pub gemini_model: String,
    /// Gemini API base URL
    pub gemini_api_base: String,
    /// Secret used to verify session tokens
    pub session_secret: String,
    /// Google Calendar API base URL
    pub calendar_api_base: String,
    /// Google Tasks API base URL
    pub tasks_api_base: String,
    /// Calendar that events are created in and listed from
    pub calendar_id: String,
    /// Task list that tasks are added to
    pub task_list: String,
    /// Timezone used when the client sends none or an invalid one
    pub default_timezone: String,
    /// Duration of an event without an explicit end
    pub default_event_minutes: i64,
    /// Maximum number of events returned by a listing
    pub upcoming_events_limit: usize,
    /// Address to bind the HTTP server to
    pub bind_address: String,
    /// Port for the HTTP server
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Locale for user facing messages
    pub locale: String,
}

/// Non-secret values that may be overridden from `config/agent.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub gemini_model: Option<String>,
    pub calendar_id: Option<String>,
    pub task_list: Option<String>,
    pub default_timezone: Option<String>,
    pub default_event_minutes: Option<i64>,
    pub upcoming_events_limit: Option<usize>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: Option<u64>,
    pub locale: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            session_secret: String::new(),
            calendar_api_base: DEFAULT_CALENDAR_API_BASE.to_string(),
            tasks_api_base: DEFAULT_TASKS_API_BASE.to_string(),
            calendar_id: "primary".to_string(),
            task_list: "@default".to_string(),
            default_timezone: "UTC".to_string(),
            default_event_minutes: 60,
            upcoming_events_limit: 5,
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            locale: "en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AgentResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        // Required environment variables
        let gemini_api_key = env::var("GEMINI_API_KEY").map_err(|_| env_error("GEMINI_API_KEY"))?;
        let session_secret = env::var("SESSION_SECRET").map_err(|_| env_error("SESSION_SECRET"))?;

        let mut config = Config {
            gemini_api_key,
            session_secret,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_base: env::var("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            calendar_api_base: env::var("GOOGLE_CALENDAR_API_BASE")
                .unwrap_or(defaults.calendar_api_base),
            tasks_api_base: env::var("GOOGLE_TASKS_API_BASE").unwrap_or(defaults.tasks_api_base),
            calendar_id: env::var("GOOGLE_CALENDAR_ID").unwrap_or(defaults.calendar_id),
            task_list: env::var("GOOGLE_TASK_LIST").unwrap_or(defaults.task_list),
            default_timezone: env::var("DEFAULT_TIMEZONE").unwrap_or(defaults.default_timezone),
            default_event_minutes: parse_env("DEFAULT_EVENT_MINUTES", defaults.default_event_minutes)?,
            upcoming_events_limit: parse_env("UPCOMING_EVENTS_LIMIT", defaults.upcoming_events_limit)?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_env("PORT", defaults.port)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            locale: env::var("AGENT_LOCALE").unwrap_or(defaults.locale),
        };

        // Load overrides from file if it exists
        if let Ok(content) = fs::read_to_string(OVERRIDES_PATH) {
            let overrides: ConfigOverrides = toml::from_str(&content)?;
            config.apply_overrides(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge file overrides into the configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.gemini_model {
            self.gemini_model = v;
        }
        if let Some(v) = overrides.calendar_id {
            self.calendar_id = v;
        }
        if let Some(v) = overrides.task_list {
            self.task_list = v;
        }
        if let Some(v) = overrides.default_timezone {
            self.default_timezone = v;
        }
        if let Some(v) = overrides.default_event_minutes {
            self.default_event_minutes = v;
        }
        if let Some(v) = overrides.upcoming_events_limit {
            self.upcoming_events_limit = v;
        }
        if let Some(v) = overrides.bind_address {
            self.bind_address = v;
        }
        if let Some(v) = overrides.port {
            self.port = v;
        }
        if let Some(v) = overrides.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = overrides.locale {
            self.locale = v;
        }
    }

    /// Check values that would otherwise fail deep inside a request
    pub fn validate(&self) -> AgentResult<()> {
        if self.default_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(config_error(&format!(
                "Invalid default timezone: {}",
                self.default_timezone
            )));
        }
        self.event_duration()?;
        if self.upcoming_events_limit == 0 {
            return Err(config_error("Upcoming events limit must be at least 1"));
        }
        Ok(())
    }

    /// Duration given to events without an end time
    pub fn event_duration(&self) -> AgentResult<Duration> {
        if self.default_event_minutes <= 0 {
            return Err(config_error("Default event duration must be positive"));
        }
        if self.default_event_minutes > MAX_EVENT_MINUTES {
            return Err(config_error(&format!(
                "Default event duration must be at most {} minutes",
                MAX_EVENT_MINUTES
            )));
        }
        Duration::try_minutes(self.default_event_minutes)
            .ok_or_else(|| config_error("Default event duration is out of range"))
    }

    /// Default timezone, parsed
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.default_timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

/// Parse an optional numeric environment variable
fn parse_env<T: FromStr>(name: &str, default: T) -> AgentResult<T> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| env_error(&format!("Invalid {} format", name))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_merge() {
        let mut config = Config::default();
        let overrides: ConfigOverrides = toml::from_str(
            r#"
            calendar_id = "team@example.com"
            upcoming_events_limit = 3
            "#,
        )
        .unwrap();

        config.apply_overrides(overrides);

        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(config.upcoming_events_limit, 3);
        assert_eq!(config.task_list, "@default");
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let config = Config {
            default_timezone: "Mars/Olympus".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_event_duration() {
        for minutes in [0, -30, MAX_EVENT_MINUTES + 1, 1_000_000_000_000, i64::MAX] {
            let config = Config {
                default_event_minutes: minutes,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{} minutes accepted", minutes);
        }

        let config = Config {
            default_event_minutes: MAX_EVENT_MINUTES,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.event_duration().unwrap(), Duration::days(7));
        assert_eq!(Config::default().event_duration().unwrap(), Duration::hours(1));
    }
}
