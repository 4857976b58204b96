use super::auth::Session;
use super::AppState;
use crate::components::ResultEnvelope;
use crate::error::ErrorKind;
use crate::utils::time::parse_timezone;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_i18n::t;
use serde::Deserialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Body of a voice request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_timezone: Option<String>,
}

/// Status code for an envelope
pub fn status_for(envelope: &ResultEnvelope) -> StatusCode {
    match envelope.failure() {
        None => StatusCode::OK,
        Some(ErrorKind::Authentication) => StatusCode::UNAUTHORIZED,
        Some(ErrorKind::InvalidInput) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler for voice requests: resolve the intent and run it
pub async fn process_voice_handler(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<VoiceRequest>, JsonRejection>,
) -> (StatusCode, Json<ResultEnvelope>) {
    let locale = state.config.locale.as_str();

    let text = match payload {
        Ok(Json(request)) => request
            .text
            .filter(|t| !t.trim().is_empty())
            .map(|text| (text, request.user_timezone)),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection);
            None
        }
    };

    let Some((text, user_timezone)) = text else {
        let envelope = ResultEnvelope::failed(ErrorKind::InvalidInput, t!("no_text", locale = locale));
        return (StatusCode::BAD_REQUEST, Json(envelope));
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("process_voice", %request_id, user = %session.claims.sub);

    let envelope = async {
        let timezone = parse_timezone(user_timezone.as_deref(), state.config.timezone());
        let now = (state.clock)();
        info!("Processing request in {}", timezone);

        match state.resolver.resolve(&text, now, timezone.name()).await {
            Ok(descriptor) => {
                state
                    .dispatcher
                    .dispatch(descriptor, &session.credential(), timezone)
                    .await
            }
            Err(e) => {
                warn!("Intent resolution failed: {}", e);
                ResultEnvelope::from_error(&e)
            }
        }
    }
    .instrument(span)
    .await;

    (status_for(&envelope), Json(envelope))
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
