//! Route handlers and request/response DTOs.
//!
//! Every failure is reported as `{"error": "<Operation> failed: <reason>"}`
//! with a status chosen from the error kind.

use axum::{
    Router,
    extract::{Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use ragdock_core::Error;
use ragdock_rag::{Answer, FileIngestReport, IngestReport, ResetReport, Stats};

use crate::SharedState;

/// All routes, without state or layers.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/collections", get(collections_handler))
        .route("/ingest/text", post(ingest_text_handler))
        .route("/ingest/file", post(ingest_file_handler))
        .route("/remember", post(remember_handler))
        .route("/query", post(query_handler))
        .route("/chat", post(chat_handler))
        .route("/reset", delete(reset_handler))
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IngestTextRequest {
    text: String,
    #[serde(default = "default_source")]
    source: String,
}

fn default_source() -> String {
    "api".into()
}

#[derive(Deserialize)]
struct RememberRequest {
    fact: String,
}

#[derive(Serialize)]
struct RememberResponse {
    status: &'static str,
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
    #[serde(default)]
    top_k: Option<i64>,
}

#[derive(Deserialize)]
struct ChatRequest {
    session_id: String,
    message: String,
    #[serde(default)]
    top_k: Option<i64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a pipeline error to its HTTP status.
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::UnsupportedInputFormat(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::EmbeddingService(_) | Error::ChatService(_) => StatusCode::BAD_GATEWAY,
        Error::VectorService(_) | Error::InvalidConfiguration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn api_error(operation: &'static str) -> impl FnOnce(Error) -> ApiError {
    move |err| {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(operation, error = %err, "Request failed");
        } else {
            info!(operation, error = %err, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: format!("{operation} failed: {err}"),
            }),
        )
    }
}

/// Unwrap a JSON body, reporting a rejected one in the usual error shape.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    operation: &'static str,
) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(operation)(Error::InvalidRequest(rejection.body_text())))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn collections_handler(State(state): State<SharedState>) -> Result<Json<Stats>, ApiError> {
    state.stats().await.map(Json).map_err(api_error("Stats"))
}

async fn ingest_text_handler(
    State(state): State<SharedState>,
    payload: Result<Json<IngestTextRequest>, JsonRejection>,
) -> Result<Json<IngestReport>, ApiError> {
    let payload = json_body(payload, "Ingest")?;
    info!(source = %payload.source, bytes = payload.text.len(), "ingest/text request");
    state
        .ingest_text(&payload.text, &payload.source)
        .await
        .map(Json)
        .map_err(api_error("Ingest"))
}

async fn ingest_file_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<FileIngestReport>, ApiError> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err((
                    e.status(),
                    Json(ErrorResponse {
                        error: format!("Ingest failed: {}", e.body_text()),
                    }),
                ));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Ingest failed: {}", e.body_text()),
                }),
            )
        })?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        api_error("Ingest")(Error::InvalidRequest(
            "multipart field 'file' is required".into(),
        ))
    })?;

    info!(file = ?filename, bytes = bytes.len(), "ingest/file request");
    state
        .ingest_file(filename.as_deref(), bytes)
        .await
        .map(Json)
        .map_err(api_error("Ingest"))
}

async fn remember_handler(
    State(state): State<SharedState>,
    payload: Result<Json<RememberRequest>, JsonRejection>,
) -> Result<Json<RememberResponse>, ApiError> {
    let payload = json_body(payload, "Remember")?;
    let ids = state
        .remember(&payload.fact)
        .await
        .map_err(api_error("Remember"))?;
    Ok(Json(RememberResponse { status: "ok", ids }))
}

async fn query_handler(
    State(state): State<SharedState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let payload = json_body(payload, "Query")?;
    info!(top_k = ?payload.top_k, "query request");
    state
        .query(&payload.question, payload.top_k)
        .await
        .map(Json)
        .map_err(api_error("Query"))
}

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let payload = json_body(payload, "Chat")?;
    info!(session_id = %payload.session_id, top_k = ?payload.top_k, "chat request");
    state
        .chat(&payload.session_id, &payload.message, payload.top_k)
        .await
        .map(Json)
        .map_err(api_error("Chat"))
}

async fn reset_handler(State(state): State<SharedState>) -> Result<Json<ResetReport>, ApiError> {
    state.reset().await.map(Json).map_err(api_error("Reset"))
}
