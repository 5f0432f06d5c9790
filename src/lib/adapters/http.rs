use std::any::Any;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_server::tls_rustls::RustlsConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::core::{Note, NoteInput, NotesError};
use crate::service::NoteService;
use crate::transport::{configure_tls, serve_tls, shutdown_signal};

#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
}

impl AppState {
    pub fn new(notes: NoteService) -> Self {
        Self { notes }
    }
}

/// Every failure reaches the client as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(&'static str),
    #[error("Something went wrong!")]
    Unhandled,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Unhandled => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Maps a service failure onto the wire, logging infrastructure errors in
/// full and replying with `message` only.
trait OrFail<T> {
    fn or_fail(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrFail<T> for Result<T, NotesError> {
    fn or_fail(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| match &err {
            NotesError::TitleRequired => ApiError::BadRequest(err.to_string()),
            NotesError::NotFound => ApiError::NotFound(err.to_string()),
            _ => {
                tracing::error!(error = %err, "{message}");
                ApiError::Internal(message)
            }
        })
    }
}

/// JSON request body. A request that is not `application/json`, has an
/// empty body, or carries a JSON array yields `T::default()`. Unparsable
/// JSON and top-level scalars are a generic server error.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::error!(error = %e, "failed to read request body");
            ApiError::Unhandled
        })?;
        if !is_json || bytes.is_empty() {
            return Ok(JsonBody(T::default()));
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(error = %e, "malformed JSON body");
            ApiError::Unhandled
        })?;
        if value.is_array() {
            return Ok(JsonBody(T::default()));
        }
        if !value.is_object() {
            tracing::error!(body = %value, "JSON body must be an object or array");
            return Err(ApiError::Unhandled);
        }
        serde_json::from_value(value).map(JsonBody).map_err(|e| {
            tracing::error!(error = %e, "unexpected JSON body shape");
            ApiError::Unhandled
        })
    }
}

fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// The raw `:id` path segment. A segment that cannot be decoded is a generic
/// server error rather than axum's plain-text rejection.
pub struct NoteId(pub String);

impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "undecodable note id");
                ApiError::Unhandled
            })?;
        Ok(NoteId(id))
    }
}

#[derive(Serialize)]
pub struct DeletedNote {
    pub message: &'static str,
    pub note: Note,
}

pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.notes.list().await.or_fail("Could not fetch notes")?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
) -> Result<Json<Note>, ApiError> {
    let note = state.notes.get(&id).await.or_fail("Could not fetch note")?;
    Ok(Json(note))
}

pub async fn create_note(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NoteInput>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.notes.create(input).await.or_fail("Could not create note")?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
    JsonBody(input): JsonBody<NoteInput>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .notes
        .update(&id, input)
        .await
        .or_fail("Could not update note")?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
) -> Result<Json<DeletedNote>, ApiError> {
    let note = state.notes.delete(&id).await.or_fail("Could not delete note")?;
    Ok(Json(DeletedNote {
        message: "Note deleted",
        note,
    }))
}

async fn health_route() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Notes API is running" }))
}

async fn test_route() -> Json<Value> {
    Json(json!({ "message": "Server is running!" }))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::Unhandled.into_response()
}

pub fn router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        });

    Router::new()
        .route("/health", get(health_route))
        .route("/test", get(test_route))
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

enum Listener {
    Plain(net::TcpListener),
    Tls { addr: SocketAddr, config: RustlsConfig },
}

pub struct HttpServer {
    router: Router,
    listener: Listener,
}

impl HttpServer {
    pub async fn new(notes: NoteService, config: &ServerConfig) -> anyhow::Result<Self> {
        let router = router(AppState::new(notes));
        let addr = SocketAddr::from((config.host, config.port));

        let listener = match &config.tls {
            Some(files) => {
                let tls = configure_tls(files.cert_path.clone(), files.key_path.clone())
                    .await
                    .context("failed to load TLS certificate and key")?;
                Listener::Tls { addr, config: tls }
            }
            None => Listener::Plain(
                net::TcpListener::bind(&addr)
                    .await
                    .with_context(|| format!("failed to listen on port {}", config.port))?,
            ),
        };

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.listener {
            Listener::Plain(listener) => {
                let addr = listener.local_addr()?;
                tracing::info!(addr = %addr, "notes API listening");
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(shutdown_signal())
                    .await
                    .context("received error from running server")?;
            }
            Listener::Tls { addr, config } => {
                serve_tls(addr, config, self.router)
                    .await
                    .context("received error from running server")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("application/x-www-form-urlencoded"));
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (ApiError::BadRequest("Title is required".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("Note not found".into()), StatusCode::NOT_FOUND),
            (ApiError::Internal("Could not fetch notes"), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Unhandled, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn store_failures_hide_their_detail() {
        let result: Result<(), NotesError> =
            Err(NotesError::Unavailable("connection refused to 10.0.0.5".into()));
        let err = result.or_fail("Could not fetch notes").unwrap_err();
        assert_eq!(err.to_string(), "Could not fetch notes");

        let result: Result<(), NotesError> = Err(NotesError::InvalidId("abc".into()));
        let err = result.or_fail("Could not fetch note").unwrap_err();
        assert!(matches!(err, ApiError::Internal("Could not fetch note")));
    }
}
