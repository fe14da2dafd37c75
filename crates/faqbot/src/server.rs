//! HTTP server for the chat page and JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Empty chat form |
//! | `POST` | `/` | Submit form field `query`, render the reply |
//! | `POST` | `/api/ask` | JSON `{ "query": "..." }` → [`ChatReply`] |
//! | `GET`  | `/health` | Health check (version and corpus size) |
//!
//! # Error Contract
//!
//! JSON errors carry a machine-readable code:
//!
//! ```json
//! { "error": { "code": "model_error", "message": "Ollama connection error (...)" } }
//! ```
//!
//! Error codes: `model_error` (502) when an embedding or generation call
//! fails, `internal` (500) otherwise. The HTML route renders the same
//! failures as an error page. A request without a `query` field is
//! rejected by the extractor before any handler runs.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::{self, ChatReply};
use crate::context::AppContext;
use crate::page;

/// Request body for both `POST /` (form-encoded) and `POST /api/ask` (JSON).
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    pub query: String,
}

/// Build the application router over a shared context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_form).post(handle_submit))
        .route("/api/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve on `server.bind` until the process is terminated.
pub async fn run_server(ctx: AppContext) -> anyhow::Result<()> {
    let bind_addr = ctx.config.server.bind.clone();
    let app = router(Arc::new(ctx));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "chat server listening");
    println!("Chat server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Map a chat failure to an error response.
///
/// Every fallible step of the chat flow after startup is a model call, so
/// failures whose message names a model service are reported as
/// `model_error`.
fn classify_chat_error(err: &anyhow::Error) -> AppError {
    let message = format!("{:#}", err);
    let is_model = ["OpenAI", "Ollama", "embedding", "Embedding", "Generation"]
        .iter()
        .any(|needle| message.contains(needle));

    if is_model {
        AppError {
            status: StatusCode::BAD_GATEWAY,
            code: "model_error".to_string(),
            message,
        }
    } else {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message,
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    questions: usize,
}

async fn handle_health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        questions: ctx.corpus.len(),
    })
}

async fn handle_form(State(ctx): State<Arc<AppContext>>) -> Html<String> {
    Html(page::render_chat(&ctx.config.server.title, "", None))
}

async fn handle_submit(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<QueryForm>,
) -> Response {
    let title = &ctx.config.server.title;
    match chat::ask(&ctx, &form.query).await {
        Ok(reply) => Html(page::render_chat(title, &form.query, Some(&reply))).into_response(),
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "chat request failed");
            let status = classify_chat_error(&err).status;
            (status, Html(page::render_error(title, &format!("{:#}", err)))).into_response()
        }
    }
}

async fn handle_ask(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<QueryForm>,
) -> Result<Json<ChatReply>, AppError> {
    chat::ask(&ctx, &request.query).await.map(Json).map_err(|err| {
        tracing::error!(error = %format!("{:#}", err), "chat request failed");
        classify_chat_error(&err)
    })
}
