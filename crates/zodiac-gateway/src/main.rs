//! Zodiac Oracle gateway: landing page, `/process` birth charts and `/process_message` chat.
//! Every JSON endpoint answers HTTP 200 with a `status` envelope.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{Html, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zodiac_core::{AppConfig, AstroError, AstroService, BirthDetailsRequest, EphemerisBackend};

const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
struct AppState {
    service: Arc<AstroService>,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    if config.ephemeris.backend == EphemerisBackend::Swiss && config.ephemeris.auto_download {
        let fetched = zodiac_core::ensure_ephemeris_files(
            &config.ephemeris.path,
            &config.ephemeris.data_url,
            &reqwest::Client::new(),
        )
        .await?;
        if !fetched.is_empty() {
            tracing::info!(count = fetched.len(), path = %config.ephemeris.path.display(), "ephemeris files downloaded");
        }
    }

    let service = AstroService::from_config(&config)?;
    let app = build_app(AppState {
        service: Arc::new(service),
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        app = %config.app_name,
        version = zodiac_core::version(),
        %addr,
        "gateway listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .route("/process", post(process_birth_details))
        .route("/process_message", post(process_message))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn serve_index() -> Html<&'static str> {
    const INDEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));
    Html(INDEX)
}

/// Header first, then the body's `session_id`; `None` selects the shared default slot.
fn session_from(headers: &HeaderMap, body_session: Option<&str>) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(body_session)
        .map(str::to_string)
}

fn error_envelope(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "status": "error", "message": message.into() }))
}

fn astro_error_envelope(err: &AstroError) -> Json<Value> {
    match err {
        AstroError::CalculationFailed(_) | AstroError::Internal(_) => {
            error_envelope(format!("Error processing birth details: {err}"))
        }
        _ => error_envelope(err.to_string()),
    }
}

async fn process_birth_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BirthDetailsRequest>, JsonRejection>,
) -> Json<Value> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "malformed /process body");
            return error_envelope(format!("Invalid request body: {}", rejection.body_text()));
        }
    };

    let session = session_from(&headers, req.session_id.as_deref());
    match state.service.process(&req, session.as_deref()).await {
        Ok(chart) => Json(json!({
            "status": "success",
            "sun_sign": chart.sun_sign,
            "moon_sign": chart.moon_sign,
            "ascendant": chart.ascendant,
            "traits": chart.traits,
        })),
        Err(e) => astro_error_envelope(&e),
    }
}

async fn process_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<Value> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "malformed /process_message body");
            return error_envelope(format!("Invalid request body: {}", rejection.body_text()));
        }
    };

    let session = session_from(&headers, req.session_id.as_deref());
    let message = req.message.as_deref().unwrap_or_default();
    match state.service.respond(message, session.as_deref()) {
        Ok(response) => Json(json!({ "status": "success", "response": response })),
        Err(e) => error_envelope(e.to_string()),
    }
}
