use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, header::CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::cli::ServeArgs;
use crate::dispatch::{Dispatcher, LookupOutcome};
use crate::error::LookupError;
use crate::registry::HttpRegistry;

#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
}

pub async fn run(opts: ServeArgs) -> anyhow::Result<()> {
    let registry = HttpRegistry::new(&opts.registry.registry_url, &opts.registry.api_version)?;
    let dispatcher = Dispatcher::new(Arc::new(registry), opts.registry.lookup_config());
    let app = router(dispatcher);

    let addr: SocketAddr = format!("{}:{}", opts.host, opts.port)
        .parse()
        .context("parse host:port")?;

    tracing::info!(registry = %opts.registry.registry_url, "Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(dispatcher: Dispatcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/npi",
            get(api_npi_lookup).fallback(api_method_not_allowed),
        )
        .route("/health", get(api_health))
        .layer(cors)
        .with_state(AppState { dispatcher })
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    npi: Option<String>,
}

#[derive(Debug, Serialize)]
struct LookupResponse {
    results: Vec<LookupOutcome>,
}

async fn api_npi_lookup(
    State(st): State<AppState>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<LookupResponse>, LookupError> {
    let raw = match params {
        Ok(Query(p)) => p.npi.filter(|s| !s.trim().is_empty()),
        Err(rejection) => {
            tracing::debug!(%rejection, "Unparsable lookup query");
            None
        }
    };
    let raw = raw.ok_or(LookupError::InvalidInput)?;

    let results = st.dispatcher.lookup(&raw).await?;
    Ok(Json(LookupResponse { results }))
}

async fn api_method_not_allowed() -> LookupError {
    LookupError::MethodNotAllowed
}

async fn api_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
