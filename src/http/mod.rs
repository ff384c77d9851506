use std::sync::Arc;

use actix_web::{dev::Server, http::StatusCode, web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;

use crate::metrics::Metrics;
use crate::models::RegionId;
use crate::proximity::{GetTournamentsByLocationCommand, ProximityEventQuery, QueryError};

// ============================================================================
// HTTP Surface
// ============================================================================
//
// GET /metrics        Prometheus text format
// GET /health         liveness
// GET /events/nearby  ?region_id=&per_page=&page=
//
// ============================================================================

const DEFAULT_PER_PAGE: i32 = 20;

pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub query: Arc<ProximityEventQuery>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub region_id: RegionId,
    pub per_page: Option<i32>,
    pub page: Option<u32>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler))
        .route("/events/nearby", web::get().to(nearby_events_handler));
}

/// Bind the HTTP server. The returned `Server` must be polled (spawned) to
/// start serving; stop it through `Server::handle`.
pub fn start_http_server(state: Arc<AppState>, port: u16) -> std::io::Result<Server> {
    tracing::info!("📊 Starting HTTP server on http://0.0.0.0:{}", port);

    let state = web::Data::from(state);
    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .workers(2)
        .disable_signals()
        .bind(("0.0.0.0", port))?
        .run();

    Ok(server)
}

pub fn status_for(error: &QueryError) -> StatusCode {
    match error {
        QueryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        QueryError::NotFound(_) | QueryError::ReferenceNotFound(_) => StatusCode::NOT_FOUND,
        QueryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::Query(_) | QueryError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tourney-intake"
    }))
}

async fn nearby_events_handler(state: web::Data<AppState>, params: web::Query<NearbyParams>) -> impl Responder {
    let command = GetTournamentsByLocationCommand {
        region_id: params.region_id,
        per_page: params.per_page.unwrap_or(DEFAULT_PER_PAGE),
    };

    match state.query.query(&command, params.page.unwrap_or(1)).await {
        Ok(events) => {
            state.metrics.record_query("ok");
            tracing::debug!(region_id = command.region_id, results = events.len(), "Nearby events served");
            HttpResponse::Ok().json(events)
        }
        Err(e) => {
            state.metrics.record_query(e.kind());
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(region_id = command.region_id, error = %e, "Nearby events query failed");
            } else {
                tracing::debug!(region_id = command.region_id, error = %e, "Nearby events query rejected");
            }
            HttpResponse::build(status).json(serde_json::json!({
                "error": e.kind(),
                "message": e.to_string(),
            }))
        }
    }
}
