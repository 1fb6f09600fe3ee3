//! Request handlers for the HTTP surface.

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::AppState;
use super::dashboard::render_dashboard;
use crate::telegram::Update;

const SERVICE_NAME: &str = "tiktok-downloader-bot";

/// Web dashboard with aggregate statistics.
#[get("/")]
pub async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.db.get_stats().await;

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_dashboard(&stats))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    service: &'static str,
}

/// Liveness probe for uptime monitoring; always 200.
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
    })
}

/// Inbound Telegram webhook.
///
/// Always acknowledges with `{"ok": true}`: a malformed payload is
/// logged and dropped, and update processing runs detached so the
/// acknowledgement is never held up by a download.
#[post("/webhook")]
pub async fn webhook(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            let handler = state.handler.clone();
            tokio::spawn(async move {
                handler.process_update(update).await;
            });
        }
        Err(e) => {
            debug!("Ignoring malformed webhook payload: {}", e);
        }
    }

    HttpResponse::Ok().json(serde_json::json!({"ok": true}))
}

/// Aggregate statistics as JSON.
#[get("/api/stats")]
pub async fn api_stats(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.db.get_stats().await;
    HttpResponse::Ok().json(stats)
}
