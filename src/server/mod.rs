//! HTTP surface module.
//!
//! Serves the stats dashboard, the liveness probe, the Telegram webhook
//! receiver, and the JSON stats endpoint.

mod dashboard;
mod routes;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::bot::UpdateHandler;
use crate::storage::Database;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer, for stats reads.
    pub db: Arc<Database>,

    /// Webhook update handler.
    pub handler: Arc<UpdateHandler>,
}

/// Binds and runs the HTTP server until shutdown.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn run(state: AppState, port: u16) -> std::io::Result<()> {
    info!("HTTP server listening on 0.0.0.0:{}", port);

    let data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(routes::dashboard)
            .service(routes::health)
            .service(routes::webhook)
            .service(routes::api_stats)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
