use actix_web::{web, HttpResponse};

use crate::app::AppState;

/// Health check endpoint handler
///
/// Reports `503` when the Redis entry store does not answer a PING.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = match &state.redis {
        Some(redis) => redis.health_check().await.unwrap_or(false),
        None => true,
    };
    let status = if store_healthy { "healthy" } else { "unhealthy" };
    let channels: Vec<&str> = state
        .verification
        .registry()
        .channels()
        .iter()
        .map(|channel| channel.as_str())
        .collect();

    let body = serde_json::json!({
        "status": status,
        "service": "posters-api",
        "version": env!("CARGO_PKG_VERSION"),
        "channels": channels,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if store_healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
