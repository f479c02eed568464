//! Application state and route configuration

use std::sync::Arc;

use actix_web::{error::InternalError, web, HttpResponse};
use posters_core::services::verification::VerificationService;
use posters_infra::cache::RedisClient;
use posters_shared::ApiResponse;

use crate::routes::auth::{send_code::send_code, verify_code::verify_code};
use crate::routes::health::health_check;

/// Shared state handed to every handler
pub struct AppState {
    pub verification: Arc<VerificationService>,
    /// Lifetime of a sent code, reported back to clients
    pub code_ttl_seconds: u64,
    /// Checked by `/health` when present
    pub redis: Option<RedisClient>,
}

impl AppState {
    pub fn new(verification: Arc<VerificationService>) -> Self {
        let code_ttl_seconds = verification.config().entry_ttl.as_secs();
        Self {
            verification,
            code_ttl_seconds,
            redis: None,
        }
    }

    pub fn with_redis(mut self, redis: RedisClient) -> Self {
        self.redis = Some(redis);
        self
    }
}

/// Register all routes
///
/// ```text
/// GET  /health
/// POST /api/v1/auth/send-code
/// POST /api/v1/auth/verify-code
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/send-code", web::post().to(send_code))
                    .route("/verify-code", web::post().to(verify_code)),
            ),
        );
}

/// Reject unparsable JSON bodies with the same envelope as field validation
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "validation_error",
            err.to_string(),
        ));
        InternalError::from_response(err, response).into()
    })
}

/// Default 404 handler
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        "not_found",
        "The requested resource was not found",
    ))
}
