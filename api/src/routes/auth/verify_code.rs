use actix_web::{web, HttpResponse};
use posters_shared::{mask_credential, ApiResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::{handle_domain_error, validation_error_response};

/// Handler for POST /api/v1/auth/verify-code
///
/// A wrong, expired or already used code is a normal `200` with
/// `"verified": false`; only a store outage is an error.
///
/// # Request Body
///
/// ```json
/// { "channel": "email", "credential": "user@example.com", "code": "482913" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "success": true, "data": { "verified": true }, "timestamp": "2025-08-14T10:00:00Z" }
/// ```
///
/// ## Errors
/// - 400 `validation_error`: malformed credential or code
/// - 400 `unsupported_channel`: channel not configured
/// - 503 `store_unavailable`: entry store unreachable
pub async fn verify_code(
    state: web::Data<AppState>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();

    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let credential = request.credential.trim();

    match state
        .verification
        .verify(&request.channel, credential, &request.code)
        .await
    {
        Ok(verified) => {
            tracing::info!(
                channel = %request.channel,
                credential = %mask_credential(credential),
                verified,
                "Processed verify_code request"
            );
            HttpResponse::Ok().json(ApiResponse::success(VerifyCodeResponse { verified }))
        }
        Err(error) => handle_domain_error(error),
    }
}
