use actix_web::{web, HttpResponse};
use posters_shared::{mask_credential, ApiResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::{SendCodeRequest, SendCodeResponse};
use crate::handlers::{handle_domain_error, validation_error_response};

/// Handler for POST /api/v1/auth/send-code
///
/// Generates a code for the credential and queues it for delivery. Delivery
/// happens in the background, so the response is `202 Accepted` even if the
/// provider later fails.
///
/// # Request Body
///
/// ```json
/// { "channel": "email", "credential": "user@example.com" }
/// ```
///
/// # Response
///
/// ## Success (202 Accepted)
/// ```json
/// {
///     "success": true,
///     "data": { "message": "Verification code sent", "expires_in": 240 },
///     "timestamp": "2025-08-14T10:00:00Z"
/// }
/// ```
///
/// ## Errors
/// - 400 `validation_error`: malformed credential
/// - 400 `unsupported_channel`: channel not configured
pub async fn send_code(
    state: web::Data<AppState>,
    request: web::Json<SendCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();

    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let credential = request.credential.trim();
    tracing::info!(
        channel = %request.channel,
        credential = %mask_credential(credential),
        "Processing send_code request"
    );

    match state.verification.send(&request.channel, credential).await {
        Ok(()) => HttpResponse::Accepted().json(ApiResponse::success(SendCodeResponse {
            message: "Verification code sent".to_string(),
            expires_in: state.code_ttl_seconds,
        })),
        Err(error) => handle_domain_error(error),
    }
}
