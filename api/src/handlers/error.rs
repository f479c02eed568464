use actix_web::HttpResponse;
use posters_core::errors::DomainError;
use posters_shared::ApiResponse;
use validator::ValidationErrors;

/// Convert a domain error into its HTTP response
///
/// | error                                      | status | code                  |
/// |--------------------------------------------|--------|-----------------------|
/// | `UnsupportedChannel`                       | 400    | `unsupported_channel` |
/// | `Store`                                    | 503    | `store_unavailable`   |
/// | `UnsupportedGenerator`, `InvalidCodeLength`| 500    | `internal_error`      |
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match &error {
        DomainError::UnsupportedChannel { .. } => {
            tracing::warn!(error = %error, "Rejected request for unsupported channel");
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "unsupported_channel",
                error.to_string(),
            ))
        }
        DomainError::Store(_) => {
            tracing::error!(error = %error, "Entry store unavailable");
            HttpResponse::ServiceUnavailable().json(ApiResponse::<()>::error(
                "store_unavailable",
                "Verification is temporarily unavailable, please try again later",
            ))
        }
        // Generator settings come from server config, never from the caller
        DomainError::UnsupportedGenerator { .. } | DomainError::InvalidCodeLength { .. } => {
            tracing::error!(error = %error, "Internal error while handling request");
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "internal_error",
                "An internal error occurred",
            ))
        }
    }
}

/// 400 response listing the failed fields
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<String> = errors
        .errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();

    tracing::debug!(fields = ?fields, "Request validation failed");

    HttpResponse::BadRequest().json(ApiResponse::<()>::error(
        "validation_error",
        format!("Invalid request data: {}", fields.join(", ")),
    ))
}
