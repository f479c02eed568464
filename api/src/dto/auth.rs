use posters_shared::validation::{is_valid_code, is_valid_email, is_valid_phone};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn default_channel() -> String {
    String::from("email")
}

/// Credentials must match the channel they are sent over. Unknown channels
/// pass here and are rejected by the verification service.
fn check_credential(channel: &str, credential: &str) -> Result<(), ValidationError> {
    let valid = match channel.trim().to_lowercase().as_str() {
        "email" => is_valid_email(credential.trim()),
        "sms" => is_valid_phone(credential.trim()),
        _ => true,
    };

    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_credential");
        error.message = Some(format!("Credential is not a valid {} destination", channel).into());
        Err(error)
    }
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_code(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_code");
        error.message = Some("Code must be 4 to 12 digits".into());
        Err(error)
    }
}

fn validate_send_code(request: &SendCodeRequest) -> Result<(), ValidationError> {
    check_credential(&request.channel, &request.credential)
}

fn validate_verify_code(request: &VerifyCodeRequest) -> Result<(), ValidationError> {
    check_credential(&request.channel, &request.credential)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_send_code"))]
pub struct SendCodeRequest {
    /// Delivery channel, `"email"` unless given
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Email address (or phone number for `sms`)
    #[validate(length(min = 1, max = 254))]
    pub credential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_verify_code"))]
pub struct VerifyCodeRequest {
    #[serde(default = "default_channel")]
    pub channel: String,

    #[validate(length(min = 1, max = 254))]
    pub credential: String,

    /// Code as received, surrounding whitespace allowed
    #[validate(custom(function = "validate_code"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    pub message: String,
    /// Seconds until the code stops being accepted
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}
