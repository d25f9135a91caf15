use serde::Serialize;

/// Field the login form reports errors under.
const LOGIN_ERROR_FIELD: &str = "email";

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_minutes: Option<u64>,
}

impl ErrorResponse {
    pub(super) fn new(message: String) -> Self {
        Self {
            message,
            field: None,
            retry_after_seconds: None,
            retry_after_minutes: None,
        }
    }

    pub(super) fn for_login_field(message: String) -> Self {
        Self {
            field: Some(LOGIN_ERROR_FIELD),
            ..Self::new(message)
        }
    }

    pub(super) fn locked(
        message: String,
        retry_after_seconds: u64,
        retry_after_minutes: u64,
    ) -> Self {
        Self {
            retry_after_seconds: Some(retry_after_seconds),
            retry_after_minutes: Some(retry_after_minutes),
            ..Self::for_login_field(message)
        }
    }
}
