use gatekeep_application::AuthenticatedAdmin;
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for administrator login.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// API representation of an authenticated administrator.
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub status: &'static str,
    pub admin: AdminResponse,
    pub remember: bool,
}

impl From<AuthenticatedAdmin> for AdminLoginResponse {
    fn from(admin: AuthenticatedAdmin) -> Self {
        Self {
            status: "authenticated",
            admin: AdminResponse {
                id: admin.id.to_string(),
                name: admin.name,
                email: admin.email,
            },
            remember: admin.remember,
        }
    }
}
