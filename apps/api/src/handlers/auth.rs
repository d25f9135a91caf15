use std::net::SocketAddr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use gatekeep_application::LoginAttempt;

use crate::client_address::resolve_client_address;
use crate::dto::{AdminLoginRequest, AdminLoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /admin/login - Authenticate an administrator with email+password.
pub async fn admin_login_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> ApiResult<Json<AdminLoginResponse>> {
    let Json(payload) = payload?;
    let ip_address = resolve_client_address(peer, &headers, &state.trusted_proxies);

    let admin = state
        .login_service
        .authenticate(LoginAttempt {
            email: payload.email,
            password: payload.password,
            remember: payload.remember,
            ip_address: ip_address.to_string(),
        })
        .await?;

    Ok(Json(AdminLoginResponse::from(admin)))
}
