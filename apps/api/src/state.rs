use std::sync::Arc;

use gatekeep_application::LoginService;
use ipnet::IpNet;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub login_service: LoginService,
    pub trusted_proxies: Arc<[IpNet]>,
}
