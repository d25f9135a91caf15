use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use gatekeep_core::AppError;
use gatekeep_domain::{DEFAULT_DECAY_SECONDS, DEFAULT_MAX_ATTEMPTS, ThrottlePolicy};
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;

/// Process subcommand selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
}

impl ApiCommand {
    fn parse(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ThrottleStoreConfig {
    Postgres,
    Redis { redis_url: String },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutSinkConfig {
    Tracing,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct SeedAdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub throttle_store: ThrottleStoreConfig,
    pub lockout_sink: LockoutSinkConfig,
    pub throttle_policy: ThrottlePolicy,
    pub trusted_proxies: Vec<IpNet>,
    pub purge_interval_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::parse(env::args().nth(1).as_deref())?;

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let throttle_store = match env::var("THROTTLE_STORE")
            .unwrap_or_else(|_| "postgres".to_owned())
            .as_str()
        {
            "postgres" => ThrottleStoreConfig::Postgres,
            "redis" => ThrottleStoreConfig::Redis {
                redis_url: required_non_empty_env("REDIS_URL")?,
            },
            "memory" => ThrottleStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "THROTTLE_STORE must be one of 'postgres', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        let lockout_sink = match env::var("LOCKOUT_EVENT_SINK")
            .unwrap_or_else(|_| "tracing".to_owned())
            .as_str()
        {
            "tracing" => LockoutSinkConfig::Tracing,
            "postgres" => LockoutSinkConfig::Postgres,
            other => {
                return Err(AppError::Validation(format!(
                    "LOCKOUT_EVENT_SINK must be either 'tracing' or 'postgres', got '{other}'"
                )));
            }
        };

        let throttle_policy = ThrottlePolicy::new(
            parsed_env("LOGIN_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            parsed_env("LOGIN_DECAY_SECONDS", DEFAULT_DECAY_SECONDS)?,
        )?;

        let trusted_proxies =
            parse_trusted_proxies(&env::var("TRUSTED_PROXIES").unwrap_or_default())?;
        let purge_interval_seconds = parsed_env("THROTTLE_PURGE_INTERVAL_SECONDS", 300_u64)?;

        Ok(Self {
            command,
            database_url,
            frontend_url,
            api_host,
            api_port,
            throttle_store,
            lockout_sink,
            throttle_policy,
            trusted_proxies,
            purge_interval_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

impl SeedAdminConfig {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            name: env::var("ADMIN_SEED_NAME").unwrap_or_else(|_| "Administrator".to_owned()),
            email: required_non_empty_env("ADMIN_SEED_EMAIL")?,
            password: required_non_empty_env("ADMIN_SEED_PASSWORD")?,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Parses a comma separated CIDR list. Bare addresses are host networks.
pub fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!("invalid TRUSTED_PROXIES entry '{entry}': {error}"))
                })
        })
        .collect()
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
