use std::time::Duration;

use core_config::{
    AppInfo, Environment, FromEnv, app_info, env_or_default, env_parse_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use eyre::WrapErr;

/// Where the HTTP gateway sends its gRPC calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    pub grpc_endpoint: String,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Reads `GATEWAY_GRPC_ENDPOINT` (default: this process on `grpc_port`) and
    /// `GATEWAY_REQUEST_TIMEOUT_SECS` (default: 30).
    pub fn from_env(grpc_port: u16) -> Result<Self, core_config::ConfigError> {
        let grpc_endpoint =
            env_or_default("GATEWAY_GRPC_ENDPOINT", &format!("http://127.0.0.1:{grpc_port}"));
        let timeout_secs = env_parse_or_default("GATEWAY_REQUEST_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            grpc_endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub database: PostgresConfig,
    pub grpc: grpc_client::server::ServerConfig,
    pub http: ServerConfig,
    pub gateway: GatewayConfig,
    pub run_migrations: bool,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env().wrap_err("Invalid database configuration")?;
        let grpc = grpc_client::server::ServerConfig::from_env()
            .wrap_err("Invalid gRPC server configuration")?;
        let http = ServerConfig::from_env().wrap_err("Invalid HTTP gateway configuration")?;
        let gateway = GatewayConfig::from_env(grpc.port).wrap_err("Invalid gateway configuration")?;
        let run_migrations = env_parse_or_default("RUN_MIGRATIONS", true)?;
        let shutdown_timeout_secs = env_parse_or_default("SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            app: app_info!(),
            environment,
            database,
            grpc,
            http,
            gateway,
            run_migrations,
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
        })
    }
}
