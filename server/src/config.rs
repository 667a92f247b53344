//! Process configuration read from flags or the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Frontend origin assumed when `FRONTEND_URL` is unset. Development
    /// accepts any origin.
    pub fn default_frontend_url(self) -> &'static str {
        match self {
            Environment::Development => "*",
            Environment::Staging => "https://staging.your-domain.com",
            Environment::Production => "https://your-frontend-domain.com",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, Parser)]
#[command(name = "tabas-server", about = "In-memory users and posts API")]
pub struct ServerConfig {
    #[arg(long, env = "TABAS_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long = "env", env = "NODE_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    /// Origin allowed by CORS. Falls back to the environment's default.
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cors_origin(&self) -> &str {
        self.frontend_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_frontend_url())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            environment: Environment::Development,
            frontend_url: None,
            log_format: LogFormat::Pretty,
        }
    }
}
