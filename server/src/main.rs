use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tabas_server::{AppState, LogFormat, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = ServerConfig::parse();
    init_tracing(config.log_format);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = config.environment.as_str(), "backend server running");
    info!("health check: http://{addr}/api/health");

    let router = tabas_server::router(AppState::seeded(config));
    tabas_server::serve(listener, router).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
