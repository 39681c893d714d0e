use affinity_injector::{ServerOptions, server};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), affinity_injector::Error> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = ServerOptions::parse();
    tracing::debug!(?options, "parsed server options");

    server::run(options).await
}
