//! # Pool HTTP Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración, instala el logging y arranca el servidor con las
//! rutas de demostración.

use clap::Parser;
use pool_http_server::config::Config;
use pool_http_server::files::PublicDir;
use pool_http_server::metrics::ServerStats;
use pool_http_server::routes::default_router;
use pool_http_server::server::Server;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "configuración inválida");
        std::process::exit(1);
    }

    info!(
        address = %config.address(),
        workers = config.workers,
        public_dir = %config.public_dir,
        max_header_bytes = config.max_header_bytes,
        max_body_bytes = config.max_body_bytes,
        "pool_http_server v{} arrancando",
        env!("CARGO_PKG_VERSION")
    );

    let stats = Arc::new(ServerStats::new());
    let assets = Arc::new(PublicDir::new(&config.public_dir));
    let router = default_router(assets, Arc::clone(&stats));

    if let Err(e) = Server::with_stats(config, router, stats).run() {
        error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}
