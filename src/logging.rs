//! Process-wide logger setup. Components log through the `log` facade; the
//! backend is installed once at startup and flushed on shutdown.

use std::str::FromStr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install `env_logger`. `RUST_LOG` takes precedence over `level`; sqlx is
/// capped at warn either way. Calling it twice is harmless.
pub fn init(level: &str) {
    let default_level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);

    let _ = Builder::from_env(Env::default().default_filter_or(default_level.to_string()))
        .filter_module("sqlx", LevelFilter::Warn)
        .try_init();
}

pub fn flush() {
    log::logger().flush();
}

/// One line per request: method, path, status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        log::error!("{} {} -> {} ({:?})", method, path, status, elapsed);
    } else {
        log::info!("{} {} -> {} ({:?})", method, path, status, elapsed);
    }
    response
}
