use issue_relay::config::{self, RelayConfig};
use issue_relay::logging::{FileLogger, setup_logging};
use issue_relay::{AppState, app};
use std::sync::Arc;
use tracing::info;

fn yes_no(configured: bool) -> &'static str {
    if configured { "Yes" } else { "No" }
}

/// Log which destinations are configured (never the URLs) and the build metadata.
fn report_startup(config: &RelayConfig) {
    use issue_relay::destination::Destination;

    info!("Starting GitHub to Discord notification relay");
    for destination in [Destination::Bug, Destination::Feature, Destination::Default] {
        info!(
            "{} webhook configured: {}",
            destination,
            yes_no(config.webhooks.url_for(destination).is_some())
        );
    }

    let build = &config.build;
    if build.is_empty() {
        return;
    }
    info!(
        "Build: commit {} on branch {} ({})",
        build.commit_hash.as_deref().unwrap_or("unknown"),
        build.branch.as_deref().unwrap_or("unknown"),
        build.commit_date.as_deref().unwrap_or("unknown date"),
    );
    if let Some(message) = &build.commit_message {
        info!("Commit message: {}", message);
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match config::load_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let file_logger = config.log_dir.clone().map(FileLogger::new);
    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup failed: {}", e);
            std::process::exit(1);
        }
    };

    report_startup(&config);

    let bind_address = config.bind_address.clone();
    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("Startup error: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_address);

    if let Err(e) = axum::serve(listener, app(state)).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
