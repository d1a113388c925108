use tracing_subscriber::{fmt, EnvFilter};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("NETVEIL_HTTP_PORT").unwrap_or_else(|_| "5000".to_string());
    let state_root = std::env::var("NETVEIL_STATE_FOLDER").unwrap_or_else(|_| "state".to_string());
    let scripts = std::env::var("NETVEIL_SCRIPTS_FOLDER").unwrap_or_else(|_| "/usr/share/netveil/scripts".to_string());
    info!(
        target: "netveil",
        "netveil console starting: RUST_LOG='{}', http_port={}, state_root='{}', scripts='{}'",
        rust_log, http_port, state_root, scripts
    );

    netveil_console::server::run().await
}
