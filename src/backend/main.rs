/**
 * ChoreSync Server Entry Point
 *
 * Initializes tracing, loads configuration from the environment, and runs
 * the Axum sync server.
 */

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = choresync::backend::server::config::ServerConfig::from_env();
    let app = choresync::backend::server::init::create_app(&config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("ChoreSync sync server running");
    tracing::info!("  REST:   http://{}/data", addr);
    tracing::info!("  Events: http://{}/events", addr);
    tracing::info!("  Data file: {}", config.data_path.display());
    if let Some(dir) = &config.static_dir {
        tracing::info!("  Static: http://{}/ -> {}", addr, dir.display());
    }

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("The server requires the 'server' feature to be enabled.");
    eprintln!("Run with: cargo run --bin choresync-server --features server");
    std::process::exit(1);
}
