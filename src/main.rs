//! CoreX demo server.
//!
//! ```text
//! corex [--config corex.toml] [--root DIR] [--bind ADDR]
//!     → load + validate config
//!     → logging, metrics
//!     → register routes, freeze into a Dispatcher
//!     → serve until Ctrl+C
//! ```

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use corex::config::{load_config, AppConfig};
use corex::observability::{logging::init_logging, metrics::init_metrics};
use corex::{AppContext, Application, HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "corex", version, about = "CoreX web application server")]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application root directory (overrides `app.root_dir`).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Listen address (overrides `server.bind_address`).
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(root) = args.root {
        config.app.root_dir = root;
    }
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    init_logging(&config.logging.level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "corex starting");
    tracing::info!(
        root_dir = %config.app.root_dir.display(),
        theme = %config.app.theme,
        bind_address = %config.server.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut app = Application::new(AppContext::from_config(&config));
    routes::register(&mut app)?;
    let dispatcher = Arc::new(app.build()?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(dispatcher, &config.server);
    let rx = shutdown.subscribe();

    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move { signal.trigger_on_ctrl_c().await });

    server.run(listener, rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
