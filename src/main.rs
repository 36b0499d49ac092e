//! Heaven file tree service - lazily browsable repository trees over HTTP
//!
//! # Usage
//! ```bash
//! heaven-tree                          # Serve on 127.0.0.1:3001
//! heaven-tree --repository repo-1234   # Load a registered repository at startup
//! heaven-tree --state-dir ./state -p 4000 --show-hidden
//! ```

mod browser;
mod error;
mod file_tree;
mod git;
mod models;
mod registry;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use browser::GitBrowser;
use file_tree::FileTreeModel;
use registry::RepositoryRegistry;

/// Heaven file tree service - browse registered repositories lazily
#[derive(Parser)]
#[command(name = "heaven-tree")]
#[command(about = "Lazily browsable repository file trees", long_about = None)]
struct Cli {
    /// Repository id to load when the service starts
    #[arg(short, long)]
    repository: Option<String>,

    /// Solo Git state directory holding repositories/<id>.json
    #[arg(long, env = "SOLOGIT_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Include dot-prefixed entries in listings
    #[arg(long)]
    show_hidden: bool,

    /// Log filter, e.g. "info" or "heaven_tree=debug"
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state_dir = match cli.state_dir.or_else(RepositoryRegistry::default_state_dir) {
        Some(dir) => dir,
        None => {
            eprintln!("✗ Could not determine the state directory");
            eprintln!("  Pass --state-dir <DIR> or set SOLOGIT_STATE_DIR");
            std::process::exit(1);
        }
    };

    let browser = Arc::new(GitBrowser::new(RepositoryRegistry::new(&state_dir), cli.show_hidden));
    let model = FileTreeModel::new(browser.clone());

    // Log every tree revision; a UI would re-render here
    let mut revisions = model.subscribe();
    tokio::spawn(async move {
        while revisions.changed().await.is_ok() {
            let revision = *revisions.borrow_and_update();
            tracing::trace!("File tree revision {}", revision);
        }
    });

    if let Some(repository_id) = &cli.repository {
        model.load_roots(repository_id).await;
    }

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(model, browser))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Bind to the port
    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", cli.port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Heaven file tree service");
    println!();
    println!("  State dir:  {}", state_dir.display());
    println!("  Server:     http://{}", addr);
    if let Some(repository_id) = &cli.repository {
        println!("  Repository: {}", repository_id);
    }
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
