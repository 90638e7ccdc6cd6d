//! bucketkv Web Viewer Binary
//!
//! Serves a read-only HTML view of a database file.

use std::path::PathBuf;
use std::sync::Arc;

use bucketkv::web::Server;
use bucketkv::{Config, Store};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// bucketkv web viewer
#[derive(Parser, Debug)]
#[command(name = "bucketkv-web")]
#[command(about = "Browse the buckets, keys and values of a bucketkv database")]
#[command(version)]
struct Args {
    /// Database file
    file: PathBuf,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Request worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Keys shown per page on bucket listings
    #[arg(short, long, default_value = "100")]
    page_size: usize,

    /// Attempts to open a locked database file
    #[arg(long, default_value = "10")]
    open_attempts: u32,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bucketkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("bucketkv web viewer v{}", bucketkv::VERSION);
    tracing::info!("Database file: {}", args.file.display());

    let config = Config::builder()
        .path(&args.file)
        .listen_addr(&args.listen)
        .workers(args.workers)
        .page_size(args.page_size)
        .open_attempts(args.open_attempts)
        .build();

    let store = match Store::open(config.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = Server::new(config, Arc::clone(&store));
    let outcome = server.run();
    drop(server);

    if let Ok(store) = Arc::try_unwrap(store) {
        if let Err(e) = store.close() {
            tracing::error!("{}", e);
        }
    }

    if let Err(e) = outcome {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
