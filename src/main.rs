mod bridge;
mod config;
mod pipeline;

use std::sync::Arc;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::prelude::*;

use bridge::Bridge;
use config::Config;
use pipeline::{Dispatcher, HfClient, MessageStore, PipelineEngine};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "waresponder.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging. Stdout carries the bridge protocol, so console logs
    // go to stderr.
    std::fs::create_dir_all(&config.data_dir).ok();
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("waresponder.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting waresponder...");
    info!("Loaded config from {config_path}");
    info!("Admin JID: {}", config.admin_jid);

    let store = Arc::new(MessageStore::open(&config.data_dir.join("messages.db")));
    let completion = Arc::new(HfClient::new(
        config.completion_api_key.clone(),
        config.completion_endpoint.clone(),
        config.completion_model.clone(),
    ));

    let transport = Arc::new(Bridge::stdio());
    let engine = Arc::new(PipelineEngine::new(&config, transport.clone(), completion, store));
    let shutdown = engine.shutdown_handle();

    let dispatcher = Dispatcher::start(engine, config.workers, 256);
    let ingress = dispatcher.sender();

    tokio::spawn(async move {
        transport.read_loop(BufReader::new(tokio::io::stdin()), ingress).await;
    });

    tokio::select! {
        _ = shutdown.notified() => info!("Shutdown requested, exiting"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted, exiting"),
    }
}
