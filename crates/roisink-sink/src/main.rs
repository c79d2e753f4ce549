//! CLI entry point for the receive-decode-log sink node (spec.md §6).
//!
//! Parses flags, loads `config/camera_config.json` (warn-and-default on
//! any error), initializes tracing, and starts the [`Sink`] pipeline.
//! Blocks on a Ctrl-C signal and shuts the pipeline down cleanly on exit.

use std::path::PathBuf;

use clap::Parser;
use roisink_core::{Config, Sink, SinkOptions};
use roisink_decode::LicenseKey;

/// Real-time barcode/QR sink node.
#[derive(Debug, Parser)]
#[command(name = "roisink", version, about)]
struct Cli {
    /// Listen bind address for the data subscriber. Overrides
    /// `listen_host` from the config file; falls back to 0.0.0.0.
    #[arg(long)]
    host: Option<String>,

    /// Producer IP the ACK publisher dials. Overrides `camera_node_ip`
    /// from the config file; falls back to 192.168.0.176.
    #[arg(long)]
    client: Option<String>,

    /// Enable the decoder pool (C6/C7/C8). Without this flag the
    /// receiver and ring still run, but nothing is ever decoded or
    /// journaled.
    #[arg(long)]
    dbr: bool,

    /// Path to the camera config JSON file.
    #[arg(long, default_value = "config/camera_config.json")]
    config: PathBuf,

    /// Directory the result journal is created under.
    #[arg(long, default_value = "test_results")]
    journal_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "could not load camera config, using defaults");
            Config::default()
        }
    };

    let host = cli.host.or_else(|| config.listen_host.clone()).unwrap_or_else(|| Config::DEFAULT_LISTEN_HOST.to_string());
    let client_ip =
        cli.client.or_else(|| config.camera_node_ip.clone()).unwrap_or_else(|| Config::DEFAULT_CAMERA_NODE_IP.to_string());

    // There's no flag for the license key in spec.md §6 — a real license
    // key would come from the decoder SDK's own provisioning, so this
    // reads it from the environment rather than inventing a new flag.
    let license_key = std::env::var("ROISINK_LICENSE_KEY").ok().map(LicenseKey::new);

    let options = SinkOptions { host, client_ip, dbr: cli.dbr, config, journal_dir: cli.journal_dir, license_key };

    let sink = match Sink::start(options) {
        Ok(sink) => sink,
        Err(err) => {
            tracing::error!(%err, "failed to start sink");
            std::process::exit(1);
        }
    };

    wait_for_shutdown_signal();

    tracing::info!("shutting down");
    sink.shutdown();
}

fn wait_for_shutdown_signal() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let received = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&received);
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(%err, "could not install signal handler, running until killed");
        loop {
            std::thread::sleep(std::time::Duration::from_secs(3600));
        }
    }

    while !received.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}
