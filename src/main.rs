//! Climate Query Service
//!
//! Serves the Hawaii climate dataset (stations + daily measurements) as a
//! small read-only JSON API.
//!
//! Usage:
//!   cargo run --release                               # Use climate_service.toml or defaults
//!   cargo run --release -- --port 8080                # Override the listen port
//!   cargo run --release -- --config /etc/climate.toml # Explicit config file
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string
//!   RUST_LOG     - log filter (default: info)

use climate_service::config;
use climate_service::db;
use climate_service::endpoint;
use climate_service::store::{ClimateStore, PgStore, PgStoreProvider};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn usage(program: &str) -> String {
    format!("Usage: {} [--config PATH] [--port PORT]", program)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌴 Climate Query Service");
    println!("========================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
            }
            "--port" => match args.get(i + 1).and_then(|p| p.parse().ok()) {
                Some(port) => {
                    port_override = Some(port);
                    i += 2;
                }
                None => {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            },
            "--help" | "-h" => {
                println!("{}", usage(&args[0]));
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("{}", usage(&args[0]));
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let mut service_config = match config::load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = port_override {
        service_config.server.port = port;
    }

    // Validate database and schema once before accepting requests
    println!("📊 Checking database...");
    let database_url = match db::database_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            std::process::exit(1);
        }
    };
    let client = match db::connect_and_verify(&database_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("\n❌ Database validation failed: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ measurement and station tables found");

    // Read through the verified connection once so bad rows surface at startup
    let mut store = PgStore::new(client);
    match (store.stations(), store.latest_date()) {
        (Ok(stations), Ok(Some(latest))) => {
            println!("✓ {} stations, latest measurement {}\n", stations.len(), latest);
        }
        (Ok(stations), Ok(None)) => {
            println!("⚠️  {} stations, measurement table is empty\n", stations.len());
        }
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("\n❌ Database validation failed: {}\n", e);
            std::process::exit(1);
        }
    }
    drop(store);

    let provider = Arc::new(PgStoreProvider::new(database_url));
    let address = service_config.server.listen_address();

    println!("🚀 Starting HTTP endpoint server...");
    println!("   http://{}", address);
    println!("   Workers: {}", service_config.server.workers);
    println!("   Window: {} days", service_config.api.window_days);
    println!("   Press Ctrl+C to stop\n");

    if let Err(e) = endpoint::start_endpoint_server(
        &address,
        service_config.server.workers,
        provider,
        service_config.api,
    ) {
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
