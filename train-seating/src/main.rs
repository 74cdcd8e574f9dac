use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use train_seating::allocation::AllocationConfig;
use train_seating::store::{JsonFileStore, ScheduleStore};
use train_seating::web::{AppState, create_router};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    3000,
);

/// Read allocation settings from the environment, falling back to defaults.
fn allocation_config() -> AllocationConfig {
    let defaults = AllocationConfig::default();

    let warning_threshold_mins = match std::env::var("SEATING_WARNING_MINS") {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "SEATING_WARNING_MINS is not a number, using default");
            defaults.warning_threshold_mins
        }),
        Err(_) => defaults.warning_threshold_mins,
    };

    let restrict_medium = std::env::var("SEATING_RESTRICT_MEDIUM")
        .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(defaults.restrict_1_4_5_8_for_medium_groups);

    AllocationConfig::new(warning_threshold_mins, restrict_medium)
}

fn listen_addr() -> SocketAddr {
    match std::env::var("SEATING_ADDR") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(value = %raw, "SEATING_ADDR is not a socket address, using default");
            DEFAULT_ADDR
        }),
        Err(_) => DEFAULT_ADDR,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = std::env::var("SEATING_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let store = JsonFileStore::new(&data_dir);
    match store.load() {
        Ok(schedule) => info!(data_dir = %data_dir, trains = schedule.len(), "loaded schedule"),
        Err(e) => error!(data_dir = %data_dir, error = %e, "stored schedule is unreadable"),
    }

    let config = allocation_config();
    info!(
        warning_threshold_mins = config.warning_threshold_mins,
        restrict_medium = config.restrict_1_4_5_8_for_medium_groups,
        "allocation settings"
    );

    let app = create_router(AppState::new(store, config));

    let addr = listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "seating service listening");
    axum::serve(listener, app).await
}
