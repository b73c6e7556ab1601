// Tensile test bench acquisition and dashboard server.

use std::env;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;

use rig_core::calib::Calibration;

use tensilebench_server::app::{AppState, RigStore, SerialConfig};
use tensilebench_server::demo::resolve_data_dir;
use tensilebench_server::http;
use tensilebench_server::meta::SpecimenStore;
use tensilebench_server::tasks;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = env::var("HTTP_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8501);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .expect("invalid HTTP_BIND or HTTP_PORT");

    let mut serial_config = SerialConfig::default();
    if let Ok(value) = env::var("RIG_SERIAL_PORT") {
        serial_config.port = value;
    }
    if let Some(value) = env::var("RIG_BAUD")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
    {
        serial_config.baud = value;
    }

    let data_dir_path = resolve_data_dir();
    let specimen = Arc::new(SpecimenStore::load(&data_dir_path));

    let store = Arc::new(RwLock::new(RigStore::new()));

    let (tx, _) = broadcast::channel::<String>(256);
    let (serial_config_tx, _serial_config_rx) = watch::channel(serial_config);
    let sequence = Arc::new(AtomicU64::new(0));
    let demo_active = Arc::new(AtomicBool::new(false));
    let demo_state = Arc::new(Mutex::new(Default::default()));
    let record_state = Arc::new(Mutex::new(Default::default()));
    let run_handle = Arc::new(Mutex::new(Default::default()));
    let start_instant = Instant::now();

    let state_store = store.clone();
    let state_tx = tx.clone();
    let state_seq = sequence.clone();
    let state_start = start_instant;
    tokio::spawn(async move {
        tasks::state_update_task(state_store, state_tx, state_seq, state_start).await;
    });

    let samples_store = store.clone();
    let samples_tx = tx.clone();
    let samples_seq = sequence.clone();
    let samples_start = start_instant;
    tokio::spawn(async move {
        tasks::samples_task(samples_store, samples_tx, samples_seq, samples_start).await;
    });

    let app_state = AppState {
        tx,
        sequence,
        start_instant,
        serial_config_tx,
        store,
        calibration: Calibration::default(),
        specimen,
        run_handle,
        demo_active,
        demo_state,
        record_state,
        data_dir: data_dir_path,
    };

    let app = http::router(app_state);

    info!(%addr, "starting server");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
