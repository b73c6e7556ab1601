// HTTP handlers and routing.

use std::sync::atomic::Ordering;

use axum::extract::State as AxumState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};

use crate::app::{AppState, RecordMode, SerialConfig};
use crate::constants::EXPORT_FILE_NAME;
use crate::demo::{demo_default_path, demo_playback_loop, resolve_demo_path, reset_store_for_demo};
use crate::export;
use crate::meta::SpecimenParams;
use crate::recording::{
    maybe_start_recording, record_status_snapshot, stop_recording_internal, RecordStatusResponse,
};
use crate::serial;
use crate::ui::dashboard;
use crate::utils::{monotonic_ms, now_epoch_ms};
use crate::ws::ws_handler;

mod types;
use types::*;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/config/serial", get(get_serial_config).post(set_serial_config))
        .route("/ports", get(list_serial_ports))
        .route("/run/start", axum::routing::post(start_run))
        .route("/run/stop", axum::routing::post(stop_run))
        .route("/run/status", get(get_run_status))
        .route("/samples", get(get_samples))
        .route("/export/csv", get(export_csv))
        .route("/specimen", get(get_specimen).post(set_specimen))
        .route("/record/status", get(get_record_status))
        .route("/record/start", axum::routing::post(start_recording))
        .route("/record/stop", axum::routing::post(stop_recording))
        .route("/demo/status", get(get_demo_status))
        .route("/demo/start", axum::routing::post(start_demo_playback))
        .route("/demo/stop", axum::routing::post(stop_demo_playback))
        .route("/debug/acquisition", get(get_debug_acquisition))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn run_status_snapshot(app_state: &AppState) -> RunStatusResponse {
    let now_ms = monotonic_ms(app_state.start_instant);
    let store = app_state.store.read().await;
    RunStatusResponse {
        state: store.tracker.run_state,
        run_index: store.tracker.run_index,
        sample_count: store.tracker.sample_count,
        lines_total: store.lines_total,
        lines_dropped: store.lines_dropped,
        elapsed_s: store.tracker.elapsed_s(now_ms),
        last_error: store.last_error.clone(),
    }
}

async fn get_run_status(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    Json(run_status_snapshot(&app_state).await)
}

async fn start_run(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<RunStatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    if app_state.demo_active.load(Ordering::Relaxed) {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "demo playback active" })),
        ));
    }

    let mut handle = app_state.run_handle.lock().await;
    if let Some(cancel) = handle.cancel.take() {
        let _ = cancel.send(());
    }
    handle.active = false;

    let config = app_state.serial_config_tx.borrow().clone();
    let stream = match serial::open_port(&config).await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(?err, port = %config.port, "serial open failed");
            let message = format!("serial open failed: {err}");
            {
                let mut store = app_state.store.write().await;
                store.last_error = Some(message.clone());
            }
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            ));
        }
    };

    let now_ms = monotonic_ms(app_state.start_instant);
    let run_index = {
        let mut store = app_state.store.write().await;
        store.reset_for_run();
        store.tracker.start(now_ms, now_epoch_ms());
        store.tracker.run_index
    };
    maybe_start_recording(&app_state.record_state, now_ms).await;

    let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
    handle.active = true;
    handle.run_index = run_index;
    handle.cancel = Some(cancel_tx);
    drop(handle);

    let store = app_state.store.clone();
    let calibration = app_state.calibration;
    let start_instant = app_state.start_instant;
    let demo_active = app_state.demo_active.clone();
    let record_state = app_state.record_state.clone();
    let run_handle = app_state.run_handle.clone();
    tokio::spawn(async move {
        if let Err(err) = serial::acquisition_loop(
            stream,
            store.clone(),
            calibration,
            start_instant,
            demo_active,
            record_state.clone(),
            cancel_rx,
        )
        .await
        {
            warn!(?err, "acquisition loop failed");
        }

        // A newer run may own the handle by now; only tear down our own.
        let mut handle = run_handle.lock().await;
        if handle.run_index == run_index {
            handle.active = false;
            handle.cancel = None;
            drop(handle);
            let mut store = store.write().await;
            if store.tracker.run_index == run_index {
                store.tracker.stop();
            }
            drop(store);
            let _ = stop_recording_internal(&record_state).await;
        }
    });

    info!(run_index, port = %config.port, "run started");
    Ok(Json(run_status_snapshot(&app_state).await))
}

async fn stop_run(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let mut handle = app_state.run_handle.lock().await;
    if let Some(cancel) = handle.cancel.take() {
        let _ = cancel.send(());
    }
    handle.active = false;
    drop(handle);

    {
        let mut store = app_state.store.write().await;
        store.tracker.stop();
    }
    let _ = stop_recording_internal(&app_state.record_state).await;

    info!("run stopped");
    Json(run_status_snapshot(&app_state).await)
}

async fn get_serial_config(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let config = app_state.serial_config_tx.borrow().clone();
    Json(config)
}

async fn set_serial_config(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<SerialConfig>,
) -> Result<Json<SerialConfig>, (StatusCode, Json<serde_json::Value>)> {
    if payload.port.trim().is_empty() || payload.baud == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "port and baud are required" })),
        ));
    }
    // Takes effect on the next run start; an active run keeps its port.
    app_state.serial_config_tx.send_replace(payload.clone());
    info!(port = %payload.port, baud = payload.baud, "serial config updated");
    Ok(Json(payload))
}

async fn list_serial_ports() -> impl IntoResponse {
    Json(PortsResponse {
        ports: serial::list_ports(),
    })
}

async fn get_samples(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let store = app_state.store.read().await;
    Json(SamplesResponse {
        run_index: store.tracker.run_index,
        count: store.samples.len(),
        samples: store.samples.clone(),
    })
}

async fn export_csv(
    AxumState(app_state): AxumState<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let samples = {
        let store = app_state.store.read().await;
        store.samples.clone()
    };
    let body = export::to_csv(&samples).map_err(|err| {
        warn!(?err, "csv export failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "csv export failed" })),
        )
    })?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        ),
    ];
    Ok((headers, body))
}

async fn get_specimen(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    Json(app_state.specimen.get().await)
}

async fn set_specimen(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<SpecimenParams>,
) -> Result<Json<SpecimenParams>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(err) = app_state.specimen.set(payload.clone()).await {
        warn!(?err, "specimen save failed");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "failed to persist specimen parameters" })),
        ));
    }
    Ok(Json(payload))
}

async fn get_record_status(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let state = app_state.record_state.lock().await;
    Json(record_status_snapshot(&state))
}

async fn start_recording(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<RecordStatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    let path = demo_default_path(&app_state.data_dir);
    if let Some(parent) = path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            warn!(?err, "failed to create demo directory");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to create demo directory" })),
            ));
        }
    }

    let mut state = app_state.record_state.lock().await;
    if state.mode != RecordMode::Idle {
        return Ok(Json(record_status_snapshot(&state)));
    }
    state.mode = RecordMode::Armed;
    state.path = Some(path.clone());
    state.start_ms = None;
    state.writer = None;
    state.lines = 0;

    info!(path = %path.display(), "recording armed");
    Ok(Json(record_status_snapshot(&state)))
}

async fn stop_recording(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let response = stop_recording_internal(&app_state.record_state).await;
    Json(response)
}

async fn get_demo_status(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let state = app_state.demo_state.lock().await;
    Json(DemoStatusResponse {
        active: state.active,
        path: state
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
    })
}

async fn start_demo_playback(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<DemoStatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    if app_state.run_handle.lock().await.active {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "a live run is active" })),
        ));
    }

    let path = resolve_demo_path(&app_state.data_dir);
    if !path.is_file() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "demo file not found",
                "path": path.to_string_lossy(),
            })),
        ));
    }
    let path_display = path.to_string_lossy().to_string();

    let mut state = app_state.demo_state.lock().await;
    if state.active {
        return Ok(Json(DemoStatusResponse {
            active: true,
            path: state
                .path
                .as_ref()
                .map(|path| path.to_string_lossy().to_string()),
        }));
    }

    let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
    state.active = true;
    state.path = Some(path.clone());
    state.cancel = Some(cancel_tx);
    drop(state);

    app_state.demo_active.store(true, Ordering::Relaxed);
    reset_store_for_demo(&app_state.store, monotonic_ms(app_state.start_instant)).await;

    let store = app_state.store.clone();
    let calibration = app_state.calibration;
    let demo_state = app_state.demo_state.clone();
    let demo_active = app_state.demo_active.clone();
    let start_instant = app_state.start_instant;

    let playback_path = path.clone();
    tokio::spawn(async move {
        if let Err(err) =
            demo_playback_loop(playback_path, store, calibration, start_instant, cancel_rx).await
        {
            warn!(?err, "demo playback failed");
        }
        demo_active.store(false, Ordering::Relaxed);
        let mut state = demo_state.lock().await;
        state.active = false;
        state.cancel = None;
    });

    info!(path = %path_display, "demo playback started");
    Ok(Json(DemoStatusResponse {
        active: true,
        path: Some(path_display),
    }))
}

async fn stop_demo_playback(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let mut state = app_state.demo_state.lock().await;
    if let Some(cancel) = state.cancel.take() {
        let _ = cancel.send(());
    }
    state.active = false;
    app_state.demo_active.store(false, Ordering::Relaxed);
    Json(DemoStatusResponse {
        active: false,
        path: state
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
    })
}

async fn get_debug_acquisition(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let store = app_state.store.read().await;
    let raw_lines = store
        .raw_lines
        .to_vec_ordered()
        .into_iter()
        .map(|snapshot| DebugRawLine {
            captured_at_ms: snapshot.captured_at_ms,
            line: snapshot.line,
            accepted: snapshot.accepted,
        })
        .collect();

    Json(DebugAcquisitionResponse {
        timestamp_ms: now_epoch_ms(),
        run_state: store.tracker.run_state,
        run_index: store.tracker.run_index,
        lines_total: store.lines_total,
        lines_dropped: store.lines_dropped,
        last_line_ms: store.last_line_ms,
        last_error: store.last_error.clone(),
        raw_lines,
    })
}
