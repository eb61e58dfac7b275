// API module for headless mode - HTTP endpoints to interact with the forest

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::canvas::NullCanvas;
use crate::config::ForestConfig;
use crate::forest::{Forest, ForestStats};
use crate::path::{Path, Segment};
use ::rand::rngs::StdRng;
use ::rand::SeedableRng;

// Serializable versions of forest data for API responses
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SegmentData {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub diameter: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PathData {
    pub trunk: bool,
    pub x: f32,
    pub y: f32,
    pub diameter: f32,
    pub finished: bool,
    pub wind_response: f32,
    pub flexibility: f32,
    pub segments: Vec<SegmentData>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatsData {
    pub path_count: usize,
    pub trunk_count: usize,
    pub fork_count: usize,
    pub finished_count: usize,
    pub stalled_count: usize,
    pub segment_count: usize,
    pub growth_ticks: u64,
    pub frame_index: u64,
    pub wind_clock: f32,
    pub wind_intensity: f32,
    pub settled: bool,
    pub paused: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ForestStateResponse {
    pub width: f32,
    pub height: f32,
    pub paths: Vec<PathData>,
    pub stats: StatsData,
}

/// Upper bound on `POST /step?steps=N`; the forest lock is held for all of them.
pub const MAX_STEPS_PER_REQUEST: usize = 10_000;

#[derive(Deserialize)]
pub struct StepQuery {
    pub steps: Option<usize>,
}

#[derive(Deserialize)]
pub struct WindQuery {
    pub intensity: f32,
}

// Shared state for the API server
#[derive(Clone)]
pub struct ApiState {
    pub forest: Arc<Mutex<Forest>>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl ApiState {
    pub fn new(forest: Forest, rng: StdRng) -> Self {
        Self {
            forest: Arc::new(Mutex::new(forest)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn from_config(config: ForestConfig, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let forest = Forest::new(config, &mut rng);
        Self::new(forest, rng)
    }
}

impl From<&Segment> for SegmentData {
    fn from(s: &Segment) -> Self {
        Self {
            start_x: s.start.x,
            start_y: s.start.y,
            end_x: s.end.x,
            end_y: s.end.y,
            diameter: s.diameter,
        }
    }
}

impl From<&Path> for PathData {
    fn from(p: &Path) -> Self {
        Self {
            trunk: p.is_trunk(),
            x: p.position.x,
            y: p.position.y,
            diameter: p.diameter,
            finished: p.finished,
            wind_response: p.wind_response,
            flexibility: p.flexibility,
            segments: p.segments.iter().map(SegmentData::from).collect(),
        }
    }
}

fn stats_data(stats: ForestStats, paused: bool) -> StatsData {
    StatsData {
        path_count: stats.path_count,
        trunk_count: stats.trunk_count,
        fork_count: stats.fork_count,
        finished_count: stats.finished_count,
        stalled_count: stats.stalled_count,
        segment_count: stats.segment_count,
        growth_ticks: stats.growth_ticks,
        frame_index: stats.frame_index,
        wind_clock: stats.wind_clock,
        wind_intensity: stats.wind_intensity,
        settled: stats.settled,
        paused,
    }
}

// Helper function to convert forest state to API response
fn forest_to_response(forest: &Forest) -> ForestStateResponse {
    ForestStateResponse {
        width: forest.config.canvas_width,
        height: forest.config.canvas_height,
        paths: forest.paths.iter().map(PathData::from).collect(),
        stats: stats_data(forest.stats(), forest.paused),
    }
}

// GET /state - Get current forest state
async fn get_state(
    State(api_state): State<ApiState>,
) -> Result<Json<ForestStateResponse>, StatusCode> {
    let forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(forest_to_response(&forest)))
}

// GET /stats - Get forest statistics
async fn get_stats(State(api_state): State<ApiState>) -> Result<Json<StatsData>, StatusCode> {
    let forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(stats_data(forest.stats(), forest.paused)))
}

// POST /step - Step the forest forward
async fn step_forest(
    Query(params): Query<StepQuery>,
    State(api_state): State<ApiState>,
) -> Result<Json<StatsData>, StatusCode> {
    let steps = params.steps.unwrap_or(1);
    if steps > MAX_STEPS_PER_REQUEST {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    for _ in 0..steps {
        forest.step(&mut *rng, &mut NullCanvas);
    }

    Ok(Json(stats_data(forest.stats(), forest.paused)))
}

// POST /reset - Replant the forest
async fn reset_forest(State(api_state): State<ApiState>) -> Result<Json<StatsData>, StatusCode> {
    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    forest.reset_simulation(&mut *rng);

    Ok(Json(stats_data(forest.stats(), forest.paused)))
}

// POST /pause - Toggle pause
async fn pause_forest(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    forest.toggle_pause();
    Ok(Json(serde_json::json!({ "paused": forest.paused })))
}

// POST /wind/increase, /wind/decrease, /wind?intensity=V
async fn increase_wind(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    forest.increase_wind();
    Ok(Json(serde_json::json!({ "wind_intensity": forest.wind.intensity })))
}

async fn decrease_wind(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    forest.decrease_wind();
    Ok(Json(serde_json::json!({ "wind_intensity": forest.wind.intensity })))
}

async fn set_wind(
    Query(params): Query<WindQuery>,
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if !params.intensity.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    forest.set_wind_intensity(params.intensity);
    Ok(Json(serde_json::json!({ "wind_intensity": forest.wind.intensity })))
}

// GET /config - Get forest configuration
async fn get_config(
    State(api_state): State<ApiState>,
) -> Result<Json<ForestConfig>, StatusCode> {
    let forest = api_state
        .forest
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(forest.config.clone()))
}

// Create the API router
pub fn create_router(api_state: ApiState) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/stats", get(get_stats))
        .route("/step", post(step_forest))
        .route("/reset", post(reset_forest))
        .route("/pause", post(pause_forest))
        .route("/wind", post(set_wind))
        .route("/wind/increase", post(increase_wind))
        .route("/wind/decrease", post(decrease_wind))
        .route("/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(api_state)
}

// Run the API server with automatic forest stepping
pub async fn run_server(api_state: ApiState, port: u16) -> anyhow::Result<()> {
    let app = create_router(api_state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    log::info!("windgrove headless API listening on http://localhost:{}", port);
    log::info!("  GET  /state            full forest geometry");
    log::info!("  GET  /stats            counters");
    log::info!("  POST /step?steps=N     advance N frames (default 1)");
    log::info!("  POST /reset            replant");
    log::info!("  POST /pause            toggle the background loop");
    log::info!("  POST /wind/increase    wind +0.5");
    log::info!("  POST /wind/decrease    wind -0.5");
    log::info!("  POST /wind?intensity=V set wind (clamped)");
    log::info!("  GET  /config           active configuration");

    // Spawn background task to continuously step the forest
    let forest_task = tokio::spawn(forest_loop(api_state.clone()));

    let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    tokio::select! {
        result = server_handle => {
            result??;
        }
        _ = forest_task => {
            log::error!("forest loop ended unexpectedly");
        }
    }

    Ok(())
}

// Background task that steps the forest once per frame
async fn forest_loop(api_state: ApiState) {
    const TARGET_FPS: f32 = 60.0;
    let frame_duration = std::time::Duration::from_secs_f32(1.0 / TARGET_FPS);

    loop {
        let start = std::time::Instant::now();

        {
            let mut forest = match api_state.forest.lock() {
                Ok(forest) => forest,
                Err(_) => break,
            };

            if !forest.paused {
                let mut rng = match api_state.rng.lock() {
                    Ok(rng) => rng,
                    Err(_) => break,
                };
                forest.step(&mut *rng, &mut NullCanvas);
            }
        }

        let elapsed = start.elapsed();
        if elapsed < frame_duration {
            tokio::time::sleep(frame_duration - elapsed).await;
        }
    }
}
