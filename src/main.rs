#[cfg(feature = "ui")]
use ::rand as external_rand;
use anyhow::Context;
use clap::Parser;

mod api;
mod canvas;
mod config;
mod forest;
mod path;
mod random;
mod wind;

use config::ForestConfig;

#[cfg(feature = "ui")]
mod controls;
#[cfg(feature = "ui")]
mod visualization;

#[cfg(feature = "ui")]
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in headless mode (HTTP API server)
    #[arg(long)]
    headless: bool,

    /// Port for headless API server
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Configuration file path (YAML or JSON). If not specified, searches for windgrove.yaml, windgrove.yml, or windgrove.json in current directory.
    #[arg(short, long)]
    config: Option<String>,

    /// Seed for the random source; omit for a different forest every run
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(not(feature = "ui"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Headless mode only
    init_logging();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    headless_main(args.port, config, args.seed).await
}

#[cfg(feature = "ui")]
#[macroquad::main(window_conf)]
async fn main() {
    init_logging();
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    };

    if args.headless {
        // Run headless mode even with UI feature enabled
        let result = tokio::runtime::Runtime::new()
            .context("starting tokio runtime")
            .and_then(|rt| rt.block_on(headless_main(args.port, config, args.seed)));
        if let Err(e) = result {
            log::error!("headless mode failed: {:#}", e);
            std::process::exit(1);
        }
    } else {
        ui_main(config, args.seed).await;
    }
}

/// Load configuration from file or use default
fn load_config(config_path: Option<&str>) -> anyhow::Result<ForestConfig> {
    if let Some(path) = config_path {
        let config = ForestConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path))?;
        log::info!("loaded config from {}", path);
        Ok(config)
    } else {
        Ok(ForestConfig::from_default_paths())
    }
}

#[cfg(feature = "ui")]
fn make_rng(seed: Option<u64>) -> external_rand::rngs::StdRng {
    use external_rand::SeedableRng;
    match seed {
        Some(seed) => external_rand::rngs::StdRng::seed_from_u64(seed),
        None => external_rand::rngs::StdRng::from_entropy(),
    }
}

#[cfg(feature = "ui")]
async fn ui_main(config: ForestConfig, seed: Option<u64>) {
    use controls::handle_controls;
    use visualization::{
        draw_background, draw_cursor, draw_stats_and_help, load_cursor, ScreenCanvas,
    };

    let mut rng = make_rng(seed);
    let cursor = load_cursor(&config.cursor_path);
    if cursor.is_some() {
        show_mouse(false);
    }
    let mut canvas = ScreenCanvas {
        canvas_height: config.canvas_height,
    };
    let mut forest = forest::Forest::new(config, &mut rng);
    let mut hud_visible = false;

    loop {
        let requests = handle_controls(&mut forest, &mut rng);
        if requests.toggle_hud {
            hud_visible = !hud_visible;
        }

        draw_background(&forest.config);
        forest.step(&mut rng, &mut canvas);
        draw_cursor(cursor.as_ref(), &forest.config);
        draw_stats_and_help(&forest.stats(), hud_visible);

        if requests.screenshot {
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let filename = format!("windgrove_{}.png", timestamp);
            match capture_screenshot(&filename) {
                Ok(()) => log::info!("screenshot saved: {}", filename),
                Err(e) => log::warn!("failed to save screenshot {}: {:#}", filename, e),
            }
        }

        next_frame().await;
    }
}

#[cfg(feature = "ui")]
fn window_conf() -> Conf {
    // Window size follows the config; fall back to defaults if none is found
    let config = ForestConfig::from_default_paths();

    Conf {
        window_title: "windgrove".to_owned(),
        window_width: config.canvas_width as i32,
        window_height: config.canvas_height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[cfg(feature = "ui")]
/// Capture the current frame as a PNG
fn capture_screenshot(filename: &str) -> anyhow::Result<()> {
    let screen_image = get_screen_data();

    let width = screen_image.width as u32;
    let height = screen_image.height as u32;
    let bytes = &screen_image.bytes;

    let mut img = image::RgbaImage::new(width, height);

    // OpenGL rows start at the bottom; image rows start at the top
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize * 4;
            if idx + 3 < bytes.len() {
                let px = [bytes[idx], bytes[idx + 1], bytes[idx + 2], bytes[idx + 3]];
                img.put_pixel(x, height - 1 - y, image::Rgba(px));
            }
        }
    }

    img.save(filename)
        .with_context(|| format!("writing {}", filename))?;
    Ok(())
}

/// Headless mode - runs HTTP API server
async fn headless_main(port: u16, config: ForestConfig, seed: Option<u64>) -> anyhow::Result<()> {
    use api::{run_server, ApiState};

    let api_state = ApiState::from_config(config, seed);
    run_server(api_state, port).await
}
