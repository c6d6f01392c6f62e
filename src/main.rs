//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Load `.env` (if present) and initialise logging.
//! 2. Load [`AppConfig`] from disk (writes the defaults on first run).
//! 3. Read the model API key; abort with exit code 1 when it is missing.
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Build the model client, OCR engine, speech engine and loading animation.
//! 6. Spawn the dispatcher on the runtime.
//! 7. Run [`eframe::run_native`]; it blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use perceiva::{
    animation::LottieLoader,
    app::{PerceivaApp, WINDOW_TITLE},
    config::{AppConfig, Secrets},
    ocr::TesseractExtractor,
    pipeline::{new_shared_state, DispatchCommand, Dispatcher},
    speech::EspeakSynthesizer,
    vision::GeminiClient,
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let viewport = egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size([width, height])
        .with_min_inner_size([520.0, 420.0])
        .with_drag_and_drop(true);

    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Environment + logging
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match dotenv {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("ignoring unreadable .env file: {e}"),
    }
    log::info!("Perceiva starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Secrets
    let secrets = match Secrets::from_env(&config.vision) {
        Ok(secrets) => secrets,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    // 4. Tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // 5. Collaborators
    let state = new_shared_state(config.clone());
    let mut dispatcher = Dispatcher::new(
        Arc::clone(&state),
        Arc::new(GeminiClient::new(&config.vision, secrets)),
        Arc::new(TesseractExtractor::from_config(&config.ocr)),
        Arc::new(EspeakSynthesizer::from_config(&config.speech)),
    )
    .with_preview_size(config.ui.preview_max_px.round().max(1.0) as u32);

    if config.animation.enabled {
        dispatcher =
            dispatcher.with_animation(Arc::new(LottieLoader::from_config(&config.animation)));
    }

    log::info!(
        "model {} at {}, OCR {}, speech {}",
        config.vision.model,
        config.vision.base_url,
        config.ocr.tesseract_cmd.display(),
        config.speech.engine_cmd.display()
    );

    // 6. Dispatcher
    let (command_tx, command_rx) = mpsc::channel::<DispatchCommand>(16);
    rt.spawn(dispatcher.run(command_rx));

    // 7. Window (blocks until closed)
    let app = PerceivaApp::new(state, command_tx, config.clone());
    let result = eframe::run_native(
        "Perceiva",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    );

    rt.shutdown_background();
    result
}
