//! Feature dispatch for Perceiva.
//!
//! This module wires upload → feature selection → model/OCR → speech and
//! exposes the shared state that the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! DispatchCommand (mpsc) ◀── egui update()
//!        │
//!        ▼
//! Dispatcher::run()  ← async tokio task
//!        │
//!        ├─ LoadImage / LoadUpload → decode + preview        → ImageLoaded
//!        ├─ SelectFeature          → record feature          → FeatureSelected
//!        ├─ Run                    → Feature::route()        → Running
//!        │     ├─ Vision: encode_payload → VisionModel::describe
//!        │     └─ Ocr:    TextExtractor::extract
//!        │     └─ SpeechSynthesizer::synthesize              → Success / Failed
//!        └─ ClearImage                                       → Idle
//!
//! SharedState (Arc<Mutex<AppState>>) ←─── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use perceiva::config::AppConfig;
//! use perceiva::pipeline::{new_shared_state, Dispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let shared_state = new_shared_state(config.clone());
//!
//!     # use perceiva::vision::VisionModel;
//!     # use perceiva::ocr::TextExtractor;
//!     # use perceiva::speech::SpeechSynthesizer;
//!     # fn make_vision() -> Arc<dyn VisionModel> { unimplemented!() }
//!     # fn make_ocr() -> Arc<dyn TextExtractor> { unimplemented!() }
//!     # fn make_speech() -> Arc<dyn SpeechSynthesizer> { unimplemented!() }
//!     let (command_tx, command_rx) = mpsc::channel(16);
//!     let dispatcher = Dispatcher::new(
//!         shared_state.clone(),
//!         make_vision(),
//!         make_ocr(),
//!         make_speech(),
//!     );
//!
//!     tokio::spawn(async move { dispatcher.run(command_rx).await });
//!
//!     // command_tx is handed to the UI.
//!     # drop(command_tx);
//! }
//! ```

pub mod feature;
pub mod runner;
pub mod state;

pub use feature::{Feature, Route};
pub use runner::{
    DispatchCommand, DispatchError, Dispatcher, FeatureOutput, NO_IMAGE_NOTICE,
};
pub use state::{new_shared_state, AppState, DispatchState, LoadedImage, SharedState};
