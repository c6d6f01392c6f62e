//! Dispatcher: drives upload → feature → model/OCR → speech.
//!
//! [`Dispatcher`] owns the collaborators and responds to
//! [`DispatchCommand`]s received over a `tokio::sync::mpsc` channel.
//!
//! # Run flow
//!
//! ```text
//! DispatchCommand::Run
//!   └─▶ Running (+ loading animation fetched on its own task, non-fatal)
//!         ├─ Route::Vision(instruction)
//!         │     spawn_blocking(encode_payload) → vision.describe
//!         └─ Route::Ocr
//!               spawn_blocking(ocr.extract)
//!         └─▶ spawn_blocking(speech.synthesize)
//!               ├─ Ok  → Success (text + artifact)
//!               └─ Err → Failed ("<Feature> failed: <cause>")
//! ```
//!
//! Commands are handled one at a time, so at most one pipeline is in flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::animation::AnimationSource;
use crate::codec::{decode, encode_payload, preview_rgba, CodecError, UploadedImage};
use crate::ocr::{OcrError, TextExtractor};
use crate::speech::{SpeechArtifact, SpeechSynthesizer, SynthesisError};
use crate::vision::{VisionError, VisionModel};

use super::feature::{Feature, Route};
use super::state::{DispatchState, LoadedImage, SharedState};

/// Shown when Run is pressed before any image is loaded.
pub const NO_IMAGE_NOTICE: &str = "Please upload an image to proceed";

const DEFAULT_PREVIEW_EDGE: u32 = 480;

// ---------------------------------------------------------------------------
// DispatchCommand / DispatchError
// ---------------------------------------------------------------------------

/// Requests sent from the UI to the dispatcher.
#[derive(Debug, Clone)]
pub enum DispatchCommand {
    /// Read and decode an image file.
    LoadImage(PathBuf),
    /// Use bytes already in memory (drag-and-drop without a path).
    LoadUpload(UploadedImage),
    SelectFeature(Feature),
    /// Run the selected feature on the loaded image.
    Run,
    ClearImage,
}

/// Anything that can stop a feature from completing.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("internal error: {0}")]
    Internal(#[from] tokio::task::JoinError),
}

/// Result of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOutput {
    pub text: String,
    pub audio: SpeechArtifact,
}

struct CurrentImage {
    upload: UploadedImage,
    decoded: Arc<DynamicImage>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Drives the feature pipeline.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use perceiva::config::{AppConfig, Secrets};
/// use perceiva::ocr::TesseractExtractor;
/// use perceiva::pipeline::{new_shared_state, DispatchCommand, Dispatcher};
/// use perceiva::speech::EspeakSynthesizer;
/// use perceiva::vision::GeminiClient;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let secrets = Secrets::from_env(&config.vision).unwrap();
/// let state = new_shared_state(config.clone());
///
/// let dispatcher = Dispatcher::new(
///     state,
///     Arc::new(GeminiClient::new(&config.vision, secrets)),
///     Arc::new(TesseractExtractor::from_config(&config.ocr)),
///     Arc::new(EspeakSynthesizer::from_config(&config.speech)),
/// );
///
/// let (tx, rx) = tokio::sync::mpsc::channel(16);
/// tx.send(DispatchCommand::LoadImage("street.png".into())).await.unwrap();
/// tx.send(DispatchCommand::Run).await.unwrap();
/// drop(tx);
/// dispatcher.run(rx).await;
/// # }
/// ```
pub struct Dispatcher {
    state: SharedState,
    vision: Arc<dyn VisionModel>,
    ocr: Arc<dyn TextExtractor>,
    speech: Arc<dyn SpeechSynthesizer>,
    animation: Option<Arc<dyn AnimationSource>>,
    /// Fetch in flight, if any.
    animation_fetch: Option<JoinHandle<()>>,
    preview_edge: u32,
    current: Option<CurrentImage>,
    revision: u64,
}

impl Dispatcher {
    pub fn new(
        state: SharedState,
        vision: Arc<dyn VisionModel>,
        ocr: Arc<dyn TextExtractor>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            state,
            vision,
            ocr,
            speech,
            animation: None,
            animation_fetch: None,
            preview_edge: DEFAULT_PREVIEW_EDGE,
            current: None,
            revision: 0,
        }
    }

    /// Fetch a loading animation on the first run.
    pub fn with_animation(mut self, source: Arc<dyn AnimationSource>) -> Self {
        self.animation = Some(source);
        self
    }

    /// Longest edge of the preview thumbnail.
    pub fn with_preview_size(mut self, max_edge: u32) -> Self {
        self.preview_edge = max_edge.max(1);
        self
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Process commands until `rx` is closed.
    pub async fn run(mut self, mut rx: mpsc::Receiver<DispatchCommand>) {
        while let Some(command) = rx.recv().await {
            match command {
                DispatchCommand::LoadImage(path) => self.handle_load_path(path).await,
                DispatchCommand::LoadUpload(upload) => self.handle_load(upload).await,
                DispatchCommand::SelectFeature(feature) => self.handle_select(feature),
                DispatchCommand::Run => self.handle_run().await,
                DispatchCommand::ClearImage => self.handle_clear(),
            }
        }

        log::info!("dispatch: command channel closed, dispatcher shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    async fn handle_load_path(&mut self, path: PathBuf) {
        log::debug!("dispatch: loading {}", path.display());
        let read = tokio::task::spawn_blocking(move || UploadedImage::from_path(&path)).await;
        match read {
            Ok(Ok(upload)) => self.handle_load(upload).await,
            Ok(Err(e)) => self.reject_upload(e.to_string()),
            Err(e) => self.reject_upload(e.to_string()),
        }
    }

    async fn handle_load(&mut self, upload: UploadedImage) {
        let edge = self.preview_edge;
        let decoded = tokio::task::spawn_blocking(move || {
            let result = decode(&upload).map(|image| {
                let preview = preview_rgba(&image, edge);
                (image, preview)
            });
            (upload, result)
        })
        .await;

        let (upload, image, preview) = match decoded {
            Ok((upload, Ok((image, preview)))) => (upload, image, preview),
            Ok((_, Err(e))) => return self.reject_upload(e.to_string()),
            Err(e) => return self.reject_upload(e.to_string()),
        };

        let (width, height) = image.dimensions();
        log::info!("dispatch: loaded {} ({width}x{height})", upload.name);

        self.revision += 1;
        let loaded = LoadedImage {
            name: upload.name.clone(),
            preview,
            revision: self.revision,
        };
        self.current = Some(CurrentImage {
            upload,
            decoded: Arc::new(image),
        });

        let mut st = self.state.lock().unwrap();
        st.dispatch = DispatchState::ImageLoaded;
        st.image = Some(loaded);
        st.clear_results();
    }

    /// Keep whatever was loaded before and show the decode error inline.
    fn reject_upload(&self, cause: String) {
        log::warn!("dispatch: upload rejected: {cause}");
        let mut st = self.state.lock().unwrap();
        st.notice = None;
        st.error_message = Some(format!("Could not load image: {cause}"));
    }

    fn handle_select(&mut self, feature: Feature) {
        log::debug!("dispatch: feature selected: {feature}");
        let mut st = self.state.lock().unwrap();
        st.feature = feature;
        if self.current.is_some() {
            st.dispatch = DispatchState::FeatureSelected;
            st.clear_results();
        }
    }

    fn handle_clear(&mut self) {
        log::debug!("dispatch: image cleared");
        self.current = None;
        let mut st = self.state.lock().unwrap();
        st.dispatch = DispatchState::Idle;
        st.image = None;
        st.running_since = None;
        st.clear_results();
    }

    async fn handle_run(&mut self) {
        let Some(current) = self.current.as_ref() else {
            log::debug!("dispatch: run requested without an image");
            let mut st = self.state.lock().unwrap();
            st.notice = Some(NO_IMAGE_NOTICE.to_string());
            return;
        };
        let image = Arc::clone(&current.decoded);
        let name = current.upload.name.clone();

        let feature = {
            let mut st = self.state.lock().unwrap();
            st.dispatch = DispatchState::Running;
            st.running_since = Some(Instant::now());
            st.clear_results();
            st.feature
        };
        log::info!("dispatch: running {feature} on {name}");

        self.start_animation_fetch();
        let result = self.run_feature(feature, image).await;

        let mut st = self.state.lock().unwrap();
        st.running_since = None;
        match result {
            Ok(output) => {
                log::info!(
                    "dispatch: {feature} succeeded ({} chars, {} audio bytes)",
                    output.text.len(),
                    output.audio.size_bytes
                );
                st.dispatch = DispatchState::Success;
                st.output_text = Some(output.text);
                st.audio = Some(output.audio);
                st.completed_runs += 1;
            }
            Err(e) => {
                let message = format!("{} failed: {e}", feature.failure_label());
                log::error!("dispatch: {message}");
                st.dispatch = DispatchState::Failed;
                st.error_message = Some(message);
            }
        }
    }

    /// Run one feature end to end on an already decoded image.
    pub async fn run_feature(
        &self,
        feature: Feature,
        image: Arc<DynamicImage>,
    ) -> Result<FeatureOutput, DispatchError> {
        let text = match feature.route() {
            Route::Vision(instruction) => {
                let payload = tokio::task::spawn_blocking(move || encode_payload(&image)).await??;
                self.vision.describe(instruction, &payload).await?
            }
            Route::Ocr => {
                let ocr = Arc::clone(&self.ocr);
                tokio::task::spawn_blocking(move || ocr.extract(&image)).await??
            }
        };
        log::debug!("dispatch: {feature} produced {} chars", text.len());

        let speech = Arc::clone(&self.speech);
        let spoken = text.clone();
        let audio = tokio::task::spawn_blocking(move || speech.synthesize(&spoken)).await??;

        Ok(FeatureOutput { text, audio })
    }

    /// Fetch the loading animation in the background unless one is already
    /// held or a fetch is still in flight. The result lands in the shared
    /// state whenever it arrives; runs never wait for it.
    fn start_animation_fetch(&mut self) {
        let Some(source) = self.animation.as_ref() else {
            return;
        };
        if self.animation_fetch.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        if self.state.lock().unwrap().animation.is_some() {
            return;
        }

        let source = Arc::clone(source);
        let state = Arc::clone(&self.state);
        self.animation_fetch = Some(tokio::spawn(async move {
            match source.fetch().await {
                Ok(animation) => {
                    log::debug!(
                        "dispatch: loading animation ready ({:.1}s loop)",
                        animation.loop_secs()
                    );
                    state.lock().unwrap().animation = Some(animation);
                }
                Err(e) => log::warn!("dispatch: loading animation unavailable: {e}"),
            }
        }));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
