//! Dispatch state machine and shared application state.
//!
//! [`DispatchState`] drives the dispatcher.  The UI reads it via
//! [`SharedState`] to decide which widgets to show and whether the action
//! button is enabled.
//!
//! [`AppState`] is the single source of truth for everything the UI needs:
//! current phase, selected feature, preview of the loaded image, last output
//! text and audio artifact, and any inline message.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::animation::LoadingAnimation;
use crate::codec::PreviewImage;
use crate::config::AppConfig;
use crate::speech::SpeechArtifact;

use super::feature::Feature;

// ---------------------------------------------------------------------------
// DispatchState
// ---------------------------------------------------------------------------

/// States of one upload/feature/run cycle.
///
/// ```text
/// Idle ──load──▶ ImageLoaded ──select──▶ FeatureSelected ──run──▶ Running
///                      └────────────────run───────────────────────▶ Running
/// Running ──ok──▶ Success      Running ──err──▶ Failed
/// Success / Failed ──run──▶ Running        any ──clear──▶ Idle
/// ```
///
/// `Failed` is a resting state that behaves as `FeatureSelected`: image and
/// feature are kept and Run is enabled.  It stays distinct so the UI can tell
/// the last run did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// No image loaded.
    #[default]
    Idle,

    /// An image is loaded; the default feature is implied.
    ImageLoaded,

    /// An image is loaded and the user picked a feature explicitly.
    FeatureSelected,

    /// A feature pipeline is in flight.
    Running,

    /// The last run produced text and audio.
    Success,

    /// The last run failed; image and feature are kept for a retry.
    Failed,
}

impl DispatchState {
    /// `true` while a pipeline is in flight.
    ///
    /// ```
    /// use perceiva::pipeline::DispatchState;
    ///
    /// assert!(DispatchState::Running.is_busy());
    /// assert!(!DispatchState::Failed.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, DispatchState::Running)
    }

    /// Whether the action button should be enabled.
    pub fn can_run(&self) -> bool {
        matches!(
            self,
            DispatchState::ImageLoaded
                | DispatchState::FeatureSelected
                | DispatchState::Success
                | DispatchState::Failed
        )
    }

    /// `true` whenever an image is held.
    pub fn has_image(&self) -> bool {
        !matches!(self, DispatchState::Idle)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchState::Idle => "Waiting for image",
            DispatchState::ImageLoaded => "Image loaded",
            DispatchState::FeatureSelected => "Ready",
            DispatchState::Running => "Please be patient...",
            DispatchState::Success => "Done",
            DispatchState::Failed => "Failed",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// What the UI shows for the loaded image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub name: String,
    pub preview: PreviewImage,
    /// Bumped on every upload so the UI knows to replace its texture.
    pub revision: u64,
}

/// Shared application state.
///
/// The dispatcher mutates it; the egui update loop reads it each frame.
pub struct AppState {
    pub dispatch: DispatchState,

    /// Feature the action button runs.
    pub feature: Feature,

    /// `None` in [`DispatchState::Idle`].
    pub image: Option<LoadedImage>,

    /// Text produced by the last successful run.
    pub output_text: Option<String>,

    /// Speech artifact produced by the last successful run.
    pub audio: Option<SpeechArtifact>,

    /// Inline error, e.g. `"Object detection failed: ..."`.
    pub error_message: Option<String>,

    /// Inline informational message (no state change attached).
    pub notice: Option<String>,

    /// Loading indicator header, once fetched.
    pub animation: Option<LoadingAnimation>,

    /// Set while [`DispatchState::Running`].
    pub running_since: Option<Instant>,

    /// Number of runs that reached `Success`.
    pub completed_runs: u64,

    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            dispatch: DispatchState::Idle,
            feature: Feature::default(),
            image: None,
            output_text: None,
            audio: None,
            error_message: None,
            notice: None,
            animation: None,
            running_since: None,
            completed_runs: 0,
            config,
        }
    }

    /// Drop output, audio and messages from a previous run.
    pub fn clear_results(&mut self) {
        self.output_text = None;
        self.audio = None;
        self.error_message = None;
        self.notice = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Lock for a short critical section; never hold the lock across `.await`.
pub type SharedState = Arc<Mutex<AppState>>;

pub fn new_shared_state(config: AppConfig) -> SharedState {
    Arc::new(Mutex::new(AppState::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_is_busy() {
        for state in [
            DispatchState::Idle,
            DispatchState::ImageLoaded,
            DispatchState::FeatureSelected,
            DispatchState::Success,
            DispatchState::Failed,
        ] {
            assert!(!state.is_busy(), "{state:?}");
        }
        assert!(DispatchState::Running.is_busy());
    }

    #[test]
    fn failed_can_run_again() {
        assert!(DispatchState::Failed.can_run());
        assert!(DispatchState::Success.can_run());
        assert!(DispatchState::ImageLoaded.can_run());
    }

    #[test]
    fn failed_behaves_as_feature_selected() {
        let failed = DispatchState::Failed;
        let selected = DispatchState::FeatureSelected;
        assert_eq!(failed.can_run(), selected.can_run());
        assert_eq!(failed.has_image(), selected.has_image());
        assert_eq!(failed.is_busy(), selected.is_busy());
    }

    #[test]
    fn idle_and_running_cannot_run() {
        assert!(!DispatchState::Idle.can_run());
        assert!(!DispatchState::Running.can_run());
    }

    #[test]
    fn idle_has_no_image() {
        assert!(!DispatchState::Idle.has_image());
        assert!(DispatchState::Failed.has_image());
    }

    #[test]
    fn running_label_asks_for_patience() {
        assert_eq!(DispatchState::Running.label(), "Please be patient...");
    }

    #[test]
    fn default_app_state() {
        let state = AppState::default();
        assert_eq!(state.dispatch, DispatchState::Idle);
        assert_eq!(state.feature, Feature::SceneUnderstanding);
        assert!(state.image.is_none());
        assert!(state.output_text.is_none());
        assert!(state.audio.is_none());
        assert_eq!(state.completed_runs, 0);
    }

    #[test]
    fn clear_results_keeps_feature() {
        let mut state = AppState::default();
        state.feature = Feature::ObjectDetection;
        state.output_text = Some("text".into());
        state.error_message = Some("boom".into());
        state.clear_results();
        assert!(state.output_text.is_none());
        assert!(state.error_message.is_none());
        assert_eq!(state.feature, Feature::ObjectDetection);
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state(AppConfig::default());
        let state2 = Arc::clone(&state);
        state.lock().unwrap().dispatch = DispatchState::Running;
        assert_eq!(state2.lock().unwrap().dispatch, DispatchState::Running);
    }
}
