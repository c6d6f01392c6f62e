//! Perceiva window, built on egui/eframe.
//!
//! # Architecture
//!
//! [`PerceivaApp`] is the top-level [`eframe::App`].  It owns:
//!
//! * `command_tx`: sends [`DispatchCommand`]s to the [`Dispatcher`](crate::pipeline::Dispatcher).
//! * `state`: the [`SharedState`] the dispatcher writes, read once per frame.
//! * the local audio player used by the Play / Stop buttons.
//!
//! # Layout
//!
//! | Area | Content |
//! |------|---------|
//! | Side panel | feature radio list |
//! | Top | title, path field + Load / Clear, drag-and-drop hint |
//! | Middle | uploaded image preview, action button, loading indicator |
//! | Bottom | output text, Play / Stop, inline errors (orange) |

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::animation::{LoadingAnimation, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::audio::{read_wav, AudioPlayer, PlaybackHandle};
use crate::codec::{ImageFormat, PreviewImage, UploadedImage};
use crate::config::AppConfig;
use crate::pipeline::{DispatchCommand, DispatchState, Feature, SharedState, NO_IMAGE_NOTICE};
use crate::speech::SpeechArtifact;

pub const WINDOW_TITLE: &str = "Perceiva - AI Assistant for Visually Impaired";

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);
const INFO_COLOR: egui::Color32 = egui::Color32::from_rgb(68, 136, 255);
const DONE_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);

// ---------------------------------------------------------------------------
// Frame snapshot
// ---------------------------------------------------------------------------

/// Copy of the shared state taken at the start of each frame so the lock is
/// never held while drawing.
struct Snapshot {
    dispatch: DispatchState,
    feature: Feature,
    image_name: Option<String>,
    /// Only filled when the preview changed since the last upload to the GPU.
    new_preview: Option<(u64, PreviewImage)>,
    output_text: Option<String>,
    audio: Option<SpeechArtifact>,
    error_message: Option<String>,
    notice: Option<String>,
    animation: Option<LoadingAnimation>,
    running_secs: f32,
}

// ---------------------------------------------------------------------------
// PerceivaApp
// ---------------------------------------------------------------------------

pub struct PerceivaApp {
    state: SharedState,
    command_tx: mpsc::Sender<DispatchCommand>,
    config: AppConfig,

    /// Contents of the path field.
    path_input: String,
    /// Radio selection; mirrors `AppState::feature`.
    selected: Feature,
    /// Sent but not yet reflected in the shared state.
    pending_feature: Option<Feature>,
    /// Preview texture and the upload revision it was built from.
    preview: Option<(u64, egui::TextureHandle)>,

    /// Opened on first Play.
    player: Option<AudioPlayer>,
    playback: Option<PlaybackHandle>,
    /// Errors raised on the UI side (bad drop, playback failure).
    local_error: Option<String>,
    opened_at: Instant,
}

impl PerceivaApp {
    pub fn new(
        state: SharedState,
        command_tx: mpsc::Sender<DispatchCommand>,
        config: AppConfig,
    ) -> Self {
        Self {
            state,
            command_tx,
            config,
            path_input: String::new(),
            selected: Feature::default(),
            pending_feature: None,
            preview: None,
            player: None,
            playback: None,
            local_error: None,
            opened_at: Instant::now(),
        }
    }

    fn send(&mut self, command: DispatchCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            log::error!("ui: dispatcher unavailable: {e}");
            self.local_error = Some("The assistant is busy, try again shortly".into());
        }
    }

    fn snapshot(&self) -> Snapshot {
        let known = self.preview.as_ref().map(|(rev, _)| *rev);
        let st = self.state.lock().unwrap();
        Snapshot {
            dispatch: st.dispatch,
            feature: st.feature,
            image_name: st.image.as_ref().map(|i| i.name.clone()),
            new_preview: st
                .image
                .as_ref()
                .filter(|i| Some(i.revision) != known)
                .map(|i| (i.revision, i.preview.clone())),
            output_text: st.output_text.clone(),
            audio: st.audio.clone(),
            error_message: st.error_message.clone(),
            notice: st.notice.clone(),
            animation: st.animation.clone(),
            running_secs: st
                .running_since
                .map(|t| t.elapsed().as_secs_f32())
                .unwrap_or(0.0),
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    fn load_path(&mut self, raw: &str) {
        let trimmed = raw.trim().trim_matches('"');
        if trimmed.is_empty() {
            return;
        }
        self.stop_playback();
        self.local_error = None;
        self.send(DispatchCommand::LoadImage(PathBuf::from(trimmed)));
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Only the last file counts; a new upload replaces the previous one.
        let Some(file) = dropped.into_iter().last() else {
            return;
        };
        if let Some(path) = file.path {
            self.path_input = path.display().to_string();
            self.load_path(&path.display().to_string());
            return;
        }
        match file.bytes {
            Some(bytes) => match upload_from_bytes(&file.name, bytes.to_vec()) {
                Ok(upload) => {
                    self.stop_playback();
                    self.local_error = None;
                    self.send(DispatchCommand::LoadUpload(upload));
                }
                Err(message) => self.local_error = Some(message),
            },
            None => log::warn!("ui: dropped file {} has neither path nor bytes", file.name),
        }
    }

    // ── Audio ────────────────────────────────────────────────────────────

    fn play(&mut self, artifact: &SpeechArtifact) {
        self.stop_playback();
        if self.player.is_none() {
            match AudioPlayer::new() {
                Ok(player) => self.player = Some(player),
                Err(e) => {
                    self.local_error = Some(format!("Audio playback failed: {e}"));
                    return;
                }
            }
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let result = read_wav(&artifact.path).and_then(|clip| player.play(&clip));
        match result {
            Ok(handle) => {
                log::debug!("ui: playing {:.1}s of speech", handle.duration_secs());
                self.local_error = None;
                self.playback = Some(handle);
            }
            Err(e) => self.local_error = Some(format!("Audio playback failed: {e}")),
        }
    }

    fn stop_playback(&mut self) {
        self.playback = None;
    }

    fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(|h| !h.is_finished())
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_feature_selector(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.heading("Select a functionality");
        ui.add_space(6.0);
        ui.add_enabled_ui(!busy, |ui| {
            for feature in Feature::ALL {
                if ui
                    .radio_value(&mut self.selected, feature, feature.label())
                    .changed()
                {
                    self.stop_playback();
                    self.pending_feature = Some(feature);
                    self.send(DispatchCommand::SelectFeature(feature));
                }
            }
        });
    }

    fn draw_upload_row(&mut self, ui: &mut egui::Ui, snap: &Snapshot) {
        ui.label("Upload an image (jpg, jpeg, png) by path or drop it on the window");
        ui.horizontal(|ui| {
            let field = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("/path/to/image.png")
                    .desired_width(ui.available_width() - 130.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let busy = snap.dispatch.is_busy();
            if ui.add_enabled(!busy, egui::Button::new("Load")).clicked() || (submitted && !busy) {
                let raw = self.path_input.clone();
                self.load_path(&raw);
            }
            if ui
                .add_enabled(!busy && snap.dispatch.has_image(), egui::Button::new("Clear"))
                .clicked()
            {
                self.stop_playback();
                self.preview = None;
                self.path_input.clear();
                self.send(DispatchCommand::ClearImage);
            }
        });
    }

    fn draw_preview(&mut self, ui: &mut egui::Ui, snap: &Snapshot) {
        let Some((_, texture)) = self.preview.as_ref() else {
            return;
        };
        let max = self.config.ui.preview_max_px;
        ui.add(
            egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                .max_size(egui::vec2(max, max)),
        );
        if let Some(name) = &snap.image_name {
            ui.label(egui::RichText::new(format!("Uploaded Image: {name}")).small());
        }
    }

    fn draw_action(&mut self, ui: &mut egui::Ui, snap: &Snapshot) {
        let enabled = snap.dispatch.can_run();
        if ui
            .add_enabled(enabled, egui::Button::new(snap.feature.button_label()))
            .clicked()
        {
            self.stop_playback();
            self.send(DispatchCommand::Run);
        }
    }

    fn draw_running(&self, ui: &mut egui::Ui, snap: &Snapshot) {
        ui.add_space(6.0);
        ui.label(egui::RichText::new(DispatchState::Running.label()).color(INFO_COLOR));
        match &snap.animation {
            Some(animation) if self.config.animation.enabled => {
                draw_loading_animation(ui, animation, snap.running_secs)
            }
            _ => {
                ui.add(egui::Spinner::new().size(32.0));
            }
        }
    }

    fn draw_output(&mut self, ui: &mut egui::Ui, snap: &Snapshot) {
        if let Some(text) = &snap.output_text {
            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .max_height(220.0)
                .show(ui, |ui| {
                    ui.label(text.as_str());
                });
        }

        if let Some(artifact) = &snap.audio {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let playing = self.is_playing();
                if ui.add_enabled(!playing, egui::Button::new("Play")).clicked() {
                    self.play(artifact);
                }
                if ui.add_enabled(playing, egui::Button::new("Stop")).clicked() {
                    self.stop_playback();
                }
                ui.label(
                    egui::RichText::new(format!(
                        "{} ({}, {} bytes)",
                        file_label(&artifact.path),
                        artifact.mime_type(),
                        artifact.size_bytes
                    ))
                    .small()
                    .color(DONE_COLOR),
                );
            });
        }
    }

    fn draw_messages(&self, ui: &mut egui::Ui, snap: &Snapshot) {
        for message in [&snap.error_message, &self.local_error].into_iter().flatten() {
            ui.add_space(4.0);
            ui.label(egui::RichText::new(message.as_str()).color(ERROR_COLOR));
        }
        if let Some(notice) = &snap.notice {
            ui.add_space(4.0);
            ui.label(egui::RichText::new(notice.as_str()).color(INFO_COLOR));
        }
        if snap.dispatch == DispatchState::Idle && snap.notice.is_none() {
            ui.add_space(4.0);
            ui.label(egui::RichText::new(NO_IMAGE_NOTICE).color(INFO_COLOR));
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build an upload from dropped bytes, taking the format from the file name.
pub fn upload_from_bytes(name: &str, bytes: Vec<u8>) -> Result<UploadedImage, String> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = ImageFormat::from_extension(ext).map_err(|e| e.to_string())?;
    Ok(UploadedImage::new(name, bytes, format))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Angle, in radians, of the leading dot of the loading indicator.
pub fn indicator_angle(animation: &LoadingAnimation, elapsed_secs: f32) -> f32 {
    animation.phase_at(elapsed_secs) * std::f32::consts::TAU
}

/// Orbiting dots sized like the Lottie canvas, one turn per animation loop.
fn draw_loading_animation(ui: &mut egui::Ui, animation: &LoadingAnimation, elapsed: f32) {
    const DOTS: usize = 12;

    let height = DISPLAY_HEIGHT.min(DISPLAY_WIDTH / animation.aspect());
    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(DISPLAY_WIDTH, height), egui::Sense::hover());
    let painter = ui.painter();
    let center = rect.center();
    let radius = rect.height().min(rect.width()) * 0.3;
    let lead = indicator_angle(animation, elapsed);

    for i in 0..DOTS {
        let offset = i as f32 / DOTS as f32 * std::f32::consts::TAU;
        let angle = lead - offset;
        let fade = 1.0 - i as f32 / DOTS as f32;
        let pos = center + radius * egui::vec2(angle.cos(), angle.sin());
        painter.circle_filled(
            pos,
            4.0 + 3.0 * fade,
            INFO_COLOR.gamma_multiply(fade.max(0.15)),
        );
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for PerceivaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        let mut snap = self.snapshot();
        match self.pending_feature {
            Some(feature) if feature != snap.feature => {}
            _ => {
                self.pending_feature = None;
                self.selected = snap.feature;
            }
        }

        if let Some((revision, image)) = snap.new_preview.take() {
            let color = egui::ColorImage::from_rgba_unmultiplied(
                [image.width as usize, image.height as usize],
                &image.rgba,
            );
            let texture = ctx.load_texture("uploaded-image", color, egui::TextureOptions::LINEAR);
            self.preview = Some((revision, texture));
        }
        if snap.image_name.is_none() {
            self.preview = None;
        }

        if snap.dispatch.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else if self.is_playing() {
            ctx.request_repaint_after(Duration::from_millis(200));
        } else {
            // Picks up dispatcher results without user input.
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        let busy = snap.dispatch.is_busy();
        egui::SidePanel::left("features")
            .resizable(false)
            .default_width(230.0)
            .show(ctx, |ui| self.draw_feature_selector(ui, busy));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(WINDOW_TITLE);
                ui.add_space(8.0);
                self.draw_upload_row(ui, &snap);
                ui.separator();

                self.draw_preview(ui, &snap);
                if snap.dispatch.has_image() {
                    ui.add_space(6.0);
                    self.draw_action(ui, &snap);
                }
                if busy {
                    self.draw_running(ui, &snap);
                }
                self.draw_output(ui, &snap);
                self.draw_messages(ui, &snap);
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop_playback();
        log::info!("Perceiva window closing after {:?}", self.opened_at.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lottie(fr: f32, op: f32) -> LoadingAnimation {
        LoadingAnimation::from_json(&format!(
            r#"{{"fr":{fr},"ip":0,"op":{op},"w":300,"h":200}}"#
        ))
        .unwrap()
    }

    #[test]
    fn dropped_bytes_take_format_from_name() {
        let upload = upload_from_bytes("Sign.JPEG", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.format, ImageFormat::Jpeg);
        assert_eq!(upload.name, "Sign.JPEG");
    }

    #[test]
    fn dropped_bytes_with_other_type_are_refused() {
        let err = upload_from_bytes("notes.gif", vec![0]).unwrap_err();
        assert!(err.contains("gif"), "{err}");
        assert!(upload_from_bytes("no_extension", vec![0]).is_err());
    }

    #[test]
    fn indicator_turns_once_per_loop() {
        let animation = lottie(30.0, 60.0);
        assert!(indicator_angle(&animation, 0.0).abs() < 1e-6);
        let half = indicator_angle(&animation, 1.0);
        assert!((half - std::f32::consts::PI).abs() < 1e-4);
        let wrapped = indicator_angle(&animation, 2.0);
        assert!(wrapped.abs() < 1e-4);
    }

    #[test]
    fn file_label_is_file_name() {
        assert_eq!(
            file_label(Path::new("/tmp/perceiva/text-to-speech-local.wav")),
            "text-to-speech-local.wav"
        );
    }
}
