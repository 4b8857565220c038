//! The shared download page: URL field, option form, action button, live log
//!
//! Both pages are the same component; only the option form differs. The form
//! draws its own widgets and renders the final argument list, everything else
//! (validation, worker spawn, event polling, dialogs) lives here once.

use std::sync::{Arc, Mutex};

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::info;

use crate::command::{self, normalize_url};
use crate::model::{
    AudioFormat, AudioRequest, Container, Resolution, RunOutcome, VideoRequest, WorkerEvent,
};
use crate::{runner, thumbnail};

/// One page's option form: draws its widgets and turns the chosen options
/// plus a URL into the downloader's argument list.
pub trait OptionsForm: Default {
    /// Header shown at the top of the page
    const TITLE: &'static str;
    /// Body of the success dialog
    const SUCCESS_NOTICE: &'static str;

    fn ui(&mut self, ui: &mut egui::Ui);
    fn args(&self, url: &str) -> Vec<String>;
}

/// State for one download page
pub struct DownloadTab<F: OptionsForm> {
    form: F,
    url_input: String,
    /// Console lines relayed from the worker, newest last
    log: Vec<String>,
    progress: f32,
    /// True from the button press until the worker's Finished event
    running: bool,
    events: Option<UnboundedReceiver<WorkerEvent>>,
    /// Cached texture for the current video's thumbnail
    preview: Option<TextureHandle>,
    /// Incoming thumbnail fetch results (video_id, image)
    pending_previews: Arc<Mutex<Vec<(String, ColorImage)>>>,
}

impl<F: OptionsForm> Default for DownloadTab<F> {
    fn default() -> Self {
        Self {
            form: F::default(),
            url_input: String::new(),
            log: Vec::new(),
            progress: 0.0,
            running: false,
            events: None,
            preview: None,
            pending_previews: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<F: OptionsForm> DownloadTab<F> {
    /// Drains the worker and thumbnail channels. Called every frame for every
    /// tab, visible or not, so a backgrounded tab keeps streaming.
    pub fn poll(&mut self, ctx: &egui::Context) {
        {
            let mut pending = self.pending_previews.lock().unwrap();
            for (id, img) in pending.drain(..) {
                self.preview = Some(ctx.load_texture(&id, img, TextureOptions::default()));
            }
        }

        let mut finished = None;
        if let Some(rx) = &mut self.events {
            while let Ok(event) = rx.try_recv() {
                match event {
                    WorkerEvent::Log(line) => self.log.push(line),
                    WorkerEvent::Progress(fraction) => {
                        // Only update if progress increased
                        if fraction > self.progress {
                            self.progress = fraction;
                        }
                    }
                    WorkerEvent::Finished(outcome) => finished = Some(outcome),
                }
            }
        }

        if let Some(outcome) = finished {
            self.events = None;
            // Inputs come back exactly once, whatever the outcome was.
            self.running = false;
            match outcome {
                RunOutcome::Success => {
                    let _ = rfd::MessageDialog::new()
                        .set_level(rfd::MessageLevel::Info)
                        .set_title("Success")
                        .set_description(F::SUCCESS_NOTICE)
                        .show();
                }
                RunOutcome::Failed(_) => {
                    let _ = rfd::MessageDialog::new()
                        .set_level(rfd::MessageLevel::Error)
                        .set_title("Error")
                        .set_description("Download failed.")
                        .show();
                }
                // Spawn/read failures are already in the log; no dialog.
                RunOutcome::Error(_) => {}
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading(F::TITLE);
        ui.add_space(10.0);

        ui.label("Video URL:");
        ui.add_enabled(
            !self.running,
            egui::TextEdit::singleline(&mut self.url_input).desired_width(f32::INFINITY),
        );
        ui.add_space(10.0);

        ui.add_enabled_ui(!self.running, |ui| self.form.ui(ui));
        ui.add_space(10.0);

        if ui
            .add_enabled(!self.running, egui::Button::new("Start Download"))
            .clicked()
        {
            let ctx = ui.ctx().clone();
            self.start(&ctx);
        }

        if self.running {
            ui.add(egui::ProgressBar::new(self.progress).show_percentage());
        }

        ui.separator();
        ui.horizontal_top(|ui| {
            if let Some(tex) = &self.preview {
                ui.add(egui::Image::new(tex).max_width(180.0));
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        for line in &self.log {
                            ui.monospace(line);
                        }
                    });
                });
        });
    }

    /// Validates the URL and hands the run off to a background worker.
    fn start(&mut self, ctx: &egui::Context) {
        let Some(url) = normalize_url(&self.url_input) else {
            let _ = rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("Input Error")
                .set_description("Please enter a valid URL.")
                .show();
            return;
        };
        let url = url.to_owned();

        self.log.clear();
        self.progress = 0.0;
        self.running = true;

        // Fetch a preview for recognizable YouTube URLs
        if let Some(id) = thumbnail::extract_video_id(&url) {
            let results = Arc::clone(&self.pending_previews);
            let ctx = ctx.clone();
            runner::runtime().spawn_blocking(move || {
                if let Some(img) = thumbnail::fetch_thumbnail(&id) {
                    results.lock().unwrap().push((id, img));
                    ctx.request_repaint();
                }
            });
        }

        let args = self.form.args(&url);
        let (tx, rx) = unbounded_channel();
        self.events = Some(rx);
        runner::runtime().spawn(runner::run_download(args, tx));
        info!(%url, "download started");
    }
}

/// Options for the audio extraction page
pub struct AudioOptions {
    format: AudioFormat,
    quality: u8,
    add_metadata: bool,
    embed_thumbnail: bool,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            quality: 0,
            add_metadata: true,
            embed_thumbnail: true,
        }
    }
}

impl OptionsForm for AudioOptions {
    const TITLE: &'static str = "Audio Downloader";
    const SUCCESS_NOTICE: &'static str = "Download finished successfully!";

    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Format:");
            egui::ComboBox::from_id_source("audio_format")
                .selected_text(self.format.flag_value())
                .show_ui(ui, |ui| {
                    for format in AudioFormat::ALL {
                        ui.selectable_value(&mut self.format, format, format.flag_value());
                    }
                });
            ui.add(egui::Slider::new(&mut self.quality, 0..=10).text("Quality (0=Best)"));
        });
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.add_metadata, "Add Metadata");
            ui.checkbox(&mut self.embed_thumbnail, "Embed Thumbnail");
        });
    }

    fn args(&self, url: &str) -> Vec<String> {
        command::audio_args(&AudioRequest {
            url: url.to_owned(),
            format: self.format,
            quality: self.quality,
            add_metadata: self.add_metadata,
            embed_thumbnail: self.embed_thumbnail,
        })
    }
}

/// Options for the video download page
pub struct VideoOptions {
    resolution: Resolution,
    container: Container,
    subtitles: bool,
    add_metadata: bool,
    embed_thumbnail: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::Best,
            container: Container::Mp4,
            subtitles: false,
            add_metadata: true,
            embed_thumbnail: true,
        }
    }
}

impl OptionsForm for VideoOptions {
    const TITLE: &'static str = "Video Downloader";
    const SUCCESS_NOTICE: &'static str = "Video downloaded successfully!";

    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Max Resolution:");
            egui::ComboBox::from_id_source("video_resolution")
                .selected_text(self.resolution.label())
                .show_ui(ui, |ui| {
                    for resolution in Resolution::ALL {
                        ui.selectable_value(&mut self.resolution, resolution, resolution.label());
                    }
                });
            ui.label("Container:");
            egui::ComboBox::from_id_source("video_container")
                .selected_text(self.container.flag_value())
                .show_ui(ui, |ui| {
                    for container in Container::ALL {
                        ui.selectable_value(&mut self.container, container, container.flag_value());
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.subtitles, "Download Subtitles");
            ui.checkbox(&mut self.embed_thumbnail, "Embed Thumbnail");
            ui.checkbox(&mut self.add_metadata, "Add Metadata");
        });
    }

    fn args(&self, url: &str) -> Vec<String> {
        command::video_args(&VideoRequest {
            url: url.to_owned(),
            resolution: self.resolution,
            container: self.container,
            subtitles: self.subtitles,
            add_metadata: self.add_metadata,
            embed_thumbnail: self.embed_thumbnail,
        })
    }
}
