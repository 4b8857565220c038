//! Main application for the StreamGrab downloader GUI

// Hide the console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Argument-list builders for the external downloader
mod command;
// Startup checks for the external tools
mod deps;
// Data models for download requests and worker events
mod model;
// Progress parsing utilities
mod progress;
// External downloader spawning and output streaming
mod runner;
// The shared download page component and its two option forms
mod tab;
// Thumbnail fetching module
mod thumbnail;

use eframe::{App, Frame, egui};
use egui::Visuals;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tab::{AudioOptions, DownloadTab, VideoOptions};

/// Program entry point: checks the external tools and launches the GUI
fn main() -> Result<(), eframe::Error> {
    // Console logging, filtered via RUST_LOG when set
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // The downloader is mandatory; without the converter only conversion and
    // high-resolution muxing degrade.
    let tools = deps::probe_tools();
    if tools.downloader.is_none() {
        error!(tool = runner::DOWNLOADER, "refusing to start without the downloader");
        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title("Error")
            .set_description(
                "yt-dlp is not installed.\nPlease install yt-dlp and make sure it is on PATH.",
            )
            .show();
        return Ok(());
    }
    if tools.converter.is_none() {
        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Warning")
            .set_description(
                "FFmpeg not found!\n\n- Audio conversion (mp3) will fail.\n- High-res video (1080p+) will lack audio.\n\nPlease install FFmpeg and add it to PATH.",
            )
            .show();
    }

    // Configure default native options for the egui window
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([650.0, 550.0]),
        ..Default::default()
    };
    eframe::run_native(
        "StreamGrab",
        options,
        Box::new(|cc| {
            // Use dark theme visuals
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(StreamGrabApp::default())
        }),
    )
}

/// Currently selected page
#[derive(PartialEq, Clone, Copy)]
enum Page {
    Audio,
    Video,
}

/// Application state for the GUI
struct StreamGrabApp {
    page: Page,
    audio: DownloadTab<AudioOptions>,
    video: DownloadTab<VideoOptions>,
}

impl Default for StreamGrabApp {
    fn default() -> Self {
        Self {
            page: Page::Audio,
            audio: DownloadTab::default(),
            video: DownloadTab::default(),
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for StreamGrabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // Both tabs are polled every frame so a backgrounded download keeps
        // streaming into its log.
        self.audio.poll(ctx);
        self.video.poll(ctx);

        egui::TopBottomPanel::top("pages").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.page, Page::Audio, "  Audio Download  ");
                ui.selectable_value(&mut self.page, Page::Video, "  Video Download  ");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Audio => self.audio.ui(ui),
            Page::Video => self.video.ui(ui),
        });

        // Request periodic repaint for log and progress updates
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
