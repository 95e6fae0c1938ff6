mod audio;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use audio::{ScopeAudio, list_device_names};
use ui::ScopeApp;
use vectorscope::settings::{
    AppSettings, MIN_LINE_WIDTH, SourceKind, at_least, default_settings_path,
};
use vectorscope::{FrameRenderer, VertexRing};

#[derive(Parser)]
#[command(name = "vectorscope")]
#[command(about = "Real-time X/Y vectorscope of a stereo audio stream")]
struct Cli {
    /// Where the stereo stream comes from
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Device name for the chosen source
    #[arg(long)]
    device: Option<String>,

    /// Number of samples drawn each frame (at least 2)
    #[arg(long)]
    capacity: Option<usize>,

    /// Trace width in pixels
    #[arg(long)]
    line_width: Option<f32>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save: bool,

    /// Print the device names for the chosen source and exit
    #[arg(long)]
    list_devices: bool,
}

impl Cli {
    fn apply(&self, settings: &mut AppSettings) {
        if let Some(source) = self.source {
            settings.source = source;
        }
        if let Some(device) = &self.device {
            match settings.source {
                SourceKind::Tone => settings.output_device = Some(device.clone()),
                SourceKind::Capture => settings.input_device = Some(device.clone()),
            }
        }
        if let Some(capacity) = self.capacity {
            settings.capacity = capacity;
        }
        match self.line_width {
            Some(width) if at_least(width, MIN_LINE_WIDTH) => settings.line_width = width,
            Some(width) => log::warn!("Ignoring --line-width {width}, expected >= {MIN_LINE_WIDTH}"),
            None => {}
        }
    }
}

/// Builds the ring, and only once the settings have proven usable writes
/// them to `save_to`.
fn build_ring(settings: &AppSettings, save_to: Option<&Path>) -> anyhow::Result<Arc<VertexRing>> {
    let ring = Arc::new(VertexRing::new(settings.capacity)?);
    if let Some(path) = save_to {
        settings
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved settings to {}", path.display());
    }
    Ok(ring)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let mut settings = AppSettings::load(&settings_path);
    cli.apply(&mut settings);

    if cli.list_devices {
        for name in list_device_names(settings.source) {
            println!("{name}");
        }
        return Ok(());
    }

    let ring = build_ring(&settings, cli.save.then_some(settings_path.as_path()))?;
    let audio = ScopeAudio::start(&ring, &settings).context("Failed to initialize audio")?;
    let renderer = FrameRenderer::new(Arc::clone(&ring));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Vectorscope")
            .with_inner_size([settings.window_size, settings.window_size]),
        ..Default::default()
    };
    eframe::run_native(
        "Vectorscope",
        options,
        Box::new(move |cc| Box::new(ScopeApp::new(cc, renderer, audio, settings))),
    )
    .map_err(|err| anyhow::anyhow!("Window loop failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from(args: &[&str]) -> AppSettings {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut settings = AppSettings::default();
        cli.apply(&mut settings);
        settings
    }

    #[test]
    fn capture_device_lands_on_the_input() {
        let settings = settings_from(&[
            "vectorscope",
            "--source",
            "capture",
            "--device",
            "Mic",
            "--capacity",
            "8",
        ]);
        assert_eq!(settings.source, SourceKind::Capture);
        assert_eq!(settings.input_device.as_deref(), Some("Mic"));
        assert_eq!(settings.output_device, None);
        assert_eq!(settings.capacity, 8);
    }

    #[test]
    fn tone_device_lands_on_the_output() {
        let settings = settings_from(&["vectorscope", "--device", "Speakers"]);
        assert_eq!(settings.source, SourceKind::Tone);
        assert_eq!(settings.output_device.as_deref(), Some("Speakers"));
        assert_eq!(settings.input_device, None);
    }

    #[test]
    fn no_flags_leave_settings_untouched() {
        assert_eq!(settings_from(&["vectorscope"]), AppSettings::default());
    }

    #[test]
    fn unusable_line_width_is_ignored() {
        assert_eq!(settings_from(&["vectorscope", "--line-width", "3"]).line_width, 3.0);
        assert_eq!(
            settings_from(&["vectorscope", "--line-width", "NaN"]).line_width,
            AppSettings::default().line_width
        );
        assert_eq!(
            settings_from(&["vectorscope", "--line-width=-1"]).line_width,
            AppSettings::default().line_width
        );
    }

    #[test]
    fn invalid_capacity_is_never_saved() {
        let path = std::env::temp_dir().join(format!(
            "vectorscope-save-{}-invalid.cfg",
            std::process::id()
        ));
        let settings = settings_from(&["vectorscope", "--capacity", "1", "--save"]);
        assert!(build_ring(&settings, Some(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn valid_settings_are_saved_after_the_ring_is_built() {
        let path = std::env::temp_dir().join(format!(
            "vectorscope-save-{}-valid.cfg",
            std::process::id()
        ));
        let settings = settings_from(&["vectorscope", "--capacity", "16", "--save"]);
        let ring = build_ring(&settings, Some(&path)).unwrap();
        assert_eq!(ring.capacity(), 16);
        assert_eq!(AppSettings::load(&path).capacity, 16);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["vectorscope", "--source", "file"]).is_err());
    }
}
