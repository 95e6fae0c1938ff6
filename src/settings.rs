use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use egui::Color32;

use crate::ring::VertexRing;
use crate::tone::{ToneParams, Waveform};

/// Where the scope gets its stereo stream from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Built-in stereo test tone, played on the output device.
    Tone,
    /// Live input from a capture device.
    Capture,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tone" => Some(SourceKind::Tone),
            "capture" | "input" => Some(SourceKind::Capture),
            _ => None,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            SourceKind::Tone => "tone",
            SourceKind::Capture => "capture",
        }
    }
}

pub const DEFAULT_FPS: f32 = 120.0;
pub const MIN_FPS: f32 = 1.0;
pub const MIN_WINDOW_SIZE: f32 = 64.0;
pub const MIN_LINE_WIDTH: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub source: SourceKind,
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub capacity: usize,
    pub window_size: f32,
    pub target_fps: f32,
    pub line_width: f32,
    pub line_color: Color32,
    pub background_color: Color32,
    pub tone: ToneParams,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::Tone,
            input_device: None,
            output_device: None,
            capacity: VertexRing::DEFAULT_CAPACITY,
            window_size: 1024.0,
            target_fps: DEFAULT_FPS,
            line_width: 2.0,
            line_color: Color32::WHITE,
            background_color: Color32::BLACK,
            tone: ToneParams::default(),
        }
    }
}

impl AppSettings {
    /// Reads `key=value` lines from `path`. A missing file, unknown keys and
    /// unparsable values all leave the defaults in place.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(err) => {
                log::debug!("No settings at {}: {err}", path.display());
                AppSettings::default()
            }
        }
    }

    pub fn parse(raw: &str) -> Self {
        let mut settings = AppSettings::default();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                apply_kv(key.trim(), value.trim(), &mut settings);
            }
        }
        settings
    }

    /// Time between repaints, at the default rate if `target_fps` is unusable.
    pub fn frame_interval(&self) -> Duration {
        let fps = if at_least(self.target_fps, MIN_FPS) {
            self.target_fps
        } else {
            DEFAULT_FPS
        };
        Duration::try_from_secs_f32(1.0 / fps)
            .unwrap_or_else(|_| Duration::from_secs_f32(1.0 / DEFAULT_FPS))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_config_string())
    }

    pub fn to_config_string(&self) -> String {
        let mut buf = String::new();
        buf.push_str(&format!("source={}\n", self.source.as_key()));
        if let Some(name) = &self.input_device {
            buf.push_str(&format!("input_device={name}\n"));
        }
        if let Some(name) = &self.output_device {
            buf.push_str(&format!("output_device={name}\n"));
        }
        buf.push_str(&format!("capacity={}\n", self.capacity));
        buf.push_str(&format!("window_size={}\n", self.window_size));
        buf.push_str(&format!("target_fps={}\n", self.target_fps));
        buf.push_str(&format!("line_width={}\n", self.line_width));
        buf.push_str(&format!("line_color={}\n", color_key(self.line_color)));
        buf.push_str(&format!(
            "background_color={}\n",
            color_key(self.background_color)
        ));
        buf.push_str(&format!("tone_waveform={}\n", self.tone.waveform.as_key()));
        buf.push_str(&format!("tone_left_hz={}\n", self.tone.left_hz));
        buf.push_str(&format!("tone_right_hz={}\n", self.tone.right_hz));
        buf.push_str(&format!("tone_phase={}\n", self.tone.phase));
        buf.push_str(&format!("tone_gain={}\n", self.tone.gain));
        buf
    }
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("vectorscope_settings.cfg")
}

fn apply_kv(key: &str, value: &str, settings: &mut AppSettings) {
    match key {
        "source" => {
            if let Some(source) = SourceKind::parse(value) {
                settings.source = source;
            }
        }
        "input_device" => settings.input_device = non_empty(value),
        "output_device" => settings.output_device = non_empty(value),
        "capacity" => {
            if let Ok(v) = value.parse::<usize>() {
                settings.capacity = v;
            }
        }
        "window_size" => parse_at_least(value, MIN_WINDOW_SIZE, &mut settings.window_size),
        "target_fps" => parse_at_least(value, MIN_FPS, &mut settings.target_fps),
        "line_width" => parse_at_least(value, MIN_LINE_WIDTH, &mut settings.line_width),
        "line_color" => {
            if let Some(color) = parse_color(value) {
                settings.line_color = color;
            }
        }
        "background_color" => {
            if let Some(color) = parse_color(value) {
                settings.background_color = color;
            }
        }
        "tone_waveform" => {
            if let Some(wf) = Waveform::parse(value) {
                settings.tone.waveform = wf;
            }
        }
        "tone_left_hz" => parse_f32(value, &mut settings.tone.left_hz),
        "tone_right_hz" => parse_f32(value, &mut settings.tone.right_hz),
        "tone_phase" => parse_f32(value, &mut settings.tone.phase),
        "tone_gain" => parse_f32(value, &mut settings.tone.gain),
        _ => log::debug!("Ignoring unknown setting '{key}'"),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_f32(value: &str, target: &mut f32) {
    if let Ok(v) = value.parse::<f32>() {
        if v.is_finite() {
            *target = v;
        }
    }
}

fn parse_at_least(value: &str, min: f32, target: &mut f32) {
    match value.parse::<f32>() {
        Ok(v) if at_least(v, min) => *target = v,
        _ => log::warn!("Ignoring setting value '{value}', expected a number >= {min}"),
    }
}

/// Finite and no smaller than `min`.
pub fn at_least(value: f32, min: f32) -> bool {
    value.is_finite() && value >= min
}

/// Accepts `#rrggbb` and `#rrggbbaa`, with or without the leading `#`.
pub fn parse_color(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

fn color_key(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == u8::MAX {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", "Vectorscope")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
