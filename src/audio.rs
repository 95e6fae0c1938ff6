use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use thiserror::Error;

use vectorscope::settings::{AppSettings, SourceKind};
use vectorscope::tone::{ToneGenerator, ToneParams};
use vectorscope::{SampleIngest, ScopeError, VertexRing};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio {0} device available")]
    NoDevice(&'static str),

    #[error("Audio device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Could not query default stream config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Running audio stream that feeds the vertex ring. Dropping it stops the
/// callbacks.
pub struct ScopeAudio {
    _stream: cpal::Stream,
    pub device_name: String,
}

impl ScopeAudio {
    /// Opens the configured device, falling back to the host default if a
    /// named device cannot be used.
    pub fn start(ring: &Arc<VertexRing>, settings: &AppSettings) -> Result<Self, AudioError> {
        let requested = match settings.source {
            SourceKind::Tone => settings.output_device.as_deref(),
            SourceKind::Capture => settings.input_device.as_deref(),
        };
        Self::start_with_device(ring, settings, requested).or_else(|err| match requested {
            Some(name) => {
                log::warn!("Could not open '{name}' ({err}), using the default device");
                Self::start_with_device(ring, settings, None)
            }
            None => Err(err),
        })
    }

    fn start_with_device(
        ring: &Arc<VertexRing>,
        settings: &AppSettings,
        device_name: Option<&str>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let (device, supported_config) = match settings.source {
            SourceKind::Tone => {
                let device = select_output_device(&host, device_name)?;
                let config = device.default_output_config()?;
                (device, config)
            }
            SourceKind::Capture => {
                let device = select_input_device(&host, device_name)?;
                let config = device.default_input_config()?;
                (device, config)
            }
        };
        let resolved_device_name = device
            .name()
            .unwrap_or_else(|_| "<unknown device>".to_string());
        let sample_format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();
        let ingest = SampleIngest::with_channels(Arc::clone(ring), config.channels as usize)?;

        log::info!(
            "Scope source {} on '{}': {} Hz, {} channels, {:?}",
            settings.source.as_key(),
            resolved_device_name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );
        if config.channels < 2 {
            log::warn!("Mono stream, the trace will collapse onto the diagonal");
        }

        let tone = settings.tone.clone();
        let stream = match (settings.source, sample_format) {
            (SourceKind::Tone, cpal::SampleFormat::F32) => {
                build_tone_stream::<f32>(&device, &config, ingest, tone)?
            }
            (SourceKind::Tone, cpal::SampleFormat::I16) => {
                build_tone_stream::<i16>(&device, &config, ingest, tone)?
            }
            (SourceKind::Tone, cpal::SampleFormat::U16) => {
                build_tone_stream::<u16>(&device, &config, ingest, tone)?
            }
            (SourceKind::Capture, cpal::SampleFormat::F32) => {
                build_capture_stream::<f32>(&device, &config, ingest)?
            }
            (SourceKind::Capture, cpal::SampleFormat::I16) => {
                build_capture_stream::<i16>(&device, &config, ingest)?
            }
            (SourceKind::Capture, cpal::SampleFormat::U16) => {
                build_capture_stream::<u16>(&device, &config, ingest)?
            }
            (_, other) => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;
        Ok(Self {
            _stream: stream,
            device_name: resolved_device_name,
        })
    }
}

fn build_tone_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ingest: SampleIngest,
    params: ToneParams,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut tone = ToneGenerator::new(params, config.sample_rate.0 as f32);
    let mut block: Vec<f32> = Vec::new();
    let mut reported = false;
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            block.resize(data.len(), 0.0);
            tone.fill(&mut block, channels);
            for (out, sample) in data.iter_mut().zip(&block) {
                *out = T::from_sample(*sample);
            }
            report_ingest(ingest.on_audio_block(&block), &mut reported);
        },
        |err| log::error!("Audio stream error: {err}"),
        None,
    )
}

fn build_capture_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ingest: SampleIngest,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut reported = false;
    device.build_input_stream(
        config,
        move |data: &[T], _| {
            report_ingest(ingest.on_audio_samples(data), &mut reported);
        },
        |err| log::error!("Audio stream error: {err}"),
        None,
    )
}

// Logged once per stream so a poisoned ring does not flood the audio thread.
fn report_ingest(result: Result<usize, ScopeError>, reported: &mut bool) {
    if let Err(err) = result {
        if !*reported {
            log::error!("Scope ingest stopped: {err}");
            *reported = true;
        }
    }
}

fn select_output_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, AudioError> {
    match name {
        Some(target) => find_device(host.output_devices().ok(), target),
        None => host
            .default_output_device()
            .ok_or(AudioError::NoDevice("output")),
    }
}

fn select_input_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, AudioError> {
    match name {
        Some(target) => find_device(host.input_devices().ok(), target),
        None => host
            .default_input_device()
            .ok_or(AudioError::NoDevice("input")),
    }
}

fn find_device<I>(devices: Option<I>, target: &str) -> Result<cpal::Device, AudioError>
where
    I: Iterator<Item = cpal::Device>,
{
    devices
        .into_iter()
        .flatten()
        .find(|device| device.name().is_ok_and(|name| name == target))
        .ok_or_else(|| AudioError::DeviceNotFound(target.to_string()))
}

pub fn list_device_names(source: SourceKind) -> Vec<String> {
    let host = cpal::default_host();
    let devices: Vec<cpal::Device> = match source {
        SourceKind::Tone => host
            .output_devices()
            .map(|devices| devices.collect())
            .unwrap_or_default(),
        SourceKind::Capture => host
            .input_devices()
            .map(|devices| devices.collect())
            .unwrap_or_default(),
    };
    devices.iter().filter_map(|d| d.name().ok()).collect()
}
