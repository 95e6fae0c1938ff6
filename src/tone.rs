use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    pub fn as_key(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sine" => Some(Waveform::Sine),
            "square" => Some(Waveform::Square),
            "saw" | "sawtooth" => Some(Waveform::Saw),
            "triangle" => Some(Waveform::Triangle),
            _ => None,
        }
    }

    /// Value at `phase` in cycles, `[0, 1)`.
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * (phase - 0.5),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToneParams {
    pub waveform: Waveform,
    pub left_hz: f32,
    pub right_hz: f32,
    /// Right channel lead over the left, in cycles.
    pub phase: f32,
    pub gain: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            left_hz: 220.0,
            right_hz: 330.0,
            phase: 0.25,
            gain: 0.8,
        }
    }
}

/// Stereo test signal: two free-running oscillators, one per channel.
pub struct ToneGenerator {
    params: ToneParams,
    sample_rate: f32,
    left_phase: f32,
    right_phase: f32,
}

impl ToneGenerator {
    pub fn new(params: ToneParams, sample_rate: f32) -> Self {
        let right_phase = params.phase.rem_euclid(1.0);
        Self {
            params,
            sample_rate,
            left_phase: 0.0,
            right_phase,
        }
    }

    pub fn next_frame(&mut self) -> (f32, f32) {
        let gain = self.params.gain.clamp(0.0, 1.0);
        let left = self.params.waveform.sample(self.left_phase) * gain;
        let right = self.params.waveform.sample(self.right_phase) * gain;
        self.left_phase = advance(self.left_phase, self.params.left_hz, self.sample_rate);
        self.right_phase = advance(self.right_phase, self.params.right_hz, self.sample_rate);
        (left, right)
    }

    /// Fills an interleaved buffer, writing the pair to the first two
    /// channels and their mix to any others.
    pub fn fill(&mut self, buffer: &mut [f32], channels: usize) {
        for frame in buffer.chunks_mut(channels) {
            let (left, right) = self.next_frame();
            for (index, channel) in frame.iter_mut().enumerate() {
                *channel = match index {
                    0 => left,
                    1 => right,
                    _ => 0.5 * (left + right),
                };
            }
        }
    }
}

fn advance(phase: f32, freq: f32, sample_rate: f32) -> f32 {
    (phase + freq / sample_rate).rem_euclid(1.0)
}
