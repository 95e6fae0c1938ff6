use std::sync::Arc;

use cpal::{FromSample, Sample};

use crate::error::ScopeError;
use crate::ring::{Point, VertexRing};

/// Writer side of the scope: turns interleaved audio frames into ring points.
///
/// Channel 0 maps to `x` and channel 1 to `y`. Further channels are ignored,
/// and a mono source is drawn on the diagonal. Every frame is its own ring
/// write, so a reader may see a block half applied but never a torn point.
#[derive(Clone)]
pub struct SampleIngest {
    ring: Arc<VertexRing>,
    channels: usize,
}

impl SampleIngest {
    pub fn new(ring: Arc<VertexRing>) -> Self {
        Self { ring, channels: 2 }
    }

    pub fn with_channels(ring: Arc<VertexRing>, channels: usize) -> Result<Self, ScopeError> {
        if channels == 0 {
            return Err(ScopeError::Channels(channels));
        }
        Ok(Self { ring, channels })
    }

    /// Writes every complete frame of `frames` in arrival order and returns
    /// how many were written. A trailing partial frame is dropped.
    pub fn on_audio_block(&self, frames: &[f32]) -> Result<usize, ScopeError> {
        let mut written = 0;
        for frame in frames.chunks_exact(self.channels) {
            self.ring.write(frame_point(frame[0], frame.get(1).copied()))?;
            written += 1;
        }
        Ok(written)
    }

    /// Same as [`on_audio_block`](Self::on_audio_block) for any cpal sample
    /// format, normalizing each sample to `f32` first.
    pub fn on_audio_samples<T>(&self, samples: &[T]) -> Result<usize, ScopeError>
    where
        T: Sample,
        f32: FromSample<T>,
    {
        let mut written = 0;
        for frame in samples.chunks_exact(self.channels) {
            let x = f32::from_sample(frame[0]);
            let y = frame.get(1).map(|&s| f32::from_sample(s));
            self.ring.write(frame_point(x, y))?;
            written += 1;
        }
        Ok(written)
    }
}

fn frame_point(x: f32, y: Option<f32>) -> Point {
    Point::new(x, y.unwrap_or(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: usize, channels: usize) -> (Arc<VertexRing>, SampleIngest) {
        let ring = Arc::new(VertexRing::new(capacity).unwrap());
        let ingest = SampleIngest::with_channels(Arc::clone(&ring), channels).unwrap();
        (ring, ingest)
    }

    #[test]
    fn stereo_frames_map_left_to_x_and_right_to_y() {
        let (ring, ingest) = setup(4, 2);
        let written = ingest
            .on_audio_block(&[1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0, -1.0])
            .unwrap();
        assert_eq!(written, 4);
        assert_eq!(ring.cursor().unwrap(), 0);
        assert_eq!(
            ring.snapshot().unwrap(),
            vec![
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(-1.0, 0.0),
                Point::new(0.0, -1.0),
            ]
        );
    }

    #[test]
    fn varying_block_sizes_wrap_through_the_ring() {
        let (ring, ingest) = setup(4, 2);
        let block: Vec<f32> = (0..6).flat_map(|i| [i as f32, i as f32 * 10.0]).collect();
        ingest.on_audio_block(&block[..2]).unwrap();
        ingest.on_audio_block(&block[2..8]).unwrap();
        ingest.on_audio_block(&block[8..]).unwrap();
        let xs: Vec<f32> = ring.snapshot().unwrap().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn extra_channels_and_partial_frames_are_ignored() {
        let (ring, ingest) = setup(3, 4);
        let written = ingest
            .on_audio_block(&[0.1, 0.2, 9.0, 9.0, 0.3, 0.4, 9.0, 9.0, 0.5, 0.6])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            ring.snapshot().unwrap(),
            vec![Point::ZERO, Point::new(0.1, 0.2), Point::new(0.3, 0.4)]
        );
    }

    #[test]
    fn mono_frames_draw_the_diagonal() {
        let (ring, ingest) = setup(2, 1);
        ingest.on_audio_block(&[0.25, -0.5]).unwrap();
        assert_eq!(
            ring.snapshot().unwrap(),
            vec![Point::new(0.25, 0.25), Point::new(-0.5, -0.5)]
        );
    }

    #[test]
    fn zero_channels_is_rejected() {
        let ring = Arc::new(VertexRing::new(2).unwrap());
        assert_eq!(
            SampleIngest::with_channels(ring, 0).err(),
            Some(ScopeError::Channels(0))
        );
    }

    #[test]
    fn integer_samples_are_normalized() {
        let (ring, ingest) = setup(2, 2);
        ingest
            .on_audio_samples(&[i16::MIN, 0i16, 0i16, i16::MIN])
            .unwrap();
        assert_eq!(
            ring.snapshot().unwrap(),
            vec![Point::new(-1.0, 0.0), Point::new(0.0, -1.0)]
        );

        let (ring, ingest) = setup(2, 2);
        ingest.on_audio_samples(&[32768u16, 0u16]).unwrap();
        let point = ring.snapshot().unwrap()[1];
        assert_eq!(point.x, 0.0);
        assert_eq!(point.y, -1.0);
    }

    #[test]
    fn out_of_range_amplitude_passes_through() {
        let (ring, ingest) = setup(2, 2);
        ingest.on_audio_block(&[1.5, -2.0]).unwrap();
        assert_eq!(ring.snapshot().unwrap()[1], Point::new(1.5, -2.0));
    }
}
