use std::sync::Arc;

use egui::Color32;

use crate::error::ScopeError;
use crate::ring::{Point, VertexRing};

/// Drawing surface that accepts individual line segments in screen space.
pub trait LineSink {
    fn line_segment(&mut self, from: Point, to: Point, width: f32, color: Color32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    pub offset: Point,
    pub scale: f32,
    pub line_width: f32,
    pub color: Color32,
}

/// Reader side of the scope: projects the ring onto a [`LineSink`].
#[derive(Clone)]
pub struct FrameRenderer {
    ring: Arc<VertexRing>,
}

impl FrameRenderer {
    pub fn new(ring: Arc<VertexRing>) -> Self {
        Self { ring }
    }

    pub fn ring(&self) -> &VertexRing {
        &self.ring
    }

    /// Draws the ring as one open polyline, oldest sample first.
    ///
    /// Emits exactly `capacity - 1` segments and returns that count. The ring
    /// lock is held for the whole walk.
    pub fn render_frame<S>(&self, sink: &mut S, params: &DrawParams) -> Result<usize, ScopeError>
    where
        S: LineSink + ?Sized,
    {
        let mut previous: Option<Point> = None;
        let mut segments = 0;
        self.ring.snapshot_walk(|point| {
            let current = point.transform(params.offset, params.scale);
            if let Some(begin) = previous {
                sink.line_segment(begin, current, params.line_width, params.color);
                segments += 1;
            }
            previous = Some(current);
        })?;
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        segments: Vec<(Point, Point, f32, Color32)>,
    }

    impl LineSink for Recorder {
        fn line_segment(&mut self, from: Point, to: Point, width: f32, color: Color32) {
            self.segments.push((from, to, width, color));
        }
    }

    fn identity() -> DrawParams {
        DrawParams {
            offset: Point::ZERO,
            scale: 1.0,
            line_width: 2.0,
            color: Color32::WHITE,
        }
    }

    #[test]
    fn emits_capacity_minus_one_connected_segments() {
        let ring = Arc::new(VertexRing::new(16).unwrap());
        for i in 0..21 {
            ring.write(Point::new(i as f32, 0.0)).unwrap();
        }
        let walk = ring.snapshot().unwrap();
        let renderer = FrameRenderer::new(Arc::clone(&ring));
        let mut sink = Recorder::default();

        assert_eq!(renderer.render_frame(&mut sink, &identity()).unwrap(), 15);
        assert_eq!(sink.segments.len(), 15);
        for (i, (from, to, _, _)) in sink.segments.iter().enumerate() {
            assert_eq!(*from, walk[i]);
            assert_eq!(*to, walk[i + 1]);
        }
        // open polyline: the newest point never joins back to the oldest
        assert_eq!(sink.segments[0].0, Point::new(5.0, 0.0));
        assert_eq!(sink.segments[14].1, Point::new(20.0, 0.0));
    }

    #[test]
    fn applies_scale_then_offset() {
        let ring = Arc::new(VertexRing::new(3).unwrap());
        ring.write(Point::new(1.0, -1.0)).unwrap();
        ring.write(Point::new(-0.5, 0.25)).unwrap();
        ring.write(Point::new(0.0, 0.5)).unwrap();
        let params = DrawParams {
            offset: Point::new(512.0, 300.0),
            scale: 400.0,
            line_width: 3.5,
            color: Color32::from_rgb(10, 200, 30),
        };
        let mut sink = Recorder::default();
        FrameRenderer::new(ring).render_frame(&mut sink, &params).unwrap();

        assert_eq!(
            sink.segments,
            vec![
                (Point::new(912.0, -100.0), Point::new(312.0, 400.0), 3.5, params.color),
                (Point::new(312.0, 400.0), Point::new(512.0, 500.0), 3.5, params.color),
            ]
        );
    }

    #[test]
    fn minimum_ring_draws_one_segment_from_the_zero_slot() {
        let ring = Arc::new(VertexRing::new(2).unwrap());
        ring.write(Point::new(0.5, 0.5)).unwrap();
        let mut sink = Recorder::default();
        let count = FrameRenderer::new(ring)
            .render_frame(&mut sink, &identity())
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(sink.segments[0].0, Point::ZERO);
        assert_eq!(sink.segments[0].1, Point::new(0.5, 0.5));
    }

    #[test]
    fn repeated_frames_are_identical_without_new_writes() {
        let ring = Arc::new(VertexRing::new(8).unwrap());
        ring.write(Point::new(0.3, 0.7)).unwrap();
        let renderer = FrameRenderer::new(ring);
        let mut first = Recorder::default();
        let mut second = Recorder::default();
        renderer.render_frame(&mut first, &identity()).unwrap();
        renderer.render_frame(&mut second, &identity()).unwrap();
        assert_eq!(first.segments, second.segments);
    }
}
