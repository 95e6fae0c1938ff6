use std::sync::{Mutex, MutexGuard};

use crate::error::ScopeError;

/// One vectorscope sample: channel 0 on `x`, channel 1 on `y`.
///
/// Values are nominally normalized to [-1, 1] but are never clamped, so a
/// clipping source simply draws outside the unit circle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Uniform scale followed by translation: `self * scale + offset`.
    pub fn transform(self, offset: Point, scale: f32) -> Point {
        Point {
            x: self.x * scale + offset.x,
            y: self.y * scale + offset.y,
        }
    }
}

struct RingState {
    slots: Box<[Point]>,
    cursor: usize,
}

/// Fixed-capacity circular buffer of the most recently ingested points.
///
/// Slots and cursor share a single mutex. Writers and readers both take it,
/// so readers also serialize against each other. Walking `capacity` slots
/// from the cursor yields the last `capacity` writes, oldest first.
pub struct VertexRing {
    state: Mutex<RingState>,
    capacity: usize,
}

impl VertexRing {
    /// Two points are needed to form a single line segment.
    pub const MIN_CAPACITY: usize = 2;

    /// Default number of samples drawn each frame.
    pub const DEFAULT_CAPACITY: usize = 2048;

    /// Upper bound on the ring size, keeping each walk a bounded lock hold.
    pub const MAX_CAPACITY: usize = 1 << 20;

    pub fn new(capacity: usize) -> Result<Self, ScopeError> {
        if !(Self::MIN_CAPACITY..=Self::MAX_CAPACITY).contains(&capacity) {
            return Err(ScopeError::Capacity(capacity));
        }
        Ok(Self {
            state: Mutex::new(RingState {
                slots: vec![Point::ZERO; capacity].into_boxed_slice(),
                cursor: 0,
            }),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores `point` at the cursor and advances it, overwriting the oldest sample.
    pub fn write(&self, point: Point) -> Result<(), ScopeError> {
        let mut state = self.lock()?;
        let cursor = state.cursor;
        state.slots[cursor] = point;
        state.cursor = (cursor + 1) % self.capacity;
        Ok(())
    }

    /// Visits every slot from oldest to newest while holding the lock.
    pub fn snapshot_walk<F>(&self, mut visit: F) -> Result<(), ScopeError>
    where
        F: FnMut(Point),
    {
        let state = self.lock()?;
        let (newer, older) = state.slots.split_at(state.cursor);
        for point in older.iter().chain(newer) {
            visit(*point);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Vec<Point>, ScopeError> {
        let mut points = Vec::with_capacity(self.capacity);
        self.snapshot_walk(|point| points.push(point))?;
        Ok(points)
    }

    /// Index of the next slot to be overwritten.
    pub fn cursor(&self) -> Result<usize, ScopeError> {
        Ok(self.lock()?.cursor)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RingState>, ScopeError> {
        self.state.lock().map_err(|_| ScopeError::LockPoisoned)
    }
}
