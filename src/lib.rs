//! Real-time X/Y vectorscope of a stereo audio stream.
//!
//! The audio thread feeds frames through [`SampleIngest`] into a shared
//! [`VertexRing`]; the render loop walks the ring once per frame with a
//! [`FrameRenderer`]. Neither side spawns threads, both just borrow the ring
//! through an `Arc`.

pub mod error;
pub mod ingest;
pub mod render;
pub mod ring;
pub mod settings;
pub mod tone;

pub use error::ScopeError;
pub use ingest::SampleIngest;
pub use render::{DrawParams, FrameRenderer, LineSink};
pub use ring::{Point, VertexRing};
