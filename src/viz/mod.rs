//! Live waveform visualization: sampling, interpolation, rasterization
//! and session ownership.

pub mod renderer;
pub mod sampler;
pub mod session;

pub use renderer::{parse_hex_color, slice_width, RenderStyle, WaveformRenderer};
pub use sampler::{ease, FrameSampler};
pub use session::VizSession;
