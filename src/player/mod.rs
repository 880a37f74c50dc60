//! Audio playback engine: pipeline, analysis tap, lifecycle state
//! machine and time tracking.

pub mod controller;
pub mod pipeline;
pub mod tap;
pub mod time;

pub use controller::{LifecycleController, PlaybackResource, PlaybackState};
pub use pipeline::AudioPipeline;
pub use tap::{shared_window, AnalysisWindow, SharedWindow, WaveformTap, ANALYSIS_WINDOW_LEN};
pub use time::{format_time, TimeObserver, TimeTracker};
