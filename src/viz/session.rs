//! Visualization session.
//!
//! `VizSession` is the single owner of the raster surface, the frame
//! sampler and the renderer for one run of the cooperative render
//! loop. Downstream code borrows the pixmap and the blended frame; it
//! never takes ownership. A change of cadence, smoothness or surface
//! dimensions means tearing the session down and building a new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::config::VisualizerConfig;
use crate::error::{PlayerError, Result};
use crate::player::tap::SharedWindow;
use crate::viz::renderer::{parse_hex_color, RenderStyle, WaveformRenderer};
use crate::viz::sampler::FrameSampler;

pub struct VizSession {
    pixmap: Pixmap,
    sampler: FrameSampler,
    renderer: WaveformRenderer,
    cancelled: Arc<AtomicBool>,
}

impl VizSession {
    /// Builds a session from the visualizer configuration.
    ///
    /// # Errors
    /// - If the line color is not a valid `#RRGGBB` string
    /// - If the surface dimensions are zero
    pub fn new(cfg: &VisualizerConfig) -> Result<Self> {
        let line_color = parse_hex_color(&cfg.line_color).ok_or_else(|| {
            PlayerError::Render(format!("invalid line color {:?}", cfg.line_color))
        })?;

        let pixmap = Pixmap::new(cfg.surface_width, cfg.surface_height).ok_or_else(|| {
            PlayerError::Render(format!(
                "invalid surface dimensions {}x{}",
                cfg.surface_width, cfg.surface_height
            ))
        })?;

        let style = RenderStyle {
            line_color,
            background: tiny_skia::Color::BLACK,
            line_width: cfg.line_width,
            amplitude_scale: cfg.amplitude_scale,
            smoothness: cfg.smoothness,
        };

        Ok(VizSession {
            pixmap,
            sampler: FrameSampler::new(cfg.sampling_cadence_ms.max(1) as f64),
            renderer: WaveformRenderer::new(style),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag the render loop checks each iteration. Setting it
    /// from a signal handler or key handler stops the loop at the next
    /// tick.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Runs one render tick: advances the sampler against the shared
    /// analysis window and repaints the surface. Returns the blended
    /// frame that was drawn.
    pub fn render_tick(&mut self, now_ms: f64, window: &SharedWindow) -> Result<&[f32]> {
        let frame = self.sampler.tick(now_ms, || {
            window
                .lock()
                .ok()
                .filter(|w| w.has_samples())
                .map(|w| w.snapshot())
                .unwrap_or_default()
        });
        self.renderer.render(&mut self.pixmap, frame)?;
        Ok(frame)
    }

    /// Drops both snapshots and repaints the idle centerline.
    pub fn reset(&mut self) -> Result<()> {
        self.sampler.reset();
        self.renderer.render(&mut self.pixmap, &[])
    }

    /// The rendered surface, e.g. for dumping the last frame to disk.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}
