//! Waveform rasterization.
//!
//! Strokes the blended sample frame as a single polyline onto a
//! `tiny_skia::Pixmap`. The horizontal step is derived from the surface
//! width, the smoothness divisor and the analysis window length; the
//! vertical offset of each point is the sample value scaled by the
//! configured amplitude factor around the vertical center.

use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::{PlayerError, Result};

/// Stroke and layout parameters for the waveform polyline.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub line_color: Color,
    pub background: Color,
    pub line_width: f32,
    pub amplitude_scale: f32,
    pub smoothness: u32,
}

/// Horizontal distance between consecutive sample points.
///
/// Smoothness below 1 is treated as 1 so the polyline always spans at
/// least the full surface width.
pub fn slice_width(surface_width: f32, smoothness: u32, window_len: usize) -> f32 {
    surface_width * smoothness.max(1) as f32 / window_len as f32
}

/// Parses a `#RRGGBB` hex color string.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::from_rgba8(r, g, b, 255))
}

/// Paints blended frames onto a raster surface.
pub struct WaveformRenderer {
    style: RenderStyle,
}

impl WaveformRenderer {
    pub fn new(style: RenderStyle) -> Self {
        WaveformRenderer { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Clears the surface and strokes the polyline for `samples`.
    ///
    /// With no samples (no pipeline built yet) a flat centerline is
    /// drawn instead. The path always ends with an explicit segment
    /// back to the vertical center at the right edge.
    pub fn render(&self, pixmap: &mut Pixmap, samples: &[f32]) -> Result<()> {
        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;
        let mid = height / 2.0;

        pixmap.fill(self.style.background);

        let mut pb = PathBuilder::new();
        if samples.is_empty() {
            pb.move_to(0.0, mid);
            pb.line_to(width, mid);
        } else {
            let step = slice_width(width, self.style.smoothness, samples.len());
            let mut x = 0.0;
            for (i, &v) in samples.iter().enumerate() {
                let y = mid + v * self.style.amplitude_scale;
                if i == 0 {
                    pb.move_to(x, y);
                } else {
                    pb.line_to(x, y);
                }
                x += step;
            }
            pb.line_to(width, mid);
        }

        let path = pb
            .finish()
            .ok_or_else(|| PlayerError::Render("waveform path is degenerate".into()))?;

        let mut paint = Paint::default();
        paint.set_color(self.style.line_color);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.style.line_width,
            ..Stroke::default()
        };

        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }
}
