//! Frame sampling and interpolation.
//!
//! The sampler snapshots the shared analysis window on its own cadence,
//! independent of how often the render loop ticks. Between snapshots,
//! each render tick blends the previous and current snapshot with an
//! eased factor derived from elapsed time, so the drawn waveform moves
//! smoothly even when sampling is much slower than rendering.

/// Easing applied to the interpolation factor.
///
/// Quadratic ramp-in below 0.25, then a decelerating settle. The input
/// is deliberately not clamped: a render tick that arrives later than
/// one full cadence produces a factor past 1.0 and the blend
/// extrapolates beyond the current snapshot.
pub fn ease(x: f64) -> f64 {
    if x < 0.25 {
        x * x
    } else {
        -1.0 + (4.0 - 2.0 * x) * x
    }
}

/// Snapshots the analysis window on a fixed cadence and interpolates
/// between the two most recent snapshots.
pub struct FrameSampler {
    cadence_ms: f64,
    last_sample_time: f64,
    previous: Vec<f32>,
    current: Vec<f32>,
    blended: Vec<f32>,
}

impl FrameSampler {
    /// Creates a sampler with the given sampling cadence in milliseconds.
    /// Cadence must be positive.
    pub fn new(cadence_ms: f64) -> Self {
        FrameSampler {
            cadence_ms: cadence_ms.max(f64::MIN_POSITIVE),
            last_sample_time: f64::NEG_INFINITY,
            previous: Vec::new(),
            current: Vec::new(),
            blended: Vec::new(),
        }
    }

    /// Advances the sampler to the given timestamp (milliseconds on any
    /// monotonic clock) and returns the blended frame.
    ///
    /// `capture` is invoked only when a full cadence has elapsed since
    /// the last snapshot; the previous snapshot is promoted at exactly
    /// that moment. Returns an empty slice until the first capture
    /// yields samples.
    pub fn tick<F>(&mut self, now_ms: f64, capture: F) -> &[f32]
    where
        F: FnOnce() -> Vec<f32>,
    {
        if now_ms - self.last_sample_time >= self.cadence_ms {
            self.previous = std::mem::replace(&mut self.current, capture());
            self.last_sample_time = now_ms;
        }

        if self.current.is_empty() {
            self.blended.clear();
            return &self.blended;
        }

        let progress = (now_ms - self.last_sample_time) / self.cadence_ms;
        let k = ease(progress) as f32;

        self.blended.clear();
        self.blended.reserve(self.current.len());
        for (i, &cur) in self.current.iter().enumerate() {
            let prev = self.previous.get(i).copied().unwrap_or(0.0);
            self.blended.push(prev + (cur - prev) * k);
        }
        &self.blended
    }

    /// Drops both snapshots and rearms the sampler so the next tick
    /// captures immediately.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.current.clear();
        self.blended.clear();
        self.last_sample_time = f64::NEG_INFINITY;
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn ease_endpoints() {
        assert_close(ease(0.0), 0.0);
        assert_close(ease(1.0), 1.0);
    }

    #[test]
    fn ease_ramp_branch_below_quarter() {
        assert_close(ease(0.1), 0.01);
        assert_close(ease(0.2), 0.04);
    }

    #[test]
    fn ease_boundary_takes_settle_branch() {
        // Strict < on the ramp branch: 0.25 evaluates the settle side.
        assert_close(ease(0.25), -1.0 + (4.0 - 0.5) * 0.25);
    }

    #[test]
    fn ease_midpoint() {
        assert_close(ease(0.5), 0.5);
    }

    #[test]
    fn ease_extrapolates_past_one() {
        // Late ticks feed factors above 1.0 straight through.
        assert_close(ease(1.5), -1.0 + (4.0 - 3.0) * 1.5);
    }

    #[test]
    fn first_tick_captures_immediately() {
        let mut sampler = FrameSampler::new(100.0);
        let frame = sampler.tick(0.0, || vec![0.5, -0.5]);
        // progress 0 right after a capture: blend sits on the previous
        // snapshot, which is all zeros before the first promotion
        assert_eq!(frame, &[0.0, 0.0]);
    }

    #[test]
    fn no_capture_before_cadence_elapses() {
        let mut sampler = FrameSampler::new(100.0);
        sampler.tick(0.0, || vec![1.0]);
        sampler.tick(99.0, || panic!("captured before cadence elapsed"));
    }

    #[test]
    fn capture_promotes_current_to_previous() {
        let mut sampler = FrameSampler::new(100.0);
        sampler.tick(0.0, || vec![0.0]);
        sampler.tick(100.0, || vec![1.0]);
        // halfway through the cadence: ease(0.5) = 0.5
        let frame = sampler.tick(150.0, || panic!("unexpected capture")).to_vec();
        assert!((frame[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn late_tick_recaptures_and_restarts_blend() {
        let mut sampler = FrameSampler::new(100.0);
        sampler.tick(0.0, || vec![0.0]);
        sampler.tick(100.0, || vec![1.0]);
        // 1.5 cadences since the last snapshot: a fresh capture happens
        // and the blend restarts from the promoted snapshot
        let frame = sampler.tick(250.0, || vec![-1.0]).to_vec();
        assert!((frame[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_until_first_samples() {
        let mut sampler = FrameSampler::new(100.0);
        let frame = sampler.tick(0.0, Vec::new);
        assert!(frame.is_empty());
    }

    #[test]
    fn reset_drops_snapshots_and_rearms() {
        let mut sampler = FrameSampler::new(100.0);
        sampler.tick(0.0, || vec![1.0]);
        sampler.reset();
        // immediately recaptures after reset regardless of timestamp
        let frame = sampler.tick(1.0, || vec![0.25]);
        assert_eq!(frame.len(), 1);
    }
}
