//! Audio analysis tap.
//!
//! `WaveformTap` wraps any `rodio::Source<Item = f32>` and passes
//! samples through unchanged while folding interleaved channels to a
//! mono average and writing the result into a shared fixed-length
//! analysis window. The render side reads whole snapshots of that
//! window; the tap never blocks playback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::source::SeekError;
use rodio::Source;

/// Number of mono samples held in the analysis window.
pub const ANALYSIS_WINDOW_LEN: usize = 2048;

/// How many mono samples the tap accumulates locally before taking the
/// window lock. Keeps lock traffic well below the audio callback rate.
const FLUSH_CHUNK: usize = 128;

/// Fixed-length ring buffer of normalized mono amplitudes.
///
/// The length is constant for the lifetime of the window.
pub struct AnalysisWindow {
    buf: Vec<f32>,
    pos: usize,
    written: usize,
}

impl AnalysisWindow {
    pub fn new(len: usize) -> Self {
        AnalysisWindow {
            buf: vec![0.0; len.max(1)],
            pos: 0,
            written: 0,
        }
    }

    /// Appends a run of mono samples, overwriting the oldest entries.
    pub fn extend(&mut self, samples: &[f32]) {
        for &s in samples {
            self.buf[self.pos] = s;
            self.pos = (self.pos + 1) % self.buf.len();
        }
        self.written = self.written.saturating_add(samples.len());
    }

    /// Whether any samples have been written yet.
    pub fn has_samples(&self) -> bool {
        self.written > 0
    }

    /// Copies the window contents ordered oldest to newest.
    pub fn snapshot(&self) -> Vec<f32> {
        let len = self.buf.len();
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&self.buf[self.pos..]);
        out.extend_from_slice(&self.buf[..self.pos]);
        debug_assert_eq!(out.len(), len);
        out
    }

    /// Zeroes the window and forgets that anything was written.
    pub fn clear(&mut self) {
        self.buf.fill(0.0);
        self.pos = 0;
        self.written = 0;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Shared handle to the analysis window, written by the audio thread
/// and snapshotted by the render loop.
pub type SharedWindow = Arc<Mutex<AnalysisWindow>>;

/// Creates an analysis window of the default length.
pub fn shared_window() -> SharedWindow {
    Arc::new(Mutex::new(AnalysisWindow::new(ANALYSIS_WINDOW_LEN)))
}

/// Pass-through source that feeds the analysis window.
pub struct WaveformTap<S> {
    inner: S,
    window: SharedWindow,
    channels: u16,
    sample_rate: u32,
    frame: Vec<f32>,
    pending: Vec<f32>,
}

impl<S> WaveformTap<S>
where
    S: Source<Item = f32>,
{
    pub fn new(source: S, window: SharedWindow) -> Self {
        let channels = source.channels();
        let sample_rate = source.sample_rate();
        WaveformTap {
            inner: source,
            window,
            channels,
            sample_rate,
            frame: Vec::with_capacity(channels as usize),
            pending: Vec::with_capacity(FLUSH_CHUNK),
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Ok(mut window) = self.window.lock() {
            window.extend(&self.pending);
        }
        self.pending.clear();
    }
}

impl<S> Iterator for WaveformTap<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = match self.inner.next() {
            Some(s) => s,
            None => {
                self.flush();
                return None;
            }
        };

        self.frame.push(sample);
        if self.frame.len() >= self.channels.max(1) as usize {
            let mono = self.frame.iter().sum::<f32>() / self.frame.len() as f32;
            self.frame.clear();
            self.pending.push(mono);
            if self.pending.len() >= FLUSH_CHUNK {
                self.flush();
            }
        }

        Some(sample)
    }
}

impl<S> Source for WaveformTap<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> std::result::Result<(), SeekError> {
        self.inner.try_seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn window_snapshot_orders_oldest_to_newest() {
        let mut window = AnalysisWindow::new(4);
        window.extend(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(window.snapshot(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn window_length_is_constant() {
        let mut window = AnalysisWindow::new(8);
        assert_eq!(window.snapshot().len(), 8);
        window.extend(&[0.5; 100]);
        assert_eq!(window.snapshot().len(), 8);
        assert_eq!(window.len(), 8);
    }

    #[test]
    fn window_clear_zeroes_and_forgets() {
        let mut window = AnalysisWindow::new(4);
        window.extend(&[1.0, 2.0]);
        assert!(window.has_samples());
        window.clear();
        assert!(!window.has_samples());
        assert_eq!(window.snapshot(), vec![0.0; 4]);
    }

    #[test]
    fn passthrough_samples_mono() {
        let input: Vec<f32> = (0..300).map(|i| i as f32 / 300.0).collect();
        let source = SamplesBuffer::new(1, 44100, input.clone());
        let tap = WaveformTap::new(source, shared_window());

        let output: Vec<f32> = tap.collect();
        assert_eq!(output, input);
    }

    #[test]
    fn passthrough_samples_stereo() {
        let input: Vec<f32> = (0..400).map(|i| (i as f32 - 200.0) / 200.0).collect();
        let source = SamplesBuffer::new(2, 44100, input.clone());
        let tap = WaveformTap::new(source, shared_window());

        let output: Vec<f32> = tap.collect();
        assert_eq!(output, input);
    }

    #[test]
    fn passthrough_empty_source() {
        let source = SamplesBuffer::new(1, 44100, Vec::<f32>::new());
        let tap = WaveformTap::new(source, shared_window());
        let output: Vec<f32> = tap.collect();
        assert!(output.is_empty());
    }

    #[test]
    fn stereo_folds_to_channel_average() {
        // L = 0.8, R = 0.2 everywhere: mono window should hold 0.5
        let frames = 256;
        let mut input = Vec::with_capacity(frames * 2);
        for _ in 0..frames {
            input.push(0.8);
            input.push(0.2);
        }
        let window = Arc::new(Mutex::new(AnalysisWindow::new(64)));
        let source = SamplesBuffer::new(2, 44100, input);
        let _: Vec<f32> = WaveformTap::new(source, window.clone()).collect();

        let snap = window.lock().unwrap().snapshot();
        assert!(snap.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn mono_written_verbatim() {
        let input = vec![0.25f32; 256];
        let window = Arc::new(Mutex::new(AnalysisWindow::new(32)));
        let source = SamplesBuffer::new(1, 44100, input);
        let _: Vec<f32> = WaveformTap::new(source, window.clone()).collect();

        let snap = window.lock().unwrap().snapshot();
        assert!(snap.iter().all(|&v| (v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn short_source_flushes_on_exhaustion() {
        // fewer mono samples than the flush chunk still land in the window
        let input = vec![0.5f32; 10];
        let window = Arc::new(Mutex::new(AnalysisWindow::new(32)));
        let source = SamplesBuffer::new(1, 44100, input);
        let _: Vec<f32> = WaveformTap::new(source, window.clone()).collect();

        assert!(window.lock().unwrap().has_samples());
    }

    #[test]
    fn source_properties_preserved() {
        let source = SamplesBuffer::new(2, 48000, vec![0.0f32; 100]);
        let tap = WaveformTap::new(source, shared_window());
        assert_eq!(tap.channels(), 2);
        assert_eq!(tap.sample_rate(), 48000);
    }
}
