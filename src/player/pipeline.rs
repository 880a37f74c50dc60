//! Audio output pipeline.
//!
//! Owns the platform output stream (device context) and the playback
//! sink, and wires decoder -> analysis tap -> sink. The device context
//! is created once per session and survives track changes and resets;
//! only `release` (or drop) gives it back to the platform.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{PlayerError, Result};
use crate::player::controller::PlaybackResource;
use crate::player::tap::{SharedWindow, WaveformTap};

pub struct AudioPipeline {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    window: SharedWindow,
    track: Option<PathBuf>,
}

impl AudioPipeline {
    pub fn new(window: SharedWindow) -> Self {
        AudioPipeline {
            stream: None,
            sink: None,
            window,
            track: None,
        }
    }

    /// Whether the device context currently exists.
    pub fn is_acquired(&self) -> bool {
        self.stream.is_some()
    }

    fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
        let file = File::open(path).map_err(|e| PlayerError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Stops playback and releases the device context.
    pub fn release(&mut self) {
        self.stop();
        if self.stream.take().is_some() {
            tracing::info!("Audio device context released");
        }
    }
}

impl PlaybackResource for AudioPipeline {
    /// Creates the output stream on first call; later calls are no-ops
    /// on the same context.
    fn acquire(&mut self) -> Result<()> {
        if self.stream.is_some() {
            tracing::debug!("Audio pipeline already acquired, reusing device context");
            return Ok(());
        }

        let stream = OutputStreamBuilder::from_default_device()
            .and_then(|builder| builder.open_stream_or_fallback())
            .map_err(|e| PlayerError::UnsupportedPlatform(e.to_string()))?;

        tracing::info!("Audio device context acquired");
        self.stream = Some(stream);
        Ok(())
    }

    /// Opens and decodes the track far enough to learn its duration.
    /// Does not touch the audio device.
    fn probe(&mut self, track: &Path) -> Result<Option<Duration>> {
        let decoder = Self::open_decoder(track)?;
        let duration = decoder.total_duration();
        tracing::info!(
            "Loaded {} (duration: {:?})",
            track.display(),
            duration
        );
        self.track = Some(track.to_path_buf());
        Ok(duration)
    }

    /// Starts or resumes playback of the probed track.
    ///
    /// The first resume after a probe builds the sink and wires the
    /// analysis tap; later resumes just unpause.
    fn resume(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| PlayerError::PlaybackBlocked("device context not acquired".into()))?;

        if self.sink.is_none() {
            let track = self
                .track
                .clone()
                .ok_or_else(|| PlayerError::PlaybackBlocked("no track loaded".into()))?;
            let decoder = Self::open_decoder(&track)?;
            let tap = WaveformTap::new(decoder, self.window.clone());

            let sink = Sink::connect_new(stream.mixer());
            sink.append(tap);
            self.sink = Some(sink);
            tracing::debug!("Sink created and analysis tap attached");
        }

        if let Some(sink) = &self.sink {
            sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    /// Tears down the current sink and zeroes the analysis window.
    /// The device context stays acquired.
    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.track = None;
        if let Ok(mut window) = self.window.lock() {
            window.clear();
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| s.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(false)
    }
}

impl Drop for AudioPipeline {
    fn drop(&mut self) {
        self.release();
    }
}
