//! Playback lifecycle state machine.
//!
//! All playback state changes flow through `LifecycleController`.
//! The controller owns the playback resource behind the
//! `PlaybackResource` seam so the state machine can be exercised in
//! tests without an audio device. Triggers that are not legal in the
//! current state are no-ops, logged at debug level.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Playback lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No track selected
    Idle,
    /// Track selected, resource opening
    Loading,
    /// Track decoded and ready to play
    Ready,
    Playing,
    Paused,
    /// Track ran to its natural end
    Ended,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Seam between the state machine and the audio backend.
pub trait PlaybackResource {
    /// Creates the device context. Idempotent.
    fn acquire(&mut self) -> Result<()>;
    /// Opens the track and reports its duration when known.
    fn probe(&mut self, track: &Path) -> Result<Option<Duration>>;
    /// Starts or unpauses playback.
    fn resume(&mut self) -> Result<()>;
    fn pause(&mut self);
    /// Drops current playback, keeping the device context.
    fn stop(&mut self);
    fn position(&self) -> Duration;
    fn is_finished(&self) -> bool;
}

/// Drives a `PlaybackResource` through the playback lifecycle.
pub struct LifecycleController<R> {
    resource: R,
    state: PlaybackState,
    track: Option<PathBuf>,
    duration: Option<Duration>,
    acquired: bool,
}

impl<R: PlaybackResource> LifecycleController<R> {
    pub fn new(resource: R) -> Self {
        LifecycleController {
            resource,
            state: PlaybackState::Idle,
            track: None,
            duration: None,
            acquired: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn track(&self) -> Option<&Path> {
        self.track.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn position(&self) -> Duration {
        self.resource.position()
    }

    /// Selects a track: Idle -> Loading -> Ready, or back to Idle when
    /// the resource cannot be opened. Only legal from Idle.
    pub fn set_track(&mut self, track: &Path) -> Result<()> {
        if self.state != PlaybackState::Idle {
            tracing::debug!("Ignoring track selection in state {}", self.state);
            return Ok(());
        }

        self.state = PlaybackState::Loading;
        self.track = Some(track.to_path_buf());

        match self.resource.probe(track) {
            Ok(duration) => {
                self.duration = duration;
                self.state = PlaybackState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Track load failed: {e}");
                self.track = None;
                self.duration = None;
                self.state = PlaybackState::Idle;
                Err(e)
            }
        }
    }

    /// Starts or resumes playback from Ready or Paused.
    ///
    /// The first play of a session acquires the device context; a
    /// platform refusal leaves the state untouched so the machine never
    /// claims Playing without audio running.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused => {
                if !self.acquired {
                    self.resource.acquire()?;
                    self.acquired = true;
                }
                if let Err(e) = self.resource.resume() {
                    tracing::warn!("Playback refused: {e}");
                    return Err(e);
                }
                self.state = PlaybackState::Playing;
                Ok(())
            }
            _ => {
                tracing::debug!("Ignoring play in state {}", self.state);
                Ok(())
            }
        }
    }

    /// Pauses from Playing; the device context stays acquired.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.resource.pause();
            self.state = PlaybackState::Paused;
        } else {
            tracing::debug!("Ignoring pause in state {}", self.state);
        }
    }

    /// Flips between Playing and Paused; no-op elsewhere.
    pub fn toggle(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => {
                self.pause();
                Ok(())
            }
            PlaybackState::Ready | PlaybackState::Paused => self.play(),
            _ => Ok(()),
        }
    }

    /// Marks natural end of playback. Returns true when the transition
    /// to Ended happened on this call.
    pub fn poll_ended(&mut self) -> bool {
        if self.state == PlaybackState::Playing && self.resource.is_finished() {
            tracing::info!("Track ended");
            self.state = PlaybackState::Ended;
            return true;
        }
        false
    }

    /// Returns to Idle from any state.
    ///
    /// Playback is stopped before the track reference is cleared, and
    /// the device context is deliberately kept for the next track.
    pub fn reset(&mut self) {
        self.resource.stop();
        self.track = None;
        self.duration = None;
        self.state = PlaybackState::Idle;
        tracing::debug!("Lifecycle reset to idle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlayerError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records calls in order and fails on demand.
    struct FakeResource {
        calls: Rc<RefCell<Vec<String>>>,
        fail_probe: bool,
        fail_resume: bool,
        fail_acquire: bool,
        finished: bool,
    }

    impl FakeResource {
        fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                FakeResource {
                    calls: calls.clone(),
                    fail_probe: false,
                    fail_resume: false,
                    fail_acquire: false,
                    finished: false,
                },
                calls,
            )
        }
    }

    impl PlaybackResource for FakeResource {
        fn acquire(&mut self) -> Result<()> {
            self.calls.borrow_mut().push("acquire".into());
            if self.fail_acquire {
                return Err(PlayerError::UnsupportedPlatform("no device".into()));
            }
            Ok(())
        }

        fn probe(&mut self, track: &Path) -> Result<Option<Duration>> {
            self.calls.borrow_mut().push("probe".into());
            if self.fail_probe {
                return Err(PlayerError::Load {
                    path: track.to_path_buf(),
                    reason: "bad data".into(),
                });
            }
            Ok(Some(Duration::from_secs(180)))
        }

        fn resume(&mut self) -> Result<()> {
            self.calls.borrow_mut().push("resume".into());
            if self.fail_resume {
                return Err(PlayerError::PlaybackBlocked("refused".into()));
            }
            Ok(())
        }

        fn pause(&mut self) {
            self.calls.borrow_mut().push("pause".into());
        }

        fn stop(&mut self) {
            self.calls.borrow_mut().push("stop".into());
        }

        fn position(&self) -> Duration {
            Duration::ZERO
        }

        fn is_finished(&self) -> bool {
            self.finished
        }
    }

    fn controller() -> (LifecycleController<FakeResource>, Rc<RefCell<Vec<String>>>) {
        let (resource, calls) = FakeResource::new();
        (LifecycleController::new(resource), calls)
    }

    #[test]
    fn full_lifecycle_walk() {
        let (mut c, _) = controller();
        assert_eq!(c.state(), PlaybackState::Idle);

        c.set_track(Path::new("song.mp3")).unwrap();
        assert_eq!(c.state(), PlaybackState::Ready);
        assert_eq!(c.duration(), Some(Duration::from_secs(180)));

        c.play().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);

        c.pause();
        assert_eq!(c.state(), PlaybackState::Paused);

        c.play().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);

        c.reset();
        assert_eq!(c.state(), PlaybackState::Idle);
        assert!(c.track().is_none());
    }

    #[test]
    fn natural_end_transitions_to_ended() {
        let (mut c, _) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.play().unwrap();

        c.resource.finished = true;
        assert!(c.poll_ended());
        assert_eq!(c.state(), PlaybackState::Ended);
        // reported once, not repeatedly
        assert!(!c.poll_ended());
    }

    #[test]
    fn load_failure_returns_to_idle() {
        let (mut c, _) = controller();
        c.resource.fail_probe = true;

        let err = c.set_track(Path::new("broken.mp3")).unwrap_err();
        assert!(matches!(err, PlayerError::Load { .. }));
        assert_eq!(c.state(), PlaybackState::Idle);
        assert!(c.track().is_none());
    }

    #[test]
    fn refused_playback_never_claims_playing() {
        let (mut c, _) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.resource.fail_resume = true;

        assert!(c.play().is_err());
        assert_eq!(c.state(), PlaybackState::Ready);
    }

    #[test]
    fn acquire_failure_surfaces_and_keeps_state() {
        let (mut c, _) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.resource.fail_acquire = true;

        let err = c.play().unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedPlatform(_)));
        assert_eq!(c.state(), PlaybackState::Ready);
    }

    #[test]
    fn device_context_acquired_once_per_session() {
        let (mut c, calls) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.play().unwrap();
        c.pause();
        c.play().unwrap();

        let acquires = calls.borrow().iter().filter(|s| *s == "acquire").count();
        assert_eq!(acquires, 1);
    }

    #[test]
    fn disallowed_triggers_are_noops() {
        let (mut c, calls) = controller();

        c.pause();
        c.play().unwrap();
        assert_eq!(c.state(), PlaybackState::Idle);
        assert!(calls.borrow().is_empty());

        c.set_track(Path::new("song.mp3")).unwrap();
        // selecting again outside Idle is ignored
        c.set_track(Path::new("other.mp3")).unwrap();
        assert_eq!(c.track(), Some(Path::new("song.mp3")));
    }

    #[test]
    fn reset_stops_before_clearing_track() {
        let (mut c, calls) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.play().unwrap();

        c.reset();
        assert_eq!(calls.borrow().last().map(String::as_str), Some("stop"));
        assert!(c.track().is_none());
        assert_eq!(c.state(), PlaybackState::Idle);
    }

    #[test]
    fn reset_from_idle_is_allowed() {
        let (mut c, _) = controller();
        c.reset();
        assert_eq!(c.state(), PlaybackState::Idle);
    }

    #[test]
    fn reset_after_ended_returns_to_idle() {
        let (mut c, _) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();
        c.play().unwrap();
        c.resource.finished = true;
        c.poll_ended();

        c.reset();
        assert_eq!(c.state(), PlaybackState::Idle);
        // a new track can be selected right away
        c.set_track(Path::new("next.mp3")).unwrap();
        assert_eq!(c.state(), PlaybackState::Ready);
    }

    #[test]
    fn toggle_flips_between_playing_and_paused() {
        let (mut c, _) = controller();
        c.set_track(Path::new("song.mp3")).unwrap();

        c.toggle().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);
        c.toggle().unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);
        c.toggle().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn state_display_names() {
        assert_eq!(PlaybackState::Idle.to_string(), "idle");
        assert_eq!(PlaybackState::Playing.to_string(), "playing");
    }
}
