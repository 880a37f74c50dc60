//! Playback time tracking.
//!
//! Reads the playback position each tick and reports it to the display
//! observer, which derives elapsed/remaining strings for the footer.

use std::time::Duration;

/// Display-side collaborator notified on every position poll.
pub trait TimeObserver {
    fn time_changed(&mut self, current: Duration, duration: Option<Duration>);
}

/// Tracks elapsed playback time against a known-or-unknown duration.
#[derive(Debug, Default)]
pub struct TimeTracker {
    current: Duration,
    duration: Option<Duration>,
}

impl TimeTracker {
    pub fn new() -> Self {
        TimeTracker::default()
    }

    /// Records the latest position and forwards it to the observer.
    pub fn update<O: TimeObserver>(
        &mut self,
        current: Duration,
        duration: Option<Duration>,
        observer: &mut O,
    ) {
        self.current = current;
        self.duration = duration;
        observer.time_changed(current, duration);
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Remaining time, undefined while the duration is unknown.
    pub fn time_left(&self) -> Option<Duration> {
        self.duration.map(|d| d.saturating_sub(self.current))
    }

    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
        self.duration = None;
    }
}

/// Formats a duration as `m:ss` with zero-padded seconds.
pub fn format_time(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        last: Option<(Duration, Option<Duration>)>,
    }

    impl TimeObserver for Recorder {
        fn time_changed(&mut self, current: Duration, duration: Option<Duration>) {
            self.last = Some((current, duration));
        }
    }

    #[test]
    fn format_whole_minutes() {
        assert_eq!(format_time(Duration::from_secs(180)), "3:00");
    }

    #[test]
    fn format_pads_seconds() {
        assert_eq!(format_time(Duration::from_secs(65)), "1:05");
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_time(Duration::ZERO), "0:00");
    }

    #[test]
    fn format_truncates_fractional_seconds() {
        assert_eq!(format_time(Duration::from_millis(61_900)), "1:01");
    }

    #[test]
    fn time_left_is_duration_minus_current() {
        let mut tracker = TimeTracker::new();
        let mut rec = Recorder { last: None };
        tracker.update(
            Duration::from_secs(40),
            Some(Duration::from_secs(100)),
            &mut rec,
        );
        assert_eq!(tracker.current(), Duration::from_secs(40));
        assert_eq!(tracker.time_left(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn time_left_undefined_without_duration() {
        let mut tracker = TimeTracker::new();
        let mut rec = Recorder { last: None };
        tracker.update(Duration::from_secs(10), None, &mut rec);
        assert_eq!(tracker.time_left(), None);
    }

    #[test]
    fn time_left_saturates_past_the_end() {
        let mut tracker = TimeTracker::new();
        let mut rec = Recorder { last: None };
        tracker.update(
            Duration::from_secs(120),
            Some(Duration::from_secs(100)),
            &mut rec,
        );
        assert_eq!(tracker.time_left(), Some(Duration::ZERO));
    }

    #[test]
    fn observer_sees_every_update() {
        let mut tracker = TimeTracker::new();
        let mut rec = Recorder { last: None };
        tracker.update(Duration::from_secs(5), None, &mut rec);
        assert_eq!(rec.last, Some((Duration::from_secs(5), None)));
    }
}
