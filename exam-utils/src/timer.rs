use serde::Serialize;
use tracing::{debug, trace};

/// Remaining seconds at which a countdown raises an advisory alert.
pub const ALERT_THRESHOLDS_IN_S: [u64; 3] = [30 * 60, 15 * 60, 5 * 60];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// Counts up from zero with no upper bound.
    Stopwatch,
    /// Counts down from a fixed duration and expires at zero.
    Countdown,
}

/// Advisory raised once when a countdown crosses one of `ALERT_THRESHOLDS_IN_S`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeAlert {
    pub remaining_in_s: u64,
}

impl TimeAlert {
    pub fn minutes_left(&self) -> u64 {
        self.remaining_in_s / 60
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Clock moved by one second.
    Advanced,
    /// Clock moved and crossed an alert threshold.
    Alert(TimeAlert),
    /// Countdown reached zero on this tick.
    Expired,
    /// Clock is stopped; the tick was ignored.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    kind: TimerKind,
    duration_in_s: u64,
    seconds: u64,
    running: bool,
}

impl Timer {
    pub fn stopwatch() -> Self {
        Self {
            kind: TimerKind::Stopwatch,
            duration_in_s: 0,
            seconds: 0,
            running: true,
        }
    }

    pub fn countdown(duration_in_s: u64) -> Self {
        Self {
            kind: TimerKind::Countdown,
            duration_in_s,
            seconds: duration_in_s,
            running: true,
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Elapsed seconds for a stopwatch, remaining seconds for a countdown.
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_used_in_s(&self) -> u64 {
        match self.kind {
            TimerKind::Stopwatch => self.seconds,
            TimerKind::Countdown => self.duration_in_s - self.seconds,
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> TimerEvent {
        if !self.running {
            trace!("tick on stopped timer ignored");
            return TimerEvent::Stopped;
        }

        match self.kind {
            TimerKind::Stopwatch => {
                self.seconds += 1;
                TimerEvent::Advanced
            }
            TimerKind::Countdown => {
                let previous = self.seconds;
                self.seconds = previous.saturating_sub(1);

                if self.seconds == 0 {
                    self.running = false;
                    debug!("countdown expired");
                    return TimerEvent::Expired;
                }

                // Thresholds are crossed at most once because the countdown only decreases.
                match ALERT_THRESHOLDS_IN_S
                    .iter()
                    .find(|t| previous > **t && self.seconds <= **t)
                {
                    Some(threshold) => {
                        debug!(remaining = self.seconds, threshold, "countdown alert");
                        TimerEvent::Alert(TimeAlert {
                            remaining_in_s: self.seconds,
                        })
                    }
                    None => TimerEvent::Advanced,
                }
            }
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Back to the initial reading, running again.
    pub fn restart(&mut self) {
        *self = match self.kind {
            TimerKind::Stopwatch => Self::stopwatch(),
            TimerKind::Countdown => Self::countdown(self.duration_in_s),
        };
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_time(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hrs:02}:{mins:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_counts_up_without_bound() {
        let mut timer = Timer::stopwatch();
        for _ in 0..10_000 {
            assert_eq!(timer.tick(), TimerEvent::Advanced);
        }
        assert_eq!(timer.seconds(), 10_000);
        assert_eq!(timer.time_used_in_s(), 10_000);
    }

    #[test]
    fn countdown_expires_once_then_stops() {
        let mut timer = Timer::countdown(3);

        assert_eq!(timer.tick(), TimerEvent::Advanced);
        assert_eq!(timer.tick(), TimerEvent::Advanced);
        assert_eq!(timer.tick(), TimerEvent::Expired);
        assert_eq!(timer.tick(), TimerEvent::Stopped);
        assert_eq!(timer.seconds(), 0);
        assert_eq!(timer.time_used_in_s(), 3);
    }

    #[test]
    fn zero_countdown_expires_on_first_tick() {
        let mut timer = Timer::countdown(0);

        assert!(timer.is_running());
        assert_eq!(timer.tick(), TimerEvent::Expired);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), TimerEvent::Stopped);
        assert_eq!(timer.time_used_in_s(), 0);
    }

    #[test]
    fn countdown_alerts_fire_once_each() {
        let mut timer = Timer::countdown(2 * 60 * 60);
        let mut alerts = vec![];
        loop {
            match timer.tick() {
                TimerEvent::Alert(alert) => alerts.push(alert.remaining_in_s),
                TimerEvent::Expired => break,
                TimerEvent::Advanced => {}
                TimerEvent::Stopped => panic!("stopped before expiring"),
            }
        }
        assert_eq!(alerts, vec![1800, 900, 300]);
    }

    #[test]
    fn countdown_starting_below_threshold_does_not_alert() {
        let mut timer = Timer::countdown(200);
        while timer.is_running() {
            assert!(!matches!(timer.tick(), TimerEvent::Alert(_)));
        }
    }

    #[test]
    fn stopped_timer_ignores_ticks() {
        let mut timer = Timer::stopwatch();
        timer.tick();
        timer.stop();
        assert_eq!(timer.tick(), TimerEvent::Stopped);
        assert_eq!(timer.seconds(), 1);
    }

    #[test]
    fn restart_rearms_countdown() {
        let mut timer = Timer::countdown(1801);
        assert!(matches!(timer.tick(), TimerEvent::Alert(_)));
        timer.restart();
        assert_eq!(timer.seconds(), 1801);
        assert!(matches!(timer.tick(), TimerEvent::Alert(_)));
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(7200), "02:00:00");
        assert_eq!(format_time(3725), "01:02:05");
    }
}
