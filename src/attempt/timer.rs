// src/attempt/timer.rs

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior, interval_at, Instant};

use crate::config::{TICK_PERIOD, TIME_WARNING_SECONDS};

/// Observable state of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running(u32),
    Warning(u32),
    Expired,
    /// Halted before expiry (denied entry, submission started, candidate left).
    Stopped(u32),
}

/// Transitions reported by [`ExamTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining time first reached the warning threshold. Fires once.
    Warning { remaining: u32 },
    /// Remaining time reached zero. Fires once.
    Expired,
}

/// Countdown for one attempt. Transitions depend only on the current state
/// and the tick, so no wall clock is involved.
#[derive(Debug, Clone)]
pub struct ExamTimer {
    remaining: u32,
    warn_at: u32,
    warned: bool,
    expired: bool,
    stopped: bool,
}

impl ExamTimer {
    pub fn new(total_seconds: u32) -> Self {
        Self::with_warning(total_seconds, TIME_WARNING_SECONDS)
    }

    pub fn with_warning(total_seconds: u32, warn_at: u32) -> Self {
        Self {
            remaining: total_seconds,
            warn_at,
            warned: false,
            expired: false,
            stopped: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_ticking(&self) -> bool {
        !self.stopped && !self.expired
    }

    pub fn state(&self) -> TimerState {
        if self.expired {
            TimerState::Expired
        } else if self.stopped {
            TimerState::Stopped(self.remaining)
        } else if self.remaining <= self.warn_at {
            TimerState::Warning(self.remaining)
        } else {
            TimerState::Running(self.remaining)
        }
    }

    /// Reports the condition the countdown starts in: `Expired` for a zero
    /// duration, `Warning` when it starts exactly at the threshold. Later
    /// calls return `None`.
    pub fn start(&mut self) -> Option<TimerEvent> {
        if !self.is_ticking() {
            return None;
        }
        if self.remaining == 0 {
            self.expired = true;
            return Some(TimerEvent::Expired);
        }
        if self.remaining == self.warn_at && !self.warned {
            self.warned = true;
            return Some(TimerEvent::Warning {
                remaining: self.remaining,
            });
        }
        None
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.is_ticking() {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.expired = true;
            return Some(TimerEvent::Expired);
        }

        if self.remaining == self.warn_at && !self.warned {
            self.warned = true;
            return Some(TimerEvent::Warning {
                remaining: self.remaining,
            });
        }

        None
    }

    /// Stops the countdown for good. No event fires afterwards.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// `MM:SS`, or `HH:MM:SS` when an hour or more remains.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining)
    }
}

pub fn format_clock(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Source of countdown ticks.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next second has elapsed.
    async fn tick(&mut self);
}

/// Wall-clock ticker backed by a tokio interval.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn every_second() -> Self {
        // First tick one period from now; `interval` would otherwise fire immediately.
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut ExamTimer, ticks: u32) -> Vec<(u32, TimerEvent)> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            if let Some(event) = timer.tick() {
                events.push((timer.remaining(), event));
            }
        }
        events
    }

    #[test]
    fn test_warning_fires_once_at_threshold() {
        let mut timer = ExamTimer::new(30 * 60);
        let events = run(&mut timer, 30 * 60 - 1);
        assert_eq!(
            events,
            vec![(300, TimerEvent::Warning { remaining: 300 })]
        );
        assert_eq!(timer.state(), TimerState::Warning(1));
    }

    #[test]
    fn test_expiry_fires_once() {
        let mut timer = ExamTimer::new(400);
        let events = run(&mut timer, 1000);
        assert_eq!(
            events,
            vec![
                (300, TimerEvent::Warning { remaining: 300 }),
                (0, TimerEvent::Expired)
            ]
        );
        assert_eq!(timer.state(), TimerState::Expired);
        assert!(!timer.is_ticking());
    }

    #[test]
    fn test_short_exam_starts_in_warning_without_alert() {
        let mut timer = ExamTimer::new(120);
        assert_eq!(timer.state(), TimerState::Warning(120));
        let events = run(&mut timer, 120);
        assert_eq!(events, vec![(0, TimerEvent::Expired)]);
    }

    #[test]
    fn test_stop_halts_countdown() {
        let mut timer = ExamTimer::new(600);
        timer.tick();
        timer.stop();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state(), TimerState::Stopped(599));
        assert_eq!(run(&mut timer, 1000), Vec::new());
    }

    #[test]
    fn test_zero_duration_expires_on_first_tick() {
        let mut timer = ExamTimer::new(0);
        assert_eq!(timer.tick(), Some(TimerEvent::Expired));
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_zero_duration_expires_on_start() {
        let mut timer = ExamTimer::new(0);
        assert_eq!(timer.start(), Some(TimerEvent::Expired));
        assert_eq!(timer.state(), TimerState::Expired);
        assert_eq!(timer.start(), None);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_five_minute_exam_warns_on_start_once() {
        let mut timer = ExamTimer::new(5 * 60);
        assert_eq!(timer.start(), Some(TimerEvent::Warning { remaining: 300 }));
        assert_eq!(timer.start(), None);
        let events = run(&mut timer, 300);
        assert_eq!(events, vec![(0, TimerEvent::Expired)]);
    }

    #[test]
    fn test_start_is_quiet_for_longer_exams() {
        let mut timer = ExamTimer::new(301);
        assert_eq!(timer.start(), None);
        let events = run(&mut timer, 1);
        assert_eq!(events, vec![(300, TimerEvent::Warning { remaining: 300 })]);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(305), "05:05");
        assert_eq!(format_clock(3725), "01:02:05");
    }

    #[tokio::test]
    async fn test_interval_ticker_waits_a_full_period() {
        let start = Instant::now();
        let mut ticker = IntervalTicker::every_second();
        ticker.tick().await;
        assert!(start.elapsed() >= TICK_PERIOD);
    }
}
