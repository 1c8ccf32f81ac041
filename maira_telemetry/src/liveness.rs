//! Heartbeat-derived connection state

use std::time::{Duration, Instant};

/// Minimum interval between tick-counter comparisons
///
/// The check is throttled so same-frame re-reads and polling jitter do
/// not flap the connected signal.
pub const CONNECTED_CHECK_INTERVAL: Duration = Duration::from_millis(1000);

/// Connection state derived from the producer's tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    /// No comparison has happened yet
    Idle,
    /// Tick counter advanced across the last two checks
    Connected,
    /// Tick counter did not advance across the last two checks
    Disconnected,
    /// A fatal attach or decode error latched; terminal for the session
    Faulted,
}

/// Samples the snapshot tick counter on a fixed cadence and derives
/// connected/faulted signals
#[derive(Debug)]
pub struct LivenessTracker {
    state: LivenessState,
    last_tick: i32,
    next_check: Option<Instant>,
}

impl LivenessTracker {
    /// Tracker in the initial Idle state
    pub fn new() -> Self {
        Self {
            state: LivenessState::Idle,
            last_tick: 0,
            next_check: None,
        }
    }

    /// Current state
    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// True while the tick counter is advancing
    pub fn is_connected(&self) -> bool {
        self.state == LivenessState::Connected
    }

    /// True once a fault has latched
    pub fn is_faulted(&self) -> bool {
        self.state == LivenessState::Faulted
    }

    /// Feed the tick counter of a freshly decoded snapshot.
    ///
    /// Between check deadlines the previously derived state is held
    /// unchanged. Has no effect once faulted.
    pub fn observe(&mut self, now: Instant, tick: i32) {
        if self.state == LivenessState::Faulted {
            return;
        }
        if let Some(deadline) = self.next_check
            && now < deadline
        {
            return;
        }
        self.state = if tick != self.last_tick {
            LivenessState::Connected
        } else {
            LivenessState::Disconnected
        };
        self.last_tick = tick;
        self.next_check = Some(now + CONNECTED_CHECK_INTERVAL);
    }

    /// Latch the terminal fault state
    pub fn latch_fault(&mut self) {
        self.state = LivenessState::Faulted;
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advancing_ticks_connect() {
        let mut tracker = LivenessTracker::new();
        assert_eq!(tracker.state(), LivenessState::Idle);

        let t0 = Instant::now();
        tracker.observe(t0, 1);
        assert!(tracker.is_connected());

        for (step, tick) in [(1u64, 2), (2, 3), (3, 4)] {
            tracker.observe(t0 + Duration::from_secs(step), tick);
            assert!(tracker.is_connected());
        }
    }

    #[test]
    fn test_repeated_ticks_disconnect() {
        let mut tracker = LivenessTracker::new();
        let t0 = Instant::now();
        tracker.observe(t0, 5);
        assert!(tracker.is_connected());

        tracker.observe(t0 + Duration::from_secs(1), 5);
        assert_eq!(tracker.state(), LivenessState::Disconnected);
    }

    #[test]
    fn test_checks_are_throttled() {
        let mut tracker = LivenessTracker::new();
        let t0 = Instant::now();
        tracker.observe(t0, 1);
        assert!(tracker.is_connected());

        // Same tick re-observed inside the window: state held
        tracker.observe(t0 + Duration::from_millis(999), 1);
        assert!(tracker.is_connected());

        // At the deadline the repeated tick is finally noticed
        tracker.observe(t0 + Duration::from_millis(1000), 1);
        assert_eq!(tracker.state(), LivenessState::Disconnected);
    }

    #[test]
    fn test_fault_is_terminal() {
        let mut tracker = LivenessTracker::new();
        let t0 = Instant::now();
        tracker.observe(t0, 1);
        tracker.latch_fault();
        assert!(tracker.is_faulted());

        tracker.observe(t0 + Duration::from_secs(5), 99);
        assert!(tracker.is_faulted());
        assert!(!tracker.is_connected());
    }
}
