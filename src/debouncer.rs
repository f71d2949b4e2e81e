use std::time::{Duration, Instant};

/// Handle for one scheduled search. Scheduling another search invalidates
/// every earlier handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingSearch {
    id: u64,
}

/// Debounces search input: only the last term typed within the delay window
/// is ever executed. Callers pass the clock in, so the same code serves a
/// real event loop and deterministic tests.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// When the last event occurred
    last_event: Option<Instant>,
    /// The search waiting to run, if any
    pending: Option<(PendingSearch, String)>,
    next_id: u64,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_event: None,
            pending: None,
            next_id: 0,
        }
    }

    /// Schedule `term`, replacing whatever was pending
    pub fn trigger(&mut self, term: &str, now: Instant) -> PendingSearch {
        self.next_id += 1;
        let token = PendingSearch { id: self.next_id };
        self.last_event = Some(now);
        self.pending = Some((token, term.to_string()));
        token
    }

    /// Take the pending term once the delay has passed since the last event
    pub fn should_execute(&mut self, now: Instant) -> Option<String> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.delay {
            return None;
        }
        self.last_event = None;
        self.pending.take().map(|(_, term)| term)
    }

    /// Whether `token` is still the search that will run
    pub fn is_current(&self, token: PendingSearch) -> bool {
        matches!(&self.pending, Some((current, _)) if *current == token)
    }

    /// Get the time remaining before the action will trigger
    /// Returns None if no action is pending
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref()?;
        self.last_event
            .map(|last| self.delay.saturating_sub(now.saturating_duration_since(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_trigger_wins() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(300);

        let first = debouncer.trigger("h", start);
        let second = debouncer.trigger("hi", start + Duration::from_millis(100));
        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));

        // 300ms after the first keystroke but only 200ms after the last
        assert_eq!(debouncer.should_execute(start + Duration::from_millis(300)), None);
        assert_eq!(
            debouncer.time_remaining(start + Duration::from_millis(300)),
            Some(Duration::from_millis(100))
        );

        assert_eq!(
            debouncer.should_execute(start + Duration::from_millis(400)),
            Some("hi".to_string())
        );
        assert_eq!(debouncer.time_remaining(start + Duration::from_millis(400)), None);
        assert!(!debouncer.is_current(second));
        assert_eq!(debouncer.should_execute(start + Duration::from_secs(5)), None);
    }
}
