//! A restartable debounced value driven by an explicit clock.
//!
//! Nothing here owns a timer. Callers feed updates and poll with the current
//! instant, which lets tests drive time through [`ManualClock`].

use std::cell::Cell;
use std::time::Duration;

use web_time::Instant;

/// A source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time, on native and in the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

/// Trails a rapidly changing value, releasing it only after it has been left
/// untouched for `window`.
///
/// Every [`Debounced::update`] restarts the window. A value is released by
/// [`Debounced::poll`] exactly once, even if it equals the previously settled
/// value.
#[derive(Clone, Debug, PartialEq)]
pub struct Debounced<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    settled: Option<T>,
}

impl<T: Clone> Debounced<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            settled: None,
        }
    }

    /// Records a new value seen at `now` and restarts the quiet window.
    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Releases the pending value if its window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return None;
        }
        let (value, _) = self.pending.take()?;
        self.settled = Some(value);
        self.settled.as_ref()
    }

    /// The most recently released value.
    pub fn settled(&self) -> Option<&T> {
        self.settled.as_ref()
    }

    /// When the pending value will be released, if one is waiting.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forgets both the pending and the settled value.
    pub fn reset(&mut self) {
        self.pending = None;
        self.settled = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[test]
    fn releases_after_quiet_window() {
        let clock = ManualClock::new();
        let mut debounced = Debounced::new(WINDOW);

        debounced.update("5".to_string(), clock.now());
        clock.advance(Duration::from_millis(999));
        assert_eq!(debounced.poll(clock.now()), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(debounced.poll(clock.now()).map(String::as_str), Some("5"));
        assert_eq!(debounced.settled().map(String::as_str), Some("5"));
        assert!(!debounced.is_pending());
    }

    #[test]
    fn each_update_restarts_the_window() {
        let clock = ManualClock::new();
        let mut debounced = Debounced::new(WINDOW);

        for keystroke in ["1", "12", "123"] {
            debounced.update(keystroke.to_string(), clock.now());
            clock.advance(Duration::from_millis(600));
            assert_eq!(debounced.poll(clock.now()), None);
        }

        clock.advance(Duration::from_millis(400));
        assert_eq!(
            debounced.poll(clock.now()).map(String::as_str),
            Some("123")
        );
    }

    #[test]
    fn releases_only_once() {
        let clock = ManualClock::new();
        let mut debounced = Debounced::new(WINDOW);

        debounced.update(7u32, clock.now());
        clock.advance(WINDOW);
        assert_eq!(debounced.poll(clock.now()), Some(&7));
        clock.advance(WINDOW);
        assert_eq!(debounced.poll(clock.now()), None);

        // Re-entering the same value is released again.
        debounced.update(7u32, clock.now());
        clock.advance(WINDOW);
        assert_eq!(debounced.poll(clock.now()), Some(&7));
    }

    #[test]
    fn reset_drops_everything() {
        let clock = ManualClock::new();
        let mut debounced = Debounced::new(WINDOW);

        debounced.update(1u8, clock.now());
        assert_eq!(debounced.deadline(), Some(clock.now() + WINDOW));
        debounced.reset();
        clock.advance(WINDOW);
        assert_eq!(debounced.poll(clock.now()), None);
        assert_eq!(debounced.settled(), None);
    }
}
