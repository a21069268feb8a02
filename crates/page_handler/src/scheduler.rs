//! Pure scheduling state for the coordinator.
//!
//! Neither type reads the clock: every decision takes `now` as an argument so
//! the protocol can be driven with synthetic timestamps.

use core::time::Duration;
use tokio::time::Instant;

/// Quiet-period debounce with a zero-delay first run.
///
/// Each signal pushes the deadline to `now + quiet`; the very first signal
/// after construction schedules the run for `now` instead.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
    fresh: bool,
}

impl Debouncer {
    #[inline]
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
            fresh: true,
        }
    }

    /// Record a signal observed at `now`, restarting the countdown.
    #[inline]
    pub fn signal(&mut self, now: Instant) {
        let delay = if self.fresh { Duration::ZERO } else { self.quiet };
        self.fresh = false;
        self.deadline = Some(now + delay);
    }

    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed. Returns `true` at most once per
    /// quiet period.
    #[inline]
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Why an admission request did not start or queue a pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Suppression {
    /// The page is hidden.
    Hidden,
    /// A pass is already waiting behind the running one.
    AlreadyQueued,
}

/// Outcome of asking the gate for a pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Admission {
    /// Start a pass now.
    Admitted,
    /// A pass is running; this one waits behind it.
    Queued,
    Suppressed(Suppression),
}

#[derive(Copy, Clone, Debug)]
struct QueuedPass {
    /// When the pass was queued; the merge window is measured from here.
    at: Instant,
    /// Next time the gate wants to be consulted.
    wake: Instant,
}

/// Re-entrancy guard plus the single queued-pass slot.
///
/// While a pass runs, the first further request is queued and later ones are
/// coalesced into it. The queued pass polls every `poll` until the running
/// pass finishes, then waits until `window` has elapsed since it was queued.
#[derive(Debug)]
pub struct AdmissionGate {
    running: bool,
    visible: bool,
    queued: Option<QueuedPass>,
    poll: Duration,
    window: Duration,
}

impl AdmissionGate {
    #[inline]
    #[must_use]
    pub const fn new(poll: Duration, window: Duration) -> Self {
        Self {
            running: false,
            visible: true,
            queued: None,
            poll,
            window,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        self.queued.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Ask for a pass at `now`.
    pub fn request(&mut self, now: Instant) -> Admission {
        if !self.visible {
            return Admission::Suppressed(Suppression::Hidden);
        }
        if self.queued.is_some() {
            return Admission::Suppressed(Suppression::AlreadyQueued);
        }
        if self.running {
            self.queued = Some(QueuedPass {
                at: now,
                wake: now + self.poll,
            });
            return Admission::Queued;
        }
        self.running = true;
        Admission::Admitted
    }

    /// Clear the guard at the end of a pass.
    #[inline]
    pub const fn finish(&mut self) {
        self.running = false;
    }

    /// When the queued pass next needs attention, if one is queued.
    #[inline]
    #[must_use]
    pub fn wake_at(&self) -> Option<Instant> {
        self.queued.map(|pass| pass.wake)
    }

    /// Advance the queued pass at `now`. Returns the final outcome once the
    /// pass leaves the queue and `None` while it keeps waiting.
    pub fn on_wake(&mut self, now: Instant) -> Option<Admission> {
        let pass = self.queued.as_mut()?;
        if now < pass.wake {
            return None;
        }
        if self.running {
            pass.wake = now + self.poll;
            return None;
        }
        let release = pass.at + self.window;
        if now < release {
            pass.wake = release;
            return None;
        }
        self.queued = None;
        if !self.visible {
            return Some(Admission::Suppressed(Suppression::Hidden));
        }
        self.running = true;
        Some(Admission::Admitted)
    }
}
