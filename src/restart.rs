use std::time::Duration;

use instant::Instant;


pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

// Single-slot deferred game reset. At most one reset is pending at any time: arming replaces the
// previous deadline. Polled by the owner; see `fire_if_due`.
#[derive(Clone, Debug)]
pub struct RestartScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl RestartScheduler {
    pub fn new(delay: Duration) -> Self { RestartScheduler { delay, deadline: None } }

    pub fn delay(&self) -> Duration { self.delay }
    pub fn deadline(&self) -> Option<Instant> { self.deadline }
    pub fn is_armed(&self) -> bool { self.deadline.is_some() }

    pub fn arm(&mut self, now: Instant) { self.deadline = Some(now + self.delay); }

    // Returns whether there was a pending reset.
    pub fn cancel(&mut self) -> bool { self.deadline.take().is_some() }

    // Returns true exactly once per arming, on the first call at or after the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
