//! Time source port
//!
//! Default parameters for live queries come from here. Production uses the
//! system clock rebased onto the chain epoch; tests pin the clock.

/// Source of "now" in seconds since the chain epoch.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> u64;
}

/// System clock rebased onto the chain epoch.
pub struct SystemTimeSource {
    epoch: u64,
}

impl SystemTimeSource {
    /// `epoch` is the Unix timestamp of the chain epoch, from the network
    /// schedule.
    pub fn new(epoch: u64) -> Self {
        Self { epoch }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .saturating_sub(self.epoch)
    }
}

/// Fixed time source for tests.
pub struct FixedTimeSource(pub u64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> u64 {
        self.0
    }
}
