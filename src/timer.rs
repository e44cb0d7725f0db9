//! Reservation countdown.

use std::fmt;

/// Length of the reservation window in seconds (15 minutes).
pub const RESERVATION_SECONDS: u32 = 15 * 60;

/// What a single tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left after this tick.
    Running(u32),
    /// The countdown reached zero on this tick. Emitted once.
    Expired,
    /// Already expired; the tick is ignored.
    Idle,
}

/// Monotonic countdown from the reservation window to zero. Not resettable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationTimer {
    remaining: u32,
}

impl ReservationTimer {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        match self.remaining {
            0 => Tick::Idle,
            1 => {
                self.remaining = 0;
                Tick::Expired
            }
            n => {
                self.remaining = n - 1;
                Tick::Running(self.remaining)
            }
        }
    }
}

impl ReservationTimer {
    /// Run the countdown out at once, for a window that ran out while no
    /// ticks were delivered.
    pub fn expire(&mut self) -> Tick {
        if self.remaining == 0 {
            return Tick::Idle;
        }
        self.remaining = 0;
        Tick::Expired
    }
}

impl Default for ReservationTimer {
    fn default() -> Self {
        Self::new(RESERVATION_SECONDS)
    }
}

/// `M:SS`, as shown in the reservation banner.
impl fmt::Display for ReservationTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
