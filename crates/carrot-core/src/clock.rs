//! Simulated week counter.
//!
//! The clock is the single source of truth for the current week. It never
//! holds a value above `max_weeks`: the tick that would move past the last
//! week reports [`Advance::PastEnd`] instead, and the session ends the trial.

/// Result of asking the clock for the next week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The clock moved to this week.
    Week(u32),
    /// The last week already passed; the clock did not move.
    PastEnd,
}

/// Week counter bounded by `max_weeks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    week: u32,
    max_weeks: u32,
}

impl SimulationClock {
    /// Create a clock at week 0.
    pub const fn new(max_weeks: u32) -> Self {
        Self { week: 0, max_weeks }
    }

    /// Move to the next week unless the last week has been reached.
    pub const fn advance(&mut self) -> Advance {
        if self.week >= self.max_weeks {
            return Advance::PastEnd;
        }
        self.week = self.week.saturating_add(1);
        Advance::Week(self.week)
    }

    /// Return to week 0.
    pub const fn reset(&mut self) {
        self.week = 0;
    }

    /// Current week.
    pub const fn week(&self) -> u32 {
        self.week
    }

    /// Last simulated week.
    pub const fn max_weeks(&self) -> u32 {
        self.max_weeks
    }

    /// Weeks left before the trial times out.
    pub const fn weeks_remaining(&self) -> u32 {
        self.max_weeks.saturating_sub(self.week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_week_zero() {
        let clock = SimulationClock::new(20);
        assert_eq!(clock.week(), 0);
        assert_eq!(clock.weeks_remaining(), 20);
    }

    #[test]
    fn clock_advances_to_max_then_stops() {
        let mut clock = SimulationClock::new(3);
        assert_eq!(clock.advance(), Advance::Week(1));
        assert_eq!(clock.advance(), Advance::Week(2));
        assert_eq!(clock.advance(), Advance::Week(3));
        assert_eq!(clock.advance(), Advance::PastEnd);
        assert_eq!(clock.week(), 3);
        assert_eq!(clock.advance(), Advance::PastEnd);
        assert_eq!(clock.week(), 3);
    }

    #[test]
    fn reset_clears_week() {
        let mut clock = SimulationClock::new(20);
        let _ = clock.advance();
        let _ = clock.advance();
        clock.reset();
        assert_eq!(clock.week(), 0);
        assert_eq!(clock.max_weeks(), 20);
    }
}
