//! Duty rotations and the week-to-assignment facade.
//!
//! Two rotation designs share one interface, [`DutyRotation`]:
//!
//! - [`RotatingGenerator`]: garbage/kitchen round-robin every week, bathroom
//!   every second week with collision avoidance. Cycle-aware.
//! - [`TabulatedPattern`]: a hand-written table repeated cyclically.
//!
//! [`Rota`] combines a rotation with a [`WeekResolver`](crate::calendar::WeekResolver)
//! to answer "who does what this week".
//!
//! # Balance
//!
//! [`DutyBalance`] counts turns per room over a schedule.

mod balance;
mod rota;
mod rotating;
mod tabulated;

pub use balance::{DutyBalance, RoomBalance};
pub use rota::{Rota, RotaWeek, RotationStrategy};
pub use rotating::{RotatingGenerator, RotationState};
pub use tabulated::{TabulatedPattern, HOUSEHOLD_CYCLE};

use crate::models::{Room, Schedule, WeekAssignment};
use std::fmt::Debug;

/// A deterministic mapping from week offset to duty assignment.
///
/// Week offsets count whole weeks from the anchor week and may be negative.
/// Implementations repeat every [`cycle_length`](Self::cycle_length) weeks
/// (after any lead-in).
pub trait DutyRotation: Send + Sync + Debug {
    /// Strategy name (e.g., "rotating", "tabulated").
    fn name(&self) -> &'static str;

    /// Rooms in rotation order.
    fn rooms(&self) -> &[Room];

    /// Number of distinct weeks before the pattern repeats.
    fn cycle_length(&self) -> usize;

    /// Assignment for a week offset.
    fn assignment_for_week(&self, week_offset: i64) -> WeekAssignment;

    /// Index of a week offset within the cycle, in `[0, cycle_length)`.
    fn cycle_position(&self, week_offset: i64) -> usize {
        crate::calendar::reduce_week(week_offset, self.cycle_length())
    }

    /// Consecutive assignments starting at `first_week`.
    fn schedule(&self, first_week: i64, num_weeks: usize) -> Schedule {
        let mut schedule = Schedule::starting_at(first_week);
        for week in (first_week..).take(num_weeks) {
            schedule.push(self.assignment_for_week(week));
        }
        schedule
    }
}
