//! Week resolution combined with a rotation.
//!
//! # Flow
//! 1. Resolve "now" to a week offset from the anchor week.
//! 2. Ask the rotation for that week's assignment.
//! 3. Attach the Monday-to-Sunday span for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::DutyRotation;
use crate::calendar::{WeekResolver, WeekSpan};
use crate::models::{Room, Schedule, WeekAssignment};

/// Which rotation design to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    /// Fixed hand-written table.
    #[default]
    Tabulated,
    /// Round-robin generator with collision avoidance.
    Rotating,
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tabulated => f.write_str("tabulated"),
            Self::Rotating => f.write_str("rotating"),
        }
    }
}

impl FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabulated" | "table" => Ok(Self::Tabulated),
            "rotating" | "round-robin" => Ok(Self::Rotating),
            other => Err(format!("unknown rotation strategy '{other}'")),
        }
    }
}

/// One resolved calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotaWeek {
    /// Whole weeks since the anchor week.
    pub week_offset: i64,
    /// Position within the rotation cycle.
    pub cycle_index: usize,
    /// Monday-to-Sunday dates.
    pub span: WeekSpan,
    /// Duties for the week.
    pub assignment: WeekAssignment,
}

/// A household rotation anchored to a calendar.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use u_rota::calendar::WeekResolver;
/// use u_rota::models::rooms_from_ids;
/// use u_rota::scheduler::{Rota, TabulatedPattern};
///
/// let rooms = rooms_from_ids(["Zimmer 1", "Zimmer 2", "Zimmer 3"]);
/// let pattern = TabulatedPattern::household(rooms).unwrap();
/// let start = NaiveDate::from_ymd_opt(2023, 12, 4).unwrap();
/// let rota = Rota::new(pattern, WeekResolver::new(start, 1).unwrap());
///
/// let now = Utc.with_ymd_and_hms(2023, 12, 13, 12, 0, 0).unwrap();
/// let week = rota.current_week(now);
/// assert_eq!(week.week_offset, 1);
/// assert_eq!(week.assignment.garbage_kitchen_room(), Some("Zimmer 2"));
/// ```
#[derive(Debug, Clone)]
pub struct Rota {
    rotation: Arc<dyn DutyRotation>,
    resolver: WeekResolver,
}

impl Rota {
    /// Creates a rota from a rotation and a resolver.
    pub fn new<R: DutyRotation + 'static>(rotation: R, resolver: WeekResolver) -> Self {
        Self {
            rotation: Arc::new(rotation),
            resolver,
        }
    }

    /// The rotation in use.
    pub fn rotation(&self) -> &dyn DutyRotation {
        self.rotation.as_ref()
    }

    /// The week resolver in use.
    pub fn resolver(&self) -> &WeekResolver {
        &self.resolver
    }

    /// Rooms in rotation order.
    pub fn rooms(&self) -> &[Room] {
        self.rotation.rooms()
    }

    /// Number of weeks before the rotation repeats.
    pub fn cycle_length(&self) -> usize {
        self.rotation.cycle_length()
    }

    /// Resolves a week offset.
    pub fn week_at(&self, week_offset: i64) -> RotaWeek {
        RotaWeek {
            week_offset,
            cycle_index: self.rotation.cycle_position(week_offset),
            span: self.resolver.week_span(week_offset),
            assignment: self.rotation.assignment_for_week(week_offset),
        }
    }

    /// The week containing `now`.
    pub fn current_week(&self, now: DateTime<Utc>) -> RotaWeek {
        self.week_at(self.resolver.week_offset(now))
    }

    /// The week after the one containing `now`.
    pub fn next_week(&self, now: DateTime<Utc>) -> RotaWeek {
        self.week_at(self.resolver.week_offset(now) + 1)
    }

    /// `num_weeks` consecutive weeks starting with the one containing `now`.
    pub fn upcoming(&self, now: DateTime<Utc>, num_weeks: usize) -> Schedule {
        let first = self.resolver.week_offset(now);
        tracing::debug!(
            strategy = self.rotation.name(),
            first_week = first,
            num_weeks,
            "building upcoming schedule"
        );
        self.rotation.schedule(first, num_weeks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{rooms_from_ids, DutyKind};
    use crate::scheduler::{RotatingGenerator, RotationState, TabulatedPattern};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn zimmer() -> Vec<Room> {
        rooms_from_ids(["Zimmer 1", "Zimmer 2", "Zimmer 3"])
    }

    fn resolver() -> WeekResolver {
        WeekResolver::new(NaiveDate::from_ymd_opt(2023, 12, 9).unwrap(), 1).unwrap()
    }

    #[test]
    fn test_tabulated_current_and_next() {
        let rota = Rota::new(TabulatedPattern::household(zimmer()).unwrap(), resolver());
        // Local Saturday 2023-12-09 00:00
        let now = Utc.with_ymd_and_hms(2023, 12, 8, 23, 0, 0).unwrap();

        let current = rota.current_week(now);
        assert_eq!(current.week_offset, 0);
        assert_eq!(current.cycle_index, 0);
        assert_eq!(current.span.to_string(), "04.12.2023 - 10.12.2023");

        let next = rota.next_week(now);
        assert_eq!(next.week_offset, 1);
        assert_eq!(next.cycle_index, 1);

        let four_later = rota.current_week(now + Duration::weeks(4));
        assert_eq!(four_later.cycle_index, 0);
        assert_eq!(four_later.assignment, current.assignment);
    }

    #[test]
    fn test_rotating_household_weeks() {
        let g = RotatingGenerator::with_seed(zimmer(), RotationState::first_bathroom(2, 3)).unwrap();
        let rota = Rota::new(g, resolver());
        let now = Utc.with_ymd_and_hms(2023, 12, 8, 23, 0, 0).unwrap();

        let week0 = rota.current_week(now).assignment;
        assert_eq!(week0.duty_for("Zimmer 1"), Some(&DutyKind::GarbageKitchen));
        assert_eq!(week0.duty_for("Zimmer 2"), Some(&DutyKind::Free));
        assert_eq!(week0.duty_for("Zimmer 3"), Some(&DutyKind::Free));

        let week1 = rota.next_week(now).assignment;
        assert_eq!(week1.duty_for("Zimmer 1"), Some(&DutyKind::Free));
        assert_eq!(week1.duty_for("Zimmer 2"), Some(&DutyKind::GarbageKitchen));
        assert_eq!(week1.duty_for("Zimmer 3"), Some(&DutyKind::Bathroom));
    }

    #[test]
    fn test_upcoming_matches_week_at() {
        let rota = Rota::new(RotatingGenerator::new(zimmer()).unwrap(), resolver());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let schedule = rota.upcoming(now, 10);
        assert_eq!(schedule.len(), 10);
        for (w, week) in schedule.iter() {
            assert_eq!(&rota.week_at(w).assignment, week);
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Rotating".parse::<RotationStrategy>(), Ok(RotationStrategy::Rotating));
        assert_eq!("table".parse::<RotationStrategy>(), Ok(RotationStrategy::Tabulated));
        assert!("random".parse::<RotationStrategy>().is_err());
        assert_eq!(RotationStrategy::default().to_string(), "tabulated");
    }
}
