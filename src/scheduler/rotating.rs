//! Round-robin rotation with collision avoidance.
//!
//! # Algorithm
//!
//! For each week `w`, starting from every room free:
//! 1. Garbage/kitchen duty moves to the next room in order, every week.
//! 2. On odd weeks, bathroom duty moves to the room after the last bathroom
//!    room. If that room already has garbage/kitchen duty, it skips one more.
//!
//! The skip can hand the same room two bathroom turns in a row; that is
//! accepted.
//!
//! # Cycle
//! The rotation's future depends only on `(w mod 2, next garbage/kitchen
//! room, last bathroom room)`, a finite state. Walking from the seed until
//! a state repeats yields a lead-in of `mu` weeks followed by a period of
//! `lambda` weeks, which defines the assignment for every week offset,
//! including offsets before the anchor.
//!
//! # Complexity
//! Cycle detection visits at most `2 * R * R` states.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::DutyRotation;
use crate::calendar::reduce_week;
use crate::error::{Result, RotaError};
use crate::models::{DutyKind, Room, Schedule, WeekAssignment};
use crate::validation::{validate_rooms, ValidationError, ValidationErrorKind};

/// Rotation position carried from one week to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationState {
    /// Room index that last had garbage/kitchen duty. `None` = not started.
    pub last_garbage_kitchen: Option<usize>,
    /// Room index that last had bathroom duty.
    pub last_bathroom: usize,
}

impl RotationState {
    /// Default seed: the last room "had" the bathroom, so the first
    /// bathroom turn goes to the first room (unless it collides).
    pub fn initial(room_count: usize) -> Self {
        Self::after_bathroom(room_count.saturating_sub(1))
    }

    /// Seed where `room` had the most recent bathroom turn.
    pub fn after_bathroom(room: usize) -> Self {
        Self {
            last_garbage_kitchen: None,
            last_bathroom: room,
        }
    }

    /// Seed where `room` takes the first bathroom turn (unless it collides).
    pub fn first_bathroom(room: usize, room_count: usize) -> Self {
        let count = room_count.max(1);
        Self::after_bathroom((room % count + count - 1) % count)
    }

    fn next_garbage_kitchen(&self, room_count: usize) -> usize {
        self.last_garbage_kitchen
            .map_or(0, |i| (i + 1) % room_count)
    }
}

/// Stateful round-robin generator, expressed as a pure step function.
#[derive(Debug, Clone)]
pub struct RotatingGenerator {
    rooms: Vec<Room>,
    seed: RotationState,
    lead_in: usize,
    period: usize,
    cycle: Vec<WeekAssignment>,
}

impl RotatingGenerator {
    /// Creates a generator with the default seed.
    ///
    /// # Errors
    /// Returns [`RotaError::Validation`] if the room list is empty or has duplicates.
    pub fn new(rooms: Vec<Room>) -> Result<Self> {
        let seed = RotationState::initial(rooms.len());
        Self::with_seed(rooms, seed)
    }

    /// Creates a generator starting from an explicit rotation state.
    ///
    /// # Errors
    /// Returns [`RotaError::Validation`] if the rooms are invalid or the seed
    /// points past the last room.
    pub fn with_seed(rooms: Vec<Room>, seed: RotationState) -> Result<Self> {
        validate_rooms(&rooms)?;
        let count = rooms.len();
        let out_of_range = seed.last_bathroom >= count
            || seed.last_garbage_kitchen.is_some_and(|i| i >= count);
        if out_of_range {
            return Err(RotaError::Validation(vec![ValidationError {
                kind: ValidationErrorKind::UnknownRoom,
                message: format!("Rotation seed {seed:?} points past room {}", count - 1),
            }]));
        }

        let mut generator = Self {
            rooms,
            seed,
            lead_in: 0,
            period: 0,
            cycle: Vec::new(),
        };
        generator.detect_cycle();
        Ok(generator)
    }

    /// Rotation seed.
    pub fn seed(&self) -> RotationState {
        self.seed
    }

    /// Weeks before the rotation enters its repeating part.
    pub fn lead_in(&self) -> usize {
        self.lead_in
    }

    /// Length of the repeating part.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Computes one week and the state for the following week.
    ///
    /// `week` is the generation index; only its parity matters.
    pub fn step(&self, week: u64, state: RotationState) -> (WeekAssignment, RotationState) {
        let count = self.rooms.len();
        let mut assignment = WeekAssignment::all_free(self.rooms.iter().map(|r| r.id.as_str()));

        let gk = state.next_garbage_kitchen(count);
        assignment.duties[gk].duty = DutyKind::GarbageKitchen;
        let mut next = RotationState {
            last_garbage_kitchen: Some(gk),
            ..state
        };

        if week % 2 == 1 {
            let mut bathroom = (state.last_bathroom + 1) % count;
            if bathroom == gk {
                bathroom = (bathroom + 1) % count;
            }
            assignment.duties[bathroom].duty = DutyKind::Bathroom;
            next.last_bathroom = bathroom;
        }

        (assignment, next)
    }

    /// Generates the first `num_weeks` weeks from the seed.
    pub fn generate(&self, num_weeks: usize) -> Schedule {
        let mut schedule = Schedule::new();
        let mut state = self.seed;
        for week in 0..num_weeks as u64 {
            let (assignment, next) = self.step(week, state);
            schedule.push(assignment);
            state = next;
        }
        schedule
    }

    fn detect_cycle(&mut self) {
        let count = self.rooms.len();
        let mut seen: HashMap<(u64, usize, usize), usize> = HashMap::new();
        let mut state = self.seed;
        let mut week: u64 = 0;

        loop {
            let key = (week % 2, state.next_garbage_kitchen(count), state.last_bathroom);
            if let Some(&first) = seen.get(&key) {
                self.lead_in = first;
                self.period = self.cycle.len() - first;
                break;
            }
            seen.insert(key, self.cycle.len());

            let (assignment, next) = self.step(week, state);
            self.cycle.push(assignment);
            state = next;
            week += 1;
        }

        tracing::debug!(
            rooms = count,
            lead_in = self.lead_in,
            period = self.period,
            "rotation cycle detected"
        );
    }
}

impl DutyRotation for RotatingGenerator {
    fn name(&self) -> &'static str {
        "rotating"
    }

    fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn cycle_length(&self) -> usize {
        self.cycle.len()
    }

    fn assignment_for_week(&self, week_offset: i64) -> WeekAssignment {
        self.cycle[self.cycle_position(week_offset)].clone()
    }

    /// Weeks in the lead-in map to themselves; all others fold into the period.
    fn cycle_position(&self, week_offset: i64) -> usize {
        let lead_in = self.lead_in as i64;
        if (0..lead_in).contains(&week_offset) {
            return week_offset as usize;
        }
        self.lead_in + reduce_week(week_offset - lead_in, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rooms_from_ids;
    use crate::validation::validate_assignment;

    fn zimmer() -> Vec<Room> {
        rooms_from_ids(["Zimmer 1", "Zimmer 2", "Zimmer 3"])
    }

    fn index_of(rooms: &[Room], id: Option<&str>) -> Option<usize> {
        id.and_then(|id| rooms.iter().position(|r| r.id == id))
    }

    #[test]
    fn test_garbage_kitchen_round_robin() {
        for count in 1..=6 {
            let rooms = rooms_from_ids((0..count).map(|i| format!("R{i}")));
            let g = RotatingGenerator::new(rooms.clone()).unwrap();
            let schedule = g.generate(40);
            for (w, week) in schedule.iter() {
                if count > 1 || w % 2 == 0 {
                    let gk = index_of(&rooms, week.garbage_kitchen_room());
                    assert_eq!(gk, Some(w as usize % count), "rooms={count} week={w}");
                }
            }
        }
    }

    #[test]
    fn test_bathroom_only_on_odd_weeks_and_never_with_gk() {
        for count in 2..=6 {
            let rooms = rooms_from_ids((0..count).map(|i| format!("R{i}")));
            let g = RotatingGenerator::new(rooms.clone()).unwrap();
            for (w, week) in g.generate(52).iter() {
                let bath = week.rooms_with(&DutyKind::Bathroom);
                if w % 2 == 1 {
                    assert_eq!(bath.len(), 1);
                    assert_ne!(Some(bath[0]), week.garbage_kitchen_room());
                } else {
                    assert!(bath.is_empty());
                }
                assert_eq!(week.rooms_with(&DutyKind::GarbageKitchen).len(), 1);
                let busy = 1 + bath.len();
                assert_eq!(week.rooms_with(&DutyKind::Free).len(), count - busy);
                assert!(validate_assignment(week, &rooms).is_ok());
            }
        }
    }

    #[test]
    fn test_default_seed_first_bathroom_goes_to_first_room() {
        let g = RotatingGenerator::new(zimmer()).unwrap();
        let s = g.generate(2);
        assert_eq!(s.weeks[0].garbage_kitchen_room(), Some("Zimmer 1"));
        assert_eq!(s.weeks[0].bathroom_room(), None);
        assert_eq!(s.weeks[1].garbage_kitchen_room(), Some("Zimmer 2"));
        assert_eq!(s.weeks[1].bathroom_room(), Some("Zimmer 1"));
    }

    #[test]
    fn test_household_seed_matches_first_two_weeks() {
        let seed = RotationState::first_bathroom(2, 3);
        assert_eq!(seed.last_bathroom, 1);
        let g = RotatingGenerator::with_seed(zimmer(), seed).unwrap();
        let s = g.generate(2);

        let week0 = WeekAssignment::default()
            .with("Zimmer 1", DutyKind::GarbageKitchen)
            .with("Zimmer 2", DutyKind::Free)
            .with("Zimmer 3", DutyKind::Free);
        let week1 = WeekAssignment::default()
            .with("Zimmer 1", DutyKind::Free)
            .with("Zimmer 2", DutyKind::GarbageKitchen)
            .with("Zimmer 3", DutyKind::Bathroom);
        assert_eq!(s.weeks, vec![week0, week1]);
    }

    #[test]
    fn test_collision_skips_ahead() {
        // Week 3: GK on Zimmer 1, bathroom would go to Zimmer 1 after Zimmer 3
        let g = RotatingGenerator::with_seed(zimmer(), RotationState::first_bathroom(2, 3)).unwrap();
        let s = g.generate(4);
        assert_eq!(s.weeks[3].garbage_kitchen_room(), Some("Zimmer 1"));
        assert_eq!(s.weeks[3].bathroom_room(), Some("Zimmer 2"));
    }

    #[test]
    fn test_step_is_pure() {
        let g = RotatingGenerator::new(zimmer()).unwrap();
        let state = RotationState::initial(3);
        let (a1, s1) = g.step(1, state);
        let (a2, s2) = g.step(1, state);
        assert_eq!(a1, a2);
        assert_eq!(s1, s2);
        assert_eq!(s1.last_garbage_kitchen, Some(0));
    }

    #[test]
    fn test_cycle_matches_generation() {
        for count in 1..=5 {
            let rooms = rooms_from_ids((0..count).map(|i| format!("R{i}")));
            for last in 0..count {
                let g =
                    RotatingGenerator::with_seed(rooms.clone(), RotationState::after_bathroom(last))
                        .unwrap();
                let horizon = g.cycle_length() * 3;
                let generated = g.generate(horizon);
                for (w, week) in generated.iter() {
                    assert_eq!(&g.assignment_for_week(w), week, "rooms={count} week={w}");
                }
            }
        }
    }

    #[test]
    fn test_cycle_repeats_after_lead_in() {
        let g = RotatingGenerator::new(zimmer()).unwrap();
        assert!(g.period() > 0);
        assert_eq!(g.period() % 2, 0);
        let mu = g.lead_in() as i64;
        let lambda = g.period() as i64;
        for w in mu..mu + 3 * lambda {
            assert_eq!(g.assignment_for_week(w), g.assignment_for_week(w + lambda));
        }
    }

    #[test]
    fn test_negative_weeks_stay_in_cycle() {
        let g = RotatingGenerator::new(zimmer()).unwrap();
        let lambda = g.period() as i64;
        let mu = g.lead_in() as i64;
        for w in -30..0 {
            let mut later = w;
            while later < mu {
                later += lambda;
            }
            assert_eq!(g.assignment_for_week(w), g.assignment_for_week(later));
        }
    }

    #[test]
    fn test_single_room() {
        let g = RotatingGenerator::new(rooms_from_ids(["Solo"])).unwrap();
        let s = g.generate(4);
        assert_eq!(s.weeks[0].duty_for("Solo"), Some(&DutyKind::GarbageKitchen));
        assert_eq!(s.weeks[1].duty_for("Solo"), Some(&DutyKind::Bathroom));
        assert_eq!(g.cycle_length(), 2);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(RotatingGenerator::new(Vec::new()).is_err());
        assert!(RotatingGenerator::with_seed(zimmer(), RotationState::after_bathroom(3)).is_err());
    }
}
