//! Fixed duty table repeated cyclically.
//!
//! The table is written by hand and used as-is: week `w` gets row
//! `w mod len`. Changing the room count or cadence means editing the
//! table.

use super::DutyRotation;
use crate::calendar::reduce_week;
use crate::error::{Result, RotaError};
use crate::models::{DutyKind, Room, WeekAssignment};
use crate::validation::{validate_rooms, validate_table, ValidationError, ValidationErrorKind};

/// Number of weeks in the built-in household table.
pub const HOUSEHOLD_CYCLE: usize = 4;

/// Rotation backed by a literal table of weeks.
#[derive(Debug, Clone)]
pub struct TabulatedPattern {
    rooms: Vec<Room>,
    table: Vec<WeekAssignment>,
}

impl TabulatedPattern {
    /// Creates a pattern from a hand-written table.
    ///
    /// Rows are reordered to follow the room order.
    ///
    /// # Errors
    /// Returns [`RotaError::Validation`] if the rooms or any row are invalid.
    pub fn new(rooms: Vec<Room>, table: Vec<WeekAssignment>) -> Result<Self> {
        validate_rooms(&rooms)?;
        validate_table(&table, &rooms)?;

        let table = table
            .into_iter()
            .map(|row| {
                rooms.iter().fold(WeekAssignment::default(), |acc, room| {
                    let duty = row.duty_for(&room.id).cloned().unwrap_or(DutyKind::Free);
                    acc.with(room.id.clone(), duty)
                })
            })
            .collect();

        Ok(Self { rooms, table })
    }

    /// The built-in four-week table for a three-room household.
    ///
    /// These are the first four weeks of the household rotation (garbage and
    /// kitchen every week, bathroom on odd weeks starting with room 3),
    /// frozen into a table:
    ///
    /// | Week | Room 1 | Room 2 | Room 3 |
    /// |------|--------|--------|--------|
    /// | 0 | Garbage & Kitchen | Free | Free |
    /// | 1 | Free | Garbage & Kitchen | Bathroom |
    /// | 2 | Free | Free | Garbage & Kitchen |
    /// | 3 | Garbage & Kitchen | Bathroom | Free |
    ///
    /// # Errors
    /// Returns [`RotaError::Validation`] unless exactly three rooms are given.
    pub fn household(rooms: Vec<Room>) -> Result<Self> {
        if rooms.len() != 3 {
            return Err(RotaError::Validation(vec![ValidationError {
                kind: ValidationErrorKind::MissingRoom,
                message: format!(
                    "Built-in table covers 3 rooms, household has {}",
                    rooms.len()
                ),
            }]));
        }

        use DutyKind::{Bathroom, Free, GarbageKitchen};
        let rows: [[DutyKind; 3]; HOUSEHOLD_CYCLE] = [
            [GarbageKitchen, Free, Free],
            [Free, GarbageKitchen, Bathroom],
            [Free, Free, GarbageKitchen],
            [GarbageKitchen, Bathroom, Free],
        ];

        let table = rows
            .into_iter()
            .map(|row| {
                rooms
                    .iter()
                    .zip(row)
                    .fold(WeekAssignment::default(), |acc, (room, duty)| {
                        acc.with(room.id.clone(), duty)
                    })
            })
            .collect();

        Self::new(rooms, table)
    }

    /// Row for a week index (floored modulo the table length).
    pub fn generate(&self, week_index: i64) -> &WeekAssignment {
        &self.table[reduce_week(week_index, self.table.len())]
    }

    /// The table rows.
    pub fn table(&self) -> &[WeekAssignment] {
        &self.table
    }
}

impl DutyRotation for TabulatedPattern {
    fn name(&self) -> &'static str {
        "tabulated"
    }

    fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn cycle_length(&self) -> usize {
        self.table.len()
    }

    fn assignment_for_week(&self, week_offset: i64) -> WeekAssignment {
        self.generate(week_offset).clone()
    }
}
