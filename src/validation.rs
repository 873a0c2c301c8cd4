//! Input validation for rotations.
//!
//! Checks structural integrity of rooms, week assignments, and duty
//! tables before they are used. Detects:
//! - Empty or duplicate room lists
//! - Assignments that skip a room, list one twice, or name an unknown room
//! - Exclusive duties held by more than one room in a week
//! - Display horizons outside the supported range
//!
//! All checks collect every problem instead of stopping at the first.

use crate::models::{Room, WeekAssignment};
use std::collections::{HashMap, HashSet};

/// Smallest display horizon, in weeks.
pub const MIN_WEEKS: usize = 1;
/// Largest display horizon, in weeks.
pub const MAX_WEEKS: usize = 52;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No rooms were given.
    NoRooms,
    /// Two rooms share the same ID, or a room appears twice in one week.
    DuplicateId,
    /// An assignment names a room that is not in the household.
    UnknownRoom,
    /// An assignment leaves a room without a duty.
    MissingRoom,
    /// An exclusive duty is held by more than one room in one week.
    ExclusiveConflict,
    /// A duty table has no weeks.
    EmptyTable,
    /// Week count outside `MIN_WEEKS..=MAX_WEEKS`.
    WeekCountOutOfRange,
    /// A setting holds a value outside its allowed range.
    InvalidSetting,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a household's room list.
///
/// Checks:
/// 1. At least one room
/// 2. No duplicate room IDs
pub fn validate_rooms(rooms: &[Room]) -> ValidationResult {
    let mut errors = Vec::new();

    if rooms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoRooms,
            "Rotation needs at least one room",
        ));
    }

    let mut seen = HashSet::new();
    for r in rooms {
        if !seen.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    finish(errors)
}

/// Validates a display horizon.
pub fn validate_week_count(num_weeks: usize) -> ValidationResult {
    if (MIN_WEEKS..=MAX_WEEKS).contains(&num_weeks) {
        Ok(())
    } else {
        Err(vec![ValidationError::new(
            ValidationErrorKind::WeekCountOutOfRange,
            format!("Week count {num_weeks} is outside {MIN_WEEKS}..={MAX_WEEKS}"),
        )])
    }
}

/// Validates one week's assignment against the room list.
///
/// Checks:
/// 1. Every listed room exists and is listed once
/// 2. Every room is listed
/// 3. Each exclusive duty is held by at most one room
pub fn validate_assignment(week: &WeekAssignment, rooms: &[Room]) -> ValidationResult {
    let mut errors = Vec::new();
    check_assignment(week, rooms, "", &mut errors);
    finish(errors)
}

/// Validates a hand-written duty table.
///
/// The table must have at least one week and every week must pass
/// [`validate_assignment`].
pub fn validate_table(table: &[WeekAssignment], rooms: &[Room]) -> ValidationResult {
    let mut errors = Vec::new();

    if table.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyTable,
            "Duty table has no weeks",
        ));
    }

    for (i, week) in table.iter().enumerate() {
        check_assignment(week, rooms, &format!("Week {i}: "), &mut errors);
    }

    finish(errors)
}

fn check_assignment(
    week: &WeekAssignment,
    rooms: &[Room],
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    let known: HashSet<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
    let mut listed = HashSet::new();
    let mut holders: HashMap<&str, Vec<&str>> = HashMap::new();

    for entry in &week.duties {
        if !known.contains(entry.room_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRoom,
                format!("{prefix}unknown room '{}'", entry.room_id),
            ));
        }
        if !listed.insert(entry.room_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("{prefix}room '{}' listed more than once", entry.room_id),
            ));
        }
        if entry.duty.is_exclusive() {
            holders
                .entry(entry.duty.label())
                .or_default()
                .push(entry.room_id.as_str());
        }
    }

    for r in rooms {
        if !listed.contains(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingRoom,
                format!("{prefix}room '{}' has no duty", r.id),
            ));
        }
    }

    let mut conflicts: Vec<_> = holders.into_iter().filter(|(_, v)| v.len() > 1).collect();
    conflicts.sort();
    for (duty, rooms) in conflicts {
        errors.push(ValidationError::new(
            ValidationErrorKind::ExclusiveConflict,
            format!("{prefix}'{duty}' held by {}", rooms.join(", ")),
        ));
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
