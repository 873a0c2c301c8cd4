//! Week assignment and schedule models.
//!
//! A `WeekAssignment` gives every room exactly one duty for one week.
//! A `Schedule` is an ordered run of week assignments starting at some
//! week offset from the household's anchor Monday.

use serde::{Deserialize, Serialize};

use super::DutyKind;

/// One room's duty in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDuty {
    /// Room identifier.
    pub room_id: String,
    /// Duty held by the room.
    pub duty: DutyKind,
}

/// Duties of all rooms for a single week, in rotation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAssignment {
    /// Per-room duties, one entry per room.
    pub duties: Vec<RoomDuty>,
}

impl WeekAssignment {
    /// Creates an assignment with every room free.
    pub fn all_free<'a, I>(room_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            duties: room_ids
                .into_iter()
                .map(|id| RoomDuty {
                    room_id: id.to_string(),
                    duty: DutyKind::Free,
                })
                .collect(),
        }
    }

    /// Adds a room with its duty (builder form, for hand-written tables).
    pub fn with(mut self, room_id: impl Into<String>, duty: DutyKind) -> Self {
        self.duties.push(RoomDuty {
            room_id: room_id.into(),
            duty,
        });
        self
    }

    /// Sets the duty of an existing room. Returns `false` if the room is absent.
    pub fn assign(&mut self, room_id: &str, duty: DutyKind) -> bool {
        match self.duties.iter_mut().find(|d| d.room_id == room_id) {
            Some(entry) => {
                entry.duty = duty;
                true
            }
            None => false,
        }
    }

    /// Duty held by a room.
    pub fn duty_for(&self, room_id: &str) -> Option<&DutyKind> {
        self.duties
            .iter()
            .find(|d| d.room_id == room_id)
            .map(|d| &d.duty)
    }

    /// Rooms holding a given duty, in rotation order.
    pub fn rooms_with(&self, duty: &DutyKind) -> Vec<&str> {
        self.duties
            .iter()
            .filter(|d| &d.duty == duty)
            .map(|d| d.room_id.as_str())
            .collect()
    }

    /// The single room on garbage/kitchen duty, if any.
    pub fn garbage_kitchen_room(&self) -> Option<&str> {
        self.rooms_with(&DutyKind::GarbageKitchen).into_iter().next()
    }

    /// The single room on bathroom duty, if any.
    pub fn bathroom_room(&self) -> Option<&str> {
        self.rooms_with(&DutyKind::Bathroom).into_iter().next()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.duties.len()
    }

    /// Whether no rooms are listed.
    pub fn is_empty(&self) -> bool {
        self.duties.is_empty()
    }
}

/// A consecutive run of week assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Week offset (from the anchor Monday) of the first entry.
    pub first_week: i64,
    /// Week assignments, `weeks[i]` belongs to `first_week + i`.
    pub weeks: Vec<WeekAssignment>,
}

impl Schedule {
    /// Creates an empty schedule starting at week 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty schedule starting at the given week offset.
    pub fn starting_at(first_week: i64) -> Self {
        Self {
            first_week,
            weeks: Vec::new(),
        }
    }

    /// Appends the next week.
    pub fn push(&mut self, week: WeekAssignment) {
        self.weeks.push(week);
    }

    /// Assignment for an absolute week offset, if within this schedule.
    pub fn week(&self, week_offset: i64) -> Option<&WeekAssignment> {
        let idx = usize::try_from(week_offset - self.first_week).ok()?;
        self.weeks.get(idx)
    }

    /// Iterates `(week_offset, assignment)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &WeekAssignment)> {
        (self.first_week..).zip(self.weeks.iter())
    }

    /// Number of weeks.
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    /// Whether the schedule has no weeks.
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}
