//! Duty balance metrics.
//!
//! Summarises how evenly a schedule spreads the work across rooms.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Garbage/kitchen turns | Weeks a room holds garbage/kitchen duty |
//! | Bathroom turns | Weeks a room holds bathroom duty |
//! | Free weeks | Weeks a room holds no duty |
//! | Bathroom streak | Longest run of consecutive bathroom turns by one room |
//! | Spread | Max minus min turns across rooms, per exclusive duty |

use serde::Serialize;

use crate::models::{DutyKind, Room, Schedule};

/// Per-room counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomBalance {
    /// Room identifier.
    pub room_id: String,
    /// Garbage/kitchen turns.
    pub garbage_kitchen: usize,
    /// Bathroom turns.
    pub bathroom: usize,
    /// Weeks without duty.
    pub free: usize,
    /// Weeks with a custom duty.
    pub custom: usize,
    /// Longest run of bathroom turns with no other room in between.
    pub longest_bathroom_streak: usize,
}

/// Duty balance over a schedule.
#[derive(Debug, Clone, Serialize)]
pub struct DutyBalance {
    /// Weeks covered.
    pub weeks: usize,
    /// Counters in room order.
    pub rooms: Vec<RoomBalance>,
}

impl DutyBalance {
    /// Counts duties per room.
    pub fn calculate(schedule: &Schedule, rooms: &[Room]) -> Self {
        let mut balances: Vec<RoomBalance> = rooms
            .iter()
            .map(|r| RoomBalance {
                room_id: r.id.clone(),
                ..Default::default()
            })
            .collect();

        let mut streak_room: Option<usize> = None;
        let mut streak_len = 0;

        for week in &schedule.weeks {
            for (idx, room) in rooms.iter().enumerate() {
                let balance = &mut balances[idx];
                match week.duty_for(&room.id) {
                    Some(DutyKind::GarbageKitchen) => balance.garbage_kitchen += 1,
                    Some(DutyKind::Bathroom) => balance.bathroom += 1,
                    Some(DutyKind::Free) | None => balance.free += 1,
                    Some(DutyKind::Custom(_)) => balance.custom += 1,
                }
            }

            let Some(holder) = week
                .bathroom_room()
                .and_then(|id| rooms.iter().position(|r| r.id == id))
            else {
                continue;
            };

            if streak_room == Some(holder) {
                streak_len += 1;
            } else {
                streak_room = Some(holder);
                streak_len = 1;
            }
            let best = &mut balances[holder].longest_bathroom_streak;
            *best = (*best).max(streak_len);
        }

        Self {
            weeks: schedule.len(),
            rooms: balances,
        }
    }

    /// Max minus min garbage/kitchen turns.
    pub fn garbage_kitchen_spread(&self) -> usize {
        spread(self.rooms.iter().map(|r| r.garbage_kitchen))
    }

    /// Max minus min bathroom turns.
    pub fn bathroom_spread(&self) -> usize {
        spread(self.rooms.iter().map(|r| r.bathroom))
    }

    /// Counters for one room.
    pub fn for_room(&self, room_id: &str) -> Option<&RoomBalance> {
        self.rooms.iter().find(|r| r.room_id == room_id)
    }
}

fn spread(values: impl Iterator<Item = usize> + Clone) -> usize {
    let max = values.clone().max().unwrap_or(0);
    let min = values.min().unwrap_or(0);
    max - min
}
