//! Rotation domain models.
//!
//! Provides the data types shared by the generators, the week resolver,
//! and the view layer.
//!
//! # Domain Mappings
//!
//! | u-rota | Shared flat | Office | Dormitory |
//! |--------|-------------|--------|-----------|
//! | Room | Zimmer | Desk | Floor |
//! | DutyKind | Chore | Rota task | Cleaning duty |
//! | WeekAssignment | Weekly plan | Week rota | Duty board |

mod duty;
mod room;
mod schedule;

pub use duty::DutyKind;
pub use room::{room_index, rooms_from_ids, Room};
pub use schedule::{RoomDuty, Schedule, WeekAssignment};
