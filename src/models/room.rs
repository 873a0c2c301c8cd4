//! Room model.
//!
//! Rooms are the participants of a rotation. A household lists its rooms
//! in a fixed order; that order defines the rotation sequence and breaks
//! ties when two duties compete for the same room.

use serde::{Deserialize, Serialize};

/// A room (and whoever lives in it) taking part in the rotation.
///
/// Serialized as a bare identifier when it has no display name, otherwise
/// as an `{ id, name }` table, so configuration files may mix both:
///
/// ```toml
/// rooms = ["Zimmer 1", { id = "Zimmer 2", name = "Anna" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoomRepr", into = "RoomRepr")]
pub struct Room {
    /// Unique room identifier (e.g., "Zimmer 1").
    pub id: String,
    /// Display name. Empty = use the identifier.
    pub name: String,
}

impl Room {
    /// Creates a room with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name shown to people: the display name, or the id if none is set.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RoomRepr {
    Id(String),
    Named {
        id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        name: String,
    },
}

impl From<RoomRepr> for Room {
    fn from(repr: RoomRepr) -> Self {
        match repr {
            RoomRepr::Id(id) => Room::new(id),
            RoomRepr::Named { id, name } => Room::new(id).with_name(name),
        }
    }
}

impl From<Room> for RoomRepr {
    fn from(room: Room) -> Self {
        if room.name.is_empty() {
            RoomRepr::Id(room.id)
        } else {
            RoomRepr::Named {
                id: room.id,
                name: room.name,
            }
        }
    }
}

/// Builds rooms from a list of identifiers, preserving order.
pub fn rooms_from_ids<I, S>(ids: I) -> Vec<Room>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(Room::new).collect()
}

/// Position of a room in the rotation order.
pub fn room_index(rooms: &[Room], id: &str) -> Option<usize> {
    rooms.iter().position(|r| r.id == id)
}
