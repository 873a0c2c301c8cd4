//! Household duty rotation.
//!
//! Computes which room does which chore in a given calendar week, for a
//! fixed set of rooms anchored to a start date.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Room`, `DutyKind`, `WeekAssignment`, `Schedule`
//! - **`scheduler`**: Rotations behind `DutyRotation` (round-robin generator,
//!   fixed table), the `Rota` facade, and `DutyBalance` metrics
//! - **`calendar`**: Week resolution with a fixed UTC offset and floored arithmetic
//! - **`validation`**: Input integrity checks (rooms, tables, horizons)
//! - **`config`**: TOML household configuration
//! - **`state`**: Persisted rotation seed with a lock-file critical section
//! - **`view`**: Plain-text week views
//!
//! # Architecture
//!
//! Week resolution feeds the rotation, which feeds the view:
//! `calendar` → `scheduler` → `view`. Rotations are pure functions of the
//! week offset; rotation state is passed explicitly and never shared.

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod state;
pub mod validation;
pub mod view;

pub use error::{Result, RotaError};
