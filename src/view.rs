//! Plain-text week views.

use serde::Serialize;
use std::fmt;

use crate::calendar::WeekSpan;
use crate::models::{DutyKind, Room};
use crate::scheduler::{DutyBalance, RotaWeek};

/// One line of a week view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyLine {
    /// Room display name.
    pub room: String,
    /// Decorated duty label.
    pub label: String,
}

/// A titled week ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekView {
    /// Heading (e.g., "Current Week").
    pub title: String,
    /// Monday-to-Sunday dates.
    pub span: WeekSpan,
    /// One line per room, in rotation order.
    pub lines: Vec<DutyLine>,
}

impl WeekView {
    /// Builds the view for a resolved week.
    pub fn new(title: impl Into<String>, week: &RotaWeek, rooms: &[Room]) -> Self {
        let lines = rooms
            .iter()
            .map(|room| {
                let duty = week
                    .assignment
                    .duty_for(&room.id)
                    .cloned()
                    .unwrap_or(DutyKind::Free);
                DutyLine {
                    room: room.display_name().to_string(),
                    label: decorated_label(&duty),
                }
            })
            .collect();

        Self {
            title: title.into(),
            span: week.span,
            lines,
        }
    }
}

impl fmt::Display for WeekView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.title, self.span)?;
        for line in &self.lines {
            writeln!(f, "- {}: {}", line.room, line.label)?;
        }
        Ok(())
    }
}

/// Label with its decorative symbol, e.g. "🛁 Bathroom Cleaning".
pub fn decorated_label(duty: &DutyKind) -> String {
    format!("{} {}", duty.symbol(), duty.label())
}

/// Renders a balance report as an aligned table.
pub fn balance_table(balance: &DutyBalance) -> String {
    let width = balance
        .rooms
        .iter()
        .map(|r| r.room_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Room".len());

    let mut out = format!(
        "{:<width$}  {:>7}  {:>8}  {:>4}  {:>6}  {:>6}\n",
        "Room", "Garbage", "Bathroom", "Free", "Other", "Streak"
    );
    for r in &balance.rooms {
        out.push_str(&format!(
            "{:<width$}  {:>7}  {:>8}  {:>4}  {:>6}  {:>6}\n",
            r.room_id, r.garbage_kitchen, r.bathroom, r.free, r.custom, r.longest_bathroom_streak
        ));
    }
    out.push_str(&format!(
        "{} weeks, spread: garbage {} / bathroom {}\n",
        balance.weeks,
        balance.garbage_kitchen_spread(),
        balance.bathroom_spread()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekResolver;
    use crate::models::rooms_from_ids;
    use crate::scheduler::{Rota, TabulatedPattern};
    use chrono::NaiveDate;

    fn rota() -> Rota {
        let rooms = rooms_from_ids(["Zimmer 1", "Zimmer 2", "Zimmer 3"]);
        let start = NaiveDate::from_ymd_opt(2023, 12, 4).unwrap();
        Rota::new(
            TabulatedPattern::household(rooms).unwrap(),
            WeekResolver::new(start, 1).unwrap(),
        )
    }

    #[test]
    fn test_week_view_text() {
        let rota = rota();
        let view = WeekView::new("Next Week", &rota.week_at(1), rota.rooms());
        let text = view.to_string();
        assert_eq!(
            text,
            "Next Week: 11.12.2023 - 17.12.2023\n\
             - Zimmer 1: 🌴 Free\n\
             - Zimmer 2: 🗑️ Garbage & Kitchen Cleaning\n\
             - Zimmer 3: 🛁 Bathroom Cleaning\n"
        );
    }

    #[test]
    fn test_display_names_used() {
        let rota = rota();
        let mut rooms = rota.rooms().to_vec();
        rooms[0] = rooms[0].clone().with_name("Anna");
        let view = WeekView::new("Current Week", &rota.week_at(0), &rooms);
        assert_eq!(view.lines[0].room, "Anna");
    }

    #[test]
    fn test_balance_table_has_row_per_room() {
        let rota = rota();
        let schedule = rota.rotation().schedule(0, 8);
        let table = balance_table(&DutyBalance::calculate(&schedule, rota.rooms()));
        assert_eq!(table.lines().count(), 1 + 3 + 1);
        assert!(table.contains("8 weeks"));
    }
}
