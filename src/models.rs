use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type HabitId = String;

/// Epoch seconds at UTC midnight of a calendar day.
pub type DayKey = i64;

/// Most completions a two-week window can report.
pub const TWO_WEEK_MAX: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Inactive habits are hidden and not counted, but their history stays.
    pub active: bool,
    pub order: i32,
}

/// One day's completion record for one habit.
///
/// `name`, `active` and `order` are copied from the habit when the row is
/// written and are never rewritten afterwards, so past days keep showing the
/// habit as it was at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub done: bool,
    pub active: bool,
    pub name: String,
    pub order: i32,
}

impl HistoryEntry {
    /// Builds an unsaved entry snapshotting `habit` for `date`.
    pub fn snapshot(habit: &Habit, date: NaiveDate, done: bool) -> Self {
        Self {
            id: String::new(),
            habit_id: habit.id.clone(),
            date,
            done,
            active: true,
            name: habit.name.clone(),
            order: habit.order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitViewModel {
    pub habit: Habit,
    pub two_week_completion_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHabitRow {
    #[serde(flatten)]
    pub view_model: HabitViewModel,
    pub done_today: bool,
}

/// Everything a front end needs to draw one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub habits: Vec<DayHabitRow>,
    /// Days of `date`'s month, inside the loaded window, that have any history.
    pub marked_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Version of the built-in habit list last written to the store.
    pub seed_version: u32,
}
