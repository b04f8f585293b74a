use crate::models::{Habit, HabitId, HabitViewModel, HistoryEntry, TWO_WEEK_MAX};
use std::collections::HashMap;

/// Counts completed days per active habit over a two-week history window.
///
/// Every habit in `active_habits` gets a view-model, even with no history.
/// Rows whose habit is unknown or inactive are logged and skipped; they never
/// affect another habit's count. Counts are capped at [`TWO_WEEK_MAX`].
pub fn aggregate(
    history_window: &[HistoryEntry],
    active_habits: &HashMap<HabitId, Habit>,
) -> HashMap<HabitId, HabitViewModel> {
    let mut totals: HashMap<&str, u32> = HashMap::with_capacity(active_habits.len());

    for entry in history_window {
        if !active_habits.contains_key(&entry.habit_id) {
            tracing::warn!(
                habit_id = %entry.habit_id,
                history_id = %entry.id,
                date = %entry.date,
                "history row references a habit that does not exist or is inactive"
            );
            continue;
        }
        if entry.done {
            *totals.entry(entry.habit_id.as_str()).or_insert(0) += 1;
        }
    }

    active_habits
        .iter()
        .map(|(id, habit)| {
            let raw = totals.get(id.as_str()).copied().unwrap_or(0);
            (
                id.clone(),
                HabitViewModel {
                    habit: habit.clone(),
                    two_week_completion_count: raw.min(TWO_WEEK_MAX),
                },
            )
        })
        .collect()
}
