use crate::models::{HabitId, HabitViewModel};
use std::collections::HashMap;

/// Orders view-models for display: ascending `order`, then name, then id.
pub fn sorted_view_models(models: HashMap<HabitId, HabitViewModel>) -> Vec<HabitViewModel> {
    let mut sorted: Vec<HabitViewModel> = models.into_values().collect();
    sorted.sort_by(|left, right| {
        left.habit
            .order
            .cmp(&right.habit.order)
            .then_with(|| left.habit.name.cmp(&right.habit.name))
            .then_with(|| left.habit.id.cmp(&right.habit.id))
    });
    sorted
}
