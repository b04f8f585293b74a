use crate::calendar::{day_key, from_day_key};
use crate::models::{DayKey, HabitId, HistoryEntry};
use chrono::NaiveDate;
use std::collections::HashMap;

/// History rows bucketed by day, then by habit.
///
/// If two rows share a `(day, habit)` pair the first one seen is kept and the
/// rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryIndex {
    days: HashMap<DayKey, HashMap<HabitId, HistoryEntry>>,
}

impl HistoryIndex {
    pub fn build(rows: &[HistoryEntry]) -> Self {
        let mut days: HashMap<DayKey, HashMap<HabitId, HistoryEntry>> = HashMap::new();
        for row in rows {
            let bucket = days.entry(day_key(row.date)).or_default();
            if bucket.contains_key(&row.habit_id) {
                tracing::debug!(
                    habit_id = %row.habit_id,
                    history_id = %row.id,
                    date = %row.date,
                    "ignoring duplicate history row"
                );
                continue;
            }
            bucket.insert(row.habit_id.clone(), row.clone());
        }
        Self { days }
    }

    pub fn lookup(&self, habit_id: &str, day: NaiveDate) -> Option<&HistoryEntry> {
        self.lookup_key(habit_id, day_key(day))
    }

    pub fn lookup_key(&self, habit_id: &str, key: DayKey) -> Option<&HistoryEntry> {
        self.days.get(&key)?.get(habit_id)
    }

    /// Days that have at least one row, oldest first.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut keys: Vec<DayKey> = self.days.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().filter_map(from_day_key).collect()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryIndex;
    use crate::models::HistoryEntry;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).expect("valid date")
    }

    fn row(id: &str, habit_id: &str, date: NaiveDate, done: bool) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            habit_id: habit_id.to_string(),
            date,
            done,
            active: true,
            name: "Floss".to_string(),
            order: 2,
        }
    }

    #[test]
    fn lookup_finds_rows_by_day_and_habit() {
        let rows = vec![row("h1", "A", day(1), true), row("h2", "B", day(1), false), row("h3", "A", day(2), false)];
        let index = HistoryIndex::build(&rows);

        assert_eq!(index.lookup("A", day(1)).map(|e| e.id.as_str()), Some("h1"));
        assert_eq!(index.lookup("B", day(1)).map(|e| e.done), Some(false));
        assert_eq!(index.lookup("A", day(2)).map(|e| e.id.as_str()), Some("h3"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn lookup_misses_on_absent_day_or_habit() {
        let index = HistoryIndex::build(&[row("h1", "A", day(1), true)]);
        assert!(index.lookup("A", day(3)).is_none());
        assert!(index.lookup("Z", day(1)).is_none());
        assert!(HistoryIndex::default().lookup("A", day(1)).is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let rows = vec![row("first", "A", day(5), true), row("second", "A", day(5), false)];
        let index = HistoryIndex::build(&rows);

        let kept = index.lookup("A", day(5)).expect("entry");
        assert_eq!(kept.id, "first");
        assert!(kept.done);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn building_twice_is_idempotent() {
        let rows = vec![row("h1", "A", day(1), true), row("h2", "A", day(1), false), row("h3", "B", day(9), true)];
        assert_eq!(HistoryIndex::build(&rows), HistoryIndex::build(&rows));
    }

    #[test]
    fn days_are_sorted_oldest_first() {
        let rows = vec![row("h1", "A", day(9), true), row("h2", "A", day(2), true), row("h3", "B", day(9), true)];
        assert_eq!(HistoryIndex::build(&rows).days(), vec![day(2), day(9)]);
    }
}
