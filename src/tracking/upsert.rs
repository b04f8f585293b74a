use crate::errors::AppResult;
use crate::models::HistoryEntry;
use chrono::NaiveDate;
use uuid::Uuid;

/// The slice of the store the history upsert needs.
pub trait HistoryStore {
    /// Exact `(date, habit_id)` lookup.
    fn find_history(&self, date: NaiveDate, habit_id: &str) -> AppResult<Option<HistoryEntry>>;

    /// Insert-or-update keyed on `entry.id`.
    fn put_history(&self, entry: &HistoryEntry) -> AppResult<()>;
}

/// Writes `entry`, reusing the id of any existing row for the same habit and
/// day so each pair keeps a single row. Returns the row as written.
pub fn save_history<S: HistoryStore + ?Sized>(store: &S, mut entry: HistoryEntry) -> AppResult<HistoryEntry> {
    tracing::info!(habit_id = %entry.habit_id, date = %entry.date, done = entry.done, "saving habit history");

    entry.id = match store.find_history(entry.date, &entry.habit_id)? {
        Some(existing) => existing.id,
        None => Uuid::new_v4().to_string(),
    };

    store.put_history(&entry)?;
    Ok(entry)
}
