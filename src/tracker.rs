use crate::calendar::{same_month, window_start};
use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{DayHabitRow, DayView, Habit, HistoryEntry};
use crate::tracking::{aggregate, save_history, sorted_view_models, HistoryIndex, HistoryStore};
use chrono::NaiveDate;
use uuid::Uuid;

/// Everything a front end calls into. Holds the store and turns it into day
/// views; writes go through the history upsert.
pub struct HabitTracker {
    db: Database,
}

impl HabitTracker {
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::with_database(Database::new(&config.db_path)?))
    }

    pub fn with_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn day_view(&self, date: NaiveDate) -> AppResult<DayView> {
        let active = self.db.active_habits()?;
        let window = self.db.history_between(window_start(date), date)?;

        let index = HistoryIndex::build(&window);
        let counted = aggregate(&window, &active);

        let habits = sorted_view_models(counted)
            .into_iter()
            .map(|view_model| {
                let done_today = index
                    .lookup(&view_model.habit.id, date)
                    .map(|entry| entry.done)
                    .unwrap_or(false);
                DayHabitRow { view_model, done_today }
            })
            .collect();

        let marked_days = index
            .days()
            .into_iter()
            .filter(|day| same_month(*day, date))
            .collect();

        tracing::debug!(%date, rows = window.len(), habits = active.len(), "built day view");
        Ok(DayView {
            date,
            habits,
            marked_days,
        })
    }

    /// Records `done` for the habit on `date` and returns the refreshed view.
    pub fn set_done(&self, habit_key: &str, date: NaiveDate, done: bool) -> AppResult<DayView> {
        let habit = self.resolve_habit(habit_key, false)?;
        let written = save_history(&self.db, HistoryEntry::snapshot(&habit, date, done)).map_err(|error| {
            tracing::error!(habit_id = %habit.id, %date, error = %error, "failed to save habit history");
            error
        })?;
        tracing::info!(habit_id = %habit.id, history_id = %written.id, %date, done, "habit history saved");
        self.day_view(date)
    }

    /// Flips the habit's state for `date`. A day without a row counts as not done.
    pub fn toggle(&self, habit_key: &str, date: NaiveDate) -> AppResult<DayView> {
        let habit = self.resolve_habit(habit_key, false)?;
        let current = self
            .db
            .find_history(date, &habit.id)?
            .map(|entry| entry.done)
            .unwrap_or(false);
        self.set_done(&habit.id, date, !current)
    }

    pub fn habits(&self, include_inactive: bool) -> AppResult<Vec<Habit>> {
        self.db.list_habits(include_inactive)
    }

    pub fn add_habit(&self, name: &str, order: Option<i32>) -> AppResult<Habit> {
        let name = normalize_name(name)?;
        if self.find_by_name(&name, false)?.is_some() {
            return Err(AppError::Cli(format!("an active habit named '{}' already exists", name)));
        }
        let order = match order {
            Some(order) => order,
            None => self.db.next_habit_order()?,
        };
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name,
            active: true,
            order,
        };
        self.db.save_habit(&habit)?;
        tracing::info!(habit_id = %habit.id, order = habit.order, "habit created");
        Ok(habit)
    }

    /// Renames the habit. Rows already written keep the old name.
    pub fn rename_habit(&self, habit_key: &str, name: &str) -> AppResult<Habit> {
        let mut habit = self.resolve_habit(habit_key, true)?;
        habit.name = normalize_name(name)?;
        self.db.save_habit(&habit)?;
        tracing::info!(habit_id = %habit.id, "habit renamed");
        Ok(habit)
    }

    pub fn deactivate_habit(&self, habit_key: &str) -> AppResult<Habit> {
        let mut habit = self.resolve_habit(habit_key, true)?;
        if habit.active {
            habit.active = false;
            self.db.save_habit(&habit)?;
            tracing::info!(habit_id = %habit.id, "habit deactivated");
        }
        Ok(habit)
    }

    pub fn history(&self, habit_key: &str) -> AppResult<(Habit, Vec<HistoryEntry>)> {
        let habit = self.resolve_habit(habit_key, true)?;
        let rows = self.db.history_for_habit(&habit.id)?;
        Ok((habit, rows))
    }

    /// Finds a habit by exact id or by case-insensitive name.
    pub fn resolve_habit(&self, key: &str, include_inactive: bool) -> AppResult<Habit> {
        let key = key.trim();
        if let Some(habit) = self.db.get_habit(key)? {
            if habit.active || include_inactive {
                return Ok(habit);
            }
        }
        self.find_by_name(key, include_inactive)?
            .ok_or_else(|| AppError::NotFound(format!("no habit matching '{}'", key)))
    }

    fn find_by_name(&self, name: &str, include_inactive: bool) -> AppResult<Option<Habit>> {
        let wanted = name.to_lowercase();
        Ok(self
            .db
            .list_habits(include_inactive)?
            .into_iter()
            // Active habits sort ahead of retired ones with the same name.
            .min_by_key(|habit| (habit.name.to_lowercase() != wanted, !habit.active))
            .filter(|habit| habit.name.to_lowercase() == wanted))
    }
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Cli("habit name must not be empty".to_string()));
    }
    Ok(name.to_string())
}
