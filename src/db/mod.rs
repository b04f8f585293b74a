use crate::calendar::day_start;
use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, Habit, HabitId, HistoryEntry};
use crate::seed::{default_habits, SEED_VERSION};
use crate::tracking::HistoryStore;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const BUSY_TIMEOUT: Duration = Duration::from_secs(60);

/// Columns added after the first release. Older files get them on open.
const DECLARED_COLUMNS: &[(&str, &str, &str)] = &[
    ("habits", "active", "INTEGER NOT NULL DEFAULT 1"),
    ("habits", "order", "INTEGER NOT NULL DEFAULT 0"),
    ("histories", "active", "INTEGER NOT NULL DEFAULT 1"),
    ("histories", "name", "TEXT NOT NULL DEFAULT ''"),
    ("histories", "order", "INTEGER NOT NULL DEFAULT 0"),
];

const HABIT_COLUMNS: &str = r#"id, name, active, "order""#;
const HISTORY_COLUMNS: &str = r#"id, habit_id, date, done, active, name, "order""#;

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    /// Opens (creating if needed) the store at `path`, migrates it and applies
    /// the built-in habit list. Any failure here is a [`AppError::StoreInit`].
    pub fn new(path: &Path) -> AppResult<Self> {
        Self::open(path).map_err(AppError::into_init)
    }

    fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
            }
        }
        let conn = Connection::open(path)?;
        configure_connection(&conn)?;
        conn.execute_batch(SCHEMA_SQL)?;

        let db = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };

        db.ensure_schema_extensions()?;
        db.ensure_default_settings()?;
        db.apply_seed_habits()?;

        tracing::info!(path = %db.db_path.display(), "habit store ready");
        Ok(db)
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    pub fn save_habit(&self, habit: &Habit) -> AppResult<()> {
        let conn = self.conn()?;
        upsert_habit(&conn, habit)
    }

    /// Upserts every habit in one transaction.
    pub fn set_habits(&self, habits: &[Habit]) -> AppResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for habit in habits {
            tracing::info!(habit_id = %habit.id, "saving habit");
            upsert_habit(&tx, habit)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_habit(&self, habit_id: &str) -> AppResult<Option<Habit>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
            [habit_id],
            parse_habit_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn list_habits(&self, include_inactive: bool) -> AppResult<Vec<Habit>> {
        let conn = self.conn()?;
        let mut query = format!("SELECT {} FROM habits", HABIT_COLUMNS);
        if !include_inactive {
            query.push_str(" WHERE active = 1");
        }
        query.push_str(r#" ORDER BY "order" ASC, name ASC, id ASC"#);

        let mut statement = conn.prepare(&query)?;
        let habits = statement
            .query_map([], parse_habit_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    /// Active habits keyed by id.
    pub fn active_habits(&self) -> AppResult<HashMap<HabitId, Habit>> {
        Ok(self
            .list_habits(false)?
            .into_iter()
            .map(|habit| (habit.id.clone(), habit))
            .collect())
    }

    pub fn next_habit_order(&self) -> AppResult<i32> {
        let conn = self.conn()?;
        let next: i32 = conn.query_row(r#"SELECT COALESCE(MAX("order"), -1) + 1 FROM habits"#, [], |row| row.get(0))?;
        Ok(next)
    }

    /// Rows dated within `[from, to]`, in date then insertion order.
    pub fn history_between(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<HistoryEntry>> {
        let conn = self.conn()?;
        let mut statement = conn.prepare(&format!(
            "SELECT {} FROM histories WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, rowid ASC",
            HISTORY_COLUMNS
        ))?;
        let rows = statement
            .query_map(params![encode_day(from), encode_day(to)], parse_history_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every row for one habit, newest first, whether or not it is still active.
    pub fn history_for_habit(&self, habit_id: &str) -> AppResult<Vec<HistoryEntry>> {
        let conn = self.conn()?;
        let mut statement = conn.prepare(&format!(
            "SELECT {} FROM histories WHERE habit_id = ?1 ORDER BY date DESC, rowid DESC",
            HISTORY_COLUMNS
        ))?;
        let rows = statement
            .query_map([habit_id], parse_history_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_history(&self, date: NaiveDate, habit_id: &str) -> AppResult<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM histories WHERE date = ?1 AND habit_id = ?2",
            params![encode_day(date), habit_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row("SELECT value_json FROM settings WHERE key = 'app'", [], |row| row.get(0))
            .optional()?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) -> AppResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at) VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(settings)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn ensure_schema_extensions(&self) -> AppResult<()> {
        let conn = self.conn()?;
        for (table, column, declaration) in DECLARED_COLUMNS {
            if !column_exists(&conn, table, column)? {
                tracing::info!(table, column, "adding missing column");
                conn.execute(
                    &format!(r#"ALTER TABLE {} ADD COLUMN "{}" {}"#, table, column, declaration),
                    [],
                )?;
            }
        }
        Ok(())
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let count: i64 = {
            let conn = self.conn()?;
            conn.query_row("SELECT COUNT(1) FROM settings WHERE key = 'app'", [], |row| row.get(0))?
        };
        if count == 0 {
            self.save_settings(&AppSettings::default())?;
        }
        Ok(())
    }

    /// Writes the built-in habits once per `SEED_VERSION`, so later edits to a
    /// seeded habit are not undone on the next start.
    fn apply_seed_habits(&self) -> AppResult<()> {
        let mut settings = self.get_settings()?;
        if settings.seed_version >= SEED_VERSION {
            tracing::debug!(seed_version = settings.seed_version, "seed habits up to date");
            return Ok(());
        }

        self.set_habits(&default_habits())?;
        settings.seed_version = SEED_VERSION;
        self.save_settings(&settings)?;
        tracing::info!(seed_version = SEED_VERSION, "applied seed habits");
        Ok(())
    }
}

impl HistoryStore for Database {
    fn find_history(&self, date: NaiveDate, habit_id: &str) -> AppResult<Option<HistoryEntry>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM histories WHERE date = ?1 AND habit_id = ?2 ORDER BY rowid ASC LIMIT 1",
                HISTORY_COLUMNS
            ),
            params![encode_day(date), habit_id],
            parse_history_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    fn put_history(&self, entry: &HistoryEntry) -> AppResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO histories (id, habit_id, date, done, active, name, "order")
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(id) DO UPDATE SET
                 habit_id = excluded.habit_id,
                 date = excluded.date,
                 done = excluded.done,
                 active = excluded.active,
                 name = excluded.name,
                 "order" = excluded."order""#,
            params![
                entry.id,
                entry.habit_id,
                encode_day(entry.date),
                entry.done,
                entry.active,
                entry.name,
                entry.order,
            ],
        )?;
        Ok(())
    }
}

fn configure_connection(conn: &Connection) -> AppResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    run_pragma(conn, "PRAGMA journal_mode = WAL")?;
    run_pragma(conn, "PRAGMA synchronous = NORMAL")?;
    Ok(())
}

// Some pragmas answer with a row, some do not; drain whatever comes back.
fn run_pragma(conn: &Connection, sql: &str) -> AppResult<()> {
    let mut statement = conn.prepare(sql)?;
    let mut rows = statement.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}

fn upsert_habit(conn: &Connection, habit: &Habit) -> AppResult<()> {
    conn.execute(
        r#"INSERT INTO habits (id, name, active, "order") VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             active = excluded.active,
             "order" = excluded."order""#,
        params![habit.id, habit.name, habit.active, habit.order],
    )?;
    Ok(())
}

fn parse_habit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
        order: row.get(3)?,
    })
}

fn parse_history_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: parse_time(&row.get::<_, String>(2)?)?.date_naive(),
        done: row.get(3)?,
        active: row.get(4)?,
        name: row.get(5)?,
        order: row.get(6)?,
    })
}

fn encode_day(date: NaiveDate) -> String {
    day_start(date).to_rfc3339()
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let pragma = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&pragma)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::errors::AppError;
    use crate::models::{AppSettings, Habit, HistoryEntry};
    use crate::seed::{default_habits, SEED_VERSION};
    use crate::tracking::{save_history, HistoryStore};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).expect("valid date")
    }

    fn open(dir: &tempfile::TempDir) -> Database {
        Database::new(&dir.path().join("habits.sqlite")).expect("db")
    }

    #[test]
    fn new_database_is_seeded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        let all = db.list_habits(true).expect("list all");
        assert_eq!(all.len(), default_habits().len());
        let active = db.active_habits().expect("active");
        assert_eq!(active.len(), 4);
        assert!(active.values().all(|habit| habit.active));
        assert_eq!(db.get_settings().expect("settings").seed_version, SEED_VERSION);
    }

    #[test]
    fn list_habits_is_ordered() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let names: Vec<String> = db
            .list_habits(false)
            .expect("list")
            .into_iter()
            .map(|habit| habit.name)
            .collect();
        assert_eq!(names, vec!["Eat well", "Exercise", "Floss", "Stretch"]);
    }

    #[test]
    fn reopening_keeps_edits_to_seeded_habits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let floss_id = "4d208dd2-9d8f-4ebd-a043-b968da4abd62";
        {
            let db = open(&dir);
            let mut floss = db.get_habit(floss_id).expect("get").expect("seeded");
            floss.name = "Floss twice".to_string();
            floss.active = false;
            db.save_habit(&floss).expect("save");
        }

        let db = open(&dir);
        let floss = db.get_habit(floss_id).expect("get").expect("still there");
        assert_eq!(floss.name, "Floss twice");
        assert!(!floss.active);
    }

    #[test]
    fn stale_seed_version_reapplies_seeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let eat_well_id = "4d208dd2-9d8f-4ebd-a043-b968da4abd60";
        {
            let db = open(&dir);
            let mut habit = db.get_habit(eat_well_id).expect("get").expect("seeded");
            habit.order = 42;
            db.save_habit(&habit).expect("save");
            db.save_settings(&AppSettings { seed_version: 0 }).expect("settings");
        }

        let db = open(&dir);
        assert_eq!(db.get_habit(eat_well_id).expect("get").expect("seeded").order, 0);
    }

    #[test]
    fn save_history_round_trip_keeps_primary_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let habit = db.list_habits(false).expect("list").remove(0);

        let first = save_history(&db, HistoryEntry::snapshot(&habit, day(3), true)).expect("first");
        let found = db.find_history(day(3), &habit.id).expect("find").expect("row");
        assert_eq!(found.id, first.id);
        assert!(found.done);
        assert_eq!(found.date, day(3));

        let second = save_history(&db, HistoryEntry::snapshot(&habit, day(3), false)).expect("second");
        assert_eq!(second.id, first.id);
        let found = db.find_history(day(3), &habit.id).expect("find").expect("row");
        assert_eq!(found.id, first.id);
        assert!(!found.done);
        assert_eq!(db.count_history(day(3), &habit.id).expect("count"), 1);
    }

    #[test]
    fn double_toggle_leaves_a_single_done_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let habit = db.list_habits(false).expect("list").remove(1);

        save_history(&db, HistoryEntry::snapshot(&habit, day(7), true)).expect("first");
        save_history(&db, HistoryEntry::snapshot(&habit, day(7), true)).expect("second");

        assert_eq!(db.count_history(day(7), &habit.id).expect("count"), 1);
        assert!(db.find_history(day(7), &habit.id).expect("find").expect("row").done);
    }

    #[test]
    fn history_between_is_inclusive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let habit = db.list_habits(false).expect("list").remove(0);
        for d in [1, 2, 15, 16] {
            save_history(&db, HistoryEntry::snapshot(&habit, day(d), true)).expect("save");
        }

        let rows = db.history_between(day(2), day(15)).expect("between");
        let days: Vec<NaiveDate> = rows.iter().map(|row| row.date).collect();
        assert_eq!(days, vec![day(2), day(15)]);
    }

    #[test]
    fn history_keeps_the_name_it_was_written_with() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let mut habit = db.list_habits(false).expect("list").remove(2);
        let original_name = habit.name.clone();

        save_history(&db, HistoryEntry::snapshot(&habit, day(1), true)).expect("save");
        habit.name = "Renamed".to_string();
        db.save_habit(&habit).expect("rename");

        let history = db.history_for_habit(&habit.id).expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, original_name);
    }

    #[test]
    fn inactive_habit_history_stays_queryable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        let mut habit = db.list_habits(false).expect("list").remove(3);
        save_history(&db, HistoryEntry::snapshot(&habit, day(4), true)).expect("save");

        habit.active = false;
        db.save_habit(&habit).expect("deactivate");

        assert!(!db.active_habits().expect("active").contains_key(&habit.id));
        assert_eq!(db.history_for_habit(&habit.id).expect("history").len(), 1);
        assert_eq!(db.history_between(day(1), day(30)).expect("window").len(), 1);
    }

    #[test]
    fn next_habit_order_follows_the_largest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);
        assert_eq!(db.next_habit_order().expect("next"), 5);

        db.save_habit(&Habit {
            id: "custom".to_string(),
            name: "Read".to_string(),
            active: true,
            order: 10,
        })
        .expect("save");
        assert_eq!(db.next_habit_order().expect("next"), 11);
    }

    #[test]
    fn old_files_gain_declared_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("habits.sqlite");
        {
            let conn = rusqlite::Connection::open(&path).expect("open raw");
            conn.execute_batch(
                "CREATE TABLE habits (id TEXT PRIMARY KEY, name TEXT NOT NULL);
                 CREATE TABLE histories (id TEXT PRIMARY KEY, habit_id TEXT NOT NULL, date TEXT NOT NULL, done INTEGER NOT NULL DEFAULT 0);",
            )
            .expect("legacy schema");
        }

        let db = Database::new(&path).expect("migrate");
        assert_eq!(db.list_habits(false).expect("list").len(), 4);
    }

    #[test]
    fn unopenable_path_is_an_init_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"plain file").expect("write blocker");

        let result = Database::new(&blocker.join("habits.sqlite"));
        assert!(matches!(result, Err(AppError::StoreInit(_))));
    }
}
