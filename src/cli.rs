use crate::calendar::{parse_day, today};
use crate::errors::AppResult;
use crate::shell;
use crate::tracker::HabitTracker;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "habits", about = "Track daily habits and two-week streaks", version)]
pub struct Cli {
    /// Directory holding the database and logs.
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Explicit database file, overriding the one in the data directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Emit JSON instead of the text view.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the habits for a day with their two-week progress.
    Show {
        /// Day to show (YYYY-MM-DD, "today" or "yesterday").
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Flip a habit between done and not done.
    Toggle {
        /// Habit id or name.
        habit: String,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Mark a habit done.
    Done {
        habit: String,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Mark a habit not done.
    Undo {
        habit: String,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// List habit definitions.
    List {
        /// Include deactivated habits.
        #[arg(long)]
        all: bool,
    },
    /// Create a new habit.
    Add {
        name: String,
        /// Display position; defaults to after the last habit.
        #[arg(long)]
        order: Option<i32>,
    },
    /// Rename a habit. Past entries keep the name they were recorded with.
    Rename { habit: String, name: String },
    /// Hide a habit from the day view without deleting its history.
    Deactivate { habit: String },
    /// Print every recorded day for a habit.
    History { habit: String },
}

impl Default for Command {
    fn default() -> Self {
        Self::Show { date: None }
    }
}

/// Runs one command and returns what should be printed.
pub fn execute(tracker: &HabitTracker, command: Command, json: bool) -> AppResult<String> {
    match command {
        Command::Show { date } => {
            let view = tracker.day_view(resolve_date(date.as_deref())?)?;
            render(json, &view, shell::render_day_view)
        }
        Command::Toggle { habit, date } => {
            let view = tracker.toggle(&habit, resolve_date(date.as_deref())?)?;
            render(json, &view, shell::render_day_view)
        }
        Command::Done { habit, date } => {
            let view = tracker.set_done(&habit, resolve_date(date.as_deref())?, true)?;
            render(json, &view, shell::render_day_view)
        }
        Command::Undo { habit, date } => {
            let view = tracker.set_done(&habit, resolve_date(date.as_deref())?, false)?;
            render(json, &view, shell::render_day_view)
        }
        Command::List { all } => {
            let habits = tracker.habits(all)?;
            render(json, &habits, |habits: &Vec<_>| shell::render_habits(habits))
        }
        Command::Add { name, order } => {
            let habit = tracker.add_habit(&name, order)?;
            render(json, &habit, |habit| format!("added {} ({})\n", habit.name, habit.id))
        }
        Command::Rename { habit, name } => {
            let habit = tracker.rename_habit(&habit, &name)?;
            render(json, &habit, |habit| format!("renamed {} to {}\n", habit.id, habit.name))
        }
        Command::Deactivate { habit } => {
            let habit = tracker.deactivate_habit(&habit)?;
            render(json, &habit, |habit| format!("deactivated {}\n", habit.name))
        }
        Command::History { habit } => {
            let (habit, rows) = tracker.history(&habit)?;
            if json {
                return Ok(serde_json::to_string_pretty(&rows)?);
            }
            Ok(shell::render_history(&habit, &rows))
        }
    }
}

fn resolve_date(raw: Option<&str>) -> AppResult<NaiveDate> {
    match raw {
        Some(raw) => parse_day(raw),
        None => Ok(today()),
    }
}

fn render<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> AppResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(value)?);
    }
    Ok(text(value))
}
