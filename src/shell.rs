//! Plain-text rendering of the tracker's views for the terminal front end.

use crate::models::{DayView, Habit, HistoryEntry, TWO_WEEK_MAX};
use chrono::Datelike;
use std::fmt::Write as _;

const DONE_MARK: &str = "[x]";
const OPEN_MARK: &str = "[ ]";

pub fn progress_bar(count: u32) -> String {
    let filled = count.min(TWO_WEEK_MAX) as usize;
    let empty = TWO_WEEK_MAX as usize - filled;
    format!("{}{}", "#".repeat(filled), "-".repeat(empty))
}

pub fn render_day_view(view: &DayView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.date.format("%A %Y-%m-%d"));

    if view.habits.is_empty() {
        out.push_str("  no active habits\n");
    }

    let width = view
        .habits
        .iter()
        .map(|row| row.view_model.habit.name.chars().count())
        .max()
        .unwrap_or(0);
    for row in &view.habits {
        let count = row.view_model.two_week_completion_count;
        let _ = writeln!(
            out,
            "  {} {:<width$}  {}  {:>2}/{}",
            if row.done_today { DONE_MARK } else { OPEN_MARK },
            row.view_model.habit.name,
            progress_bar(count),
            count,
            TWO_WEEK_MAX,
            width = width
        );
    }

    if !view.marked_days.is_empty() {
        let days: Vec<String> = view.marked_days.iter().map(|day| day.day().to_string()).collect();
        let _ = writeln!(out, "  tracked this month: {}", days.join(" "));
    }
    out
}

pub fn render_habits(habits: &[Habit]) -> String {
    let mut out = String::new();
    for habit in habits {
        let _ = writeln!(
            out,
            "{:>3}  {}  {}{}",
            habit.order,
            habit.id,
            habit.name,
            if habit.active { "" } else { " (inactive)" }
        );
    }
    out
}

pub fn render_history(habit: &Habit, rows: &[HistoryEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} entries)", habit.name, rows.len());
    for row in rows {
        let _ = write!(
            out,
            "  {} {}",
            row.date.format("%Y-%m-%d"),
            if row.done { DONE_MARK } else { OPEN_MARK }
        );
        if row.name != habit.name {
            let _ = write!(out, "  as \"{}\"", row.name);
        }
        out.push('\n');
    }
    out
}
