use crate::error::ReportError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table for `rows`, or `None` when there is nothing to show.
pub fn render_table<T>(rows: &[T]) -> Option<String>
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return None;
    }
    Some(Table::new(rows.to_vec()).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    let shown = &rows[..rows.len().min(max_rows)];
    match render_table(shown) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
    if shown.len() < rows.len() {
        println!("({} more rows not shown)\n", rows.len() - shown.len());
    }
}
