//! Output formatting for the CLI.

use crate::core::{GeographicalObject, LocationDetail, LocationSummary};
use crate::db::schema::{value_to_string, Snapshot, TableDump};
use crate::error::Result;
use serde::Serialize;
use std::fmt::Write;

/// Cells longer than this are cut with an ellipsis.
const MAX_CELL: usize = 40;

/// Pretty-print any serializable value as JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(cell: &str) -> String {
    let cell = cell.replace('\n', " ");
    if cell.chars().count() <= MAX_CELL {
        return cell;
    }
    let mut cut: String = cell.chars().take(MAX_CELL - 1).collect();
    cut.push('…');
    cut
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}

/// Render one table dump as an aligned text table.
pub fn render_table(name: &str, dump: &TableDump) -> String {
    let rows: Vec<Vec<String>> = dump
        .rows
        .iter()
        .map(|row| row.iter().map(|v| truncate(&value_to_string(v))).collect())
        .collect();

    let widths: Vec<usize> = dump
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: &[String]| {
        let inner = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {} ", pad(c, *w)))
            .collect::<Vec<_>>()
            .join("|");
        format!("|{inner}|")
    };

    let mut out = String::new();
    let _ = writeln!(out, "{name} ({} rows)", rows.len());
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "{}", line(&dump.columns));
    let _ = writeln!(out, "{border}");
    for row in &rows {
        let _ = writeln!(out, "{}", line(row));
    }
    let _ = writeln!(out, "{border}");
    out
}

/// Render every table of a snapshot in schema order.
pub fn render_snapshot(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .iter()
        .map(|(name, dump)| render_table(name, dump))
        .collect()
}

/// Format an available geographical object.
pub fn format_object(object: &GeographicalObject) -> String {
    let size = object
        .size
        .map(|s| format!(", {s} km"))
        .unwrap_or_default();
    format!("[#{}] {} ({}{size})", object.id, object.feature, object.kind)
}

/// Format a row of the location join.
pub fn format_location(row: &LocationSummary) -> String {
    format!(
        "[#{}] {} ({}) <- {} ({}) | task: {} | mission: {} | purpose: {} | results: {}",
        row.id,
        row.feature,
        row.kind,
        row.transport_name,
        row.transport_type,
        row.status_task,
        row.status_mission,
        row.purpose.as_deref().unwrap_or("-"),
        row.results.as_deref().unwrap_or("-"),
    )
}

/// Format a row of the per-object location join.
pub fn format_location_detail(row: &LocationDetail) -> String {
    let mut out = format!(
        "[#{}] {} ({}) <- {} ({}) | task: {} | mission: {}",
        row.l_id,
        row.go_feature,
        row.go_type,
        row.t_name,
        row.t_type,
        row.status_task,
        row.status_mission,
    );
    if let Some(purpose) = &row.l_purpose {
        let _ = write!(out, "\n  Purpose: {purpose}");
    }
    if let Some(results) = &row.l_results {
        let _ = write!(out, "\n  Results: {results}");
    }
    if let Some(photo) = &row.t_url_photo {
        let _ = write!(out, "\n  Photo:   {photo}");
    }
    out
}
