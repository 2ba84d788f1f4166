use std::fmt::Write;

use crate::aggregate::{Aggregation, ReportStatus};
use crate::config::ReportRequest;
use crate::layout::{GridDescription, RenderRow};
use crate::models::Platform;
use crate::window::format_display_date;

/// How a flattened matrix fills the rows a merged identity cell spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityFill {
    Repeat,
    Blank,
}

/// Two header rows followed by one line per grid row, every line
/// [`GridDescription::physical_width`] cells wide.
pub fn flatten(grid: &GridDescription, fill: IdentityFill) -> Vec<Vec<String>> {
    let mut top = Vec::with_capacity(grid.physical_width());
    let mut sub = Vec::with_capacity(grid.physical_width());

    for column in &grid.identity_columns {
        top.push(column.title.to_string());
        sub.push(String::new());
    }
    for group in &grid.column_groups {
        top.push(group.header.title.to_string());
        top.extend(std::iter::repeat(String::new()).take(group.header.col_span - 1));
        for column in &group.sub_columns {
            sub.push(column.title.to_string());
            sub.extend(std::iter::repeat(String::new()).take(column.col_span - 1));
        }
    }

    let mut matrix = vec![top, sub];
    let mut current_identity: Option<[String; 2]> = None;

    for row in &grid.rows {
        let mut line = Vec::with_capacity(grid.physical_width());

        if !grid.identity_columns.is_empty() {
            match &row.identity {
                Some(identity) => {
                    let cells = [identity.roll_number.clone(), identity.name.clone()];
                    line.extend(cells.iter().cloned());
                    current_identity = Some(cells);
                }
                None => match (fill, &current_identity) {
                    (IdentityFill::Repeat, Some(cells)) => line.extend(cells.iter().cloned()),
                    _ => line.extend([String::new(), String::new()]),
                },
            }
        }

        for cell in &row.cells {
            let [name, rank, solved, date] = cell.display();
            line.extend([name, String::new(), rank, solved, date]);
        }
        matrix.push(line);
    }

    matrix
}

pub fn write_csv<W: std::io::Write>(matrix: &[Vec<String>], writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    for line in matrix {
        writer.write_record(line)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(grid: &GridDescription) -> serde_json::Result<String> {
    serde_json::to_string_pretty(grid)
}

pub fn build_report(
    request: &ReportRequest,
    aggregation: &Aggregation,
    grid: &GridDescription,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Batch Contest Report");
    let _ = writeln!(
        output,
        "Generated for roll numbers {} to {} on {} (contests from {} to {})",
        request.rolls.from(),
        request.rolls.to(),
        request.filter.describe(),
        format_display_date(request.window.start_ms()),
        format_display_date(request.window.end_ms())
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Contest Mix");

    for platform in request.filter.active() {
        let (contests, students) = platform_totals(aggregation, platform);
        let _ = writeln!(
            output,
            "- {}: {} contests across {} students",
            platform.label(),
            contests,
            students
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Contests");

    if aggregation.status == ReportStatus::NoContestsInRange || grid.rows.is_empty() {
        let _ = writeln!(output, "No contests found in the selected range.");
        return output;
    }

    let mut header = Vec::new();
    if !grid.identity_columns.is_empty() {
        header.extend(grid.identity_columns.iter().map(|column| column.title.to_string()));
    }
    for group in &grid.column_groups {
        for column in &group.sub_columns {
            header.push(format!("{} {}", group.header.title, column.title));
        }
    }
    let _ = writeln!(output, "| {} |", header.join(" | "));
    let _ = writeln!(output, "|{}", " --- |".repeat(header.len()));

    for row in &grid.rows {
        let _ = writeln!(output, "| {} |", markdown_cells(grid, row).join(" | "));
    }

    output
}

fn platform_totals(aggregation: &Aggregation, platform: Platform) -> (usize, usize) {
    aggregation
        .reports
        .iter()
        .map(|report| report.events.get(platform).len())
        .filter(|count| *count > 0)
        .fold((0, 0), |(contests, students), count| (contests + count, students + 1))
}

fn markdown_cells(grid: &GridDescription, row: &RenderRow) -> Vec<String> {
    let mut cells = Vec::new();
    if !grid.identity_columns.is_empty() {
        match &row.identity {
            Some(identity) => {
                cells.push(escape(&identity.roll_number));
                cells.push(escape(&identity.name));
            }
            None => cells.extend([String::new(), String::new()]),
        }
    }
    for cell in &row.cells {
        cells.extend(cell.display().iter().map(|value| escape(value)));
    }
    cells
}

fn escape(value: &str) -> String {
    value.replace('|', "\\|")
}
