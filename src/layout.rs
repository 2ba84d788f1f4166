use serde::Serialize;

use crate::filter::PlatformFilter;
use crate::models::{NormalizedEvent, Platform, StudentReport};
use crate::window::format_display_date;

pub const NO_DATA: &str = "-";

/// Physical columns under one platform header.
pub const GROUP_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub title: &'static str,
    pub col_span: usize,
    pub row_span: usize,
}

impl HeaderCell {
    fn new(title: &'static str, col_span: usize, row_span: usize) -> Self {
        Self {
            title,
            col_span,
            row_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnGroup {
    pub platform: Platform,
    pub header: HeaderCell,
    pub sub_columns: Vec<HeaderCell>,
}

impl ColumnGroup {
    fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            header: HeaderCell::new(platform.label(), GROUP_WIDTH, 1),
            sub_columns: vec![
                HeaderCell::new("Contest Name", 2, 1),
                HeaderCell::new("Rank", 1, 1),
                HeaderCell::new("Problems Solved", 1, 1),
                HeaderCell::new("Date", 1, 1),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityCell {
    pub roll_number: String,
    pub name: String,
    pub row_span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformCell {
    pub platform: Platform,
    pub event: Option<NormalizedEvent>,
}

impl PlatformCell {
    /// Contest name, rank, problems solved, date; [`NO_DATA`] for anything missing.
    pub fn display(&self) -> [String; 4] {
        let Some(event) = &self.event else {
            return [NO_DATA; 4].map(str::to_string);
        };
        let label = if event.label.trim().is_empty() {
            NO_DATA.to_string()
        } else {
            event.label.clone()
        };
        let number = |value: Option<u64>| {
            value.map_or_else(|| NO_DATA.to_string(), |n| n.to_string())
        };
        [
            label,
            number(event.rank),
            number(event.solved_count),
            format_display_date(event.timestamp_ms),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRow {
    /// Position of the owning student among the students that produced rows.
    pub student_index: usize,
    pub identity: Option<IdentityCell>,
    pub cells: Vec<PlatformCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridDescription {
    /// Roll.No and Name headers, each spanning both header rows. Empty when condensed.
    pub identity_columns: Vec<HeaderCell>,
    pub column_groups: Vec<ColumnGroup>,
    pub rows: Vec<RenderRow>,
}

impl GridDescription {
    pub fn physical_width(&self) -> usize {
        self.identity_columns.len() + self.column_groups.len() * GROUP_WIDTH
    }
}

/// Lays students out one row per contest.
///
/// Platforms are lined up by position only: row `i` shows the `i`-th contest
/// of each platform, whatever their dates. A student with no contest on any
/// active platform produces no rows at all.
pub fn layout(
    reports: &[StudentReport],
    filter: &PlatformFilter,
    condensed_identity: bool,
) -> GridDescription {
    let active = filter.active();

    let identity_columns = if condensed_identity {
        Vec::new()
    } else {
        vec![HeaderCell::new("Roll.No", 1, 2), HeaderCell::new("Name", 1, 2)]
    };
    let column_groups = active.iter().copied().map(ColumnGroup::for_platform).collect();

    let mut rows = Vec::new();
    let mut student_index = 0;

    for report in reports {
        let max_rows = active
            .iter()
            .map(|platform| report.events.get(*platform).len())
            .max()
            .unwrap_or(0);
        if max_rows == 0 {
            continue;
        }

        for row_index in 0..max_rows {
            let identity = (row_index == 0 && !condensed_identity).then(|| IdentityCell {
                roll_number: report.identity.roll_number.clone(),
                name: report.identity.display_name.clone(),
                row_span: max_rows,
            });
            let cells = active
                .iter()
                .map(|platform| PlatformCell {
                    platform: *platform,
                    event: report.events.get(*platform).get(row_index).cloned(),
                })
                .collect();

            rows.push(RenderRow {
                student_index,
                identity,
                cells,
            });
        }
        student_index += 1;
    }

    GridDescription {
        identity_columns,
        column_groups,
        rows,
    }
}
