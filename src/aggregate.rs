use std::cmp::Ordering;

use log::debug;

use crate::error::ValidationError;
use crate::filter::PlatformFilter;
use crate::models::{ContestTally, PlatformEvents, StudentRecord, StudentReport};
use crate::normalize::normalize;
use crate::window::DateWindow;

/// Inclusive roll number range with `from <= to` under [`compare_rolls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRange {
    from: String,
    to: String,
}

impl RollRange {
    pub fn new(from: &str, to: &str) -> Result<Self, ValidationError> {
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() {
            return Err(ValidationError::MissingField("from roll number"));
        }
        if to.is_empty() {
            return Err(ValidationError::MissingField("to roll number"));
        }
        if compare_rolls(from, to) == Ordering::Greater {
            return Err(ValidationError::InvertedRollRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn contains(&self, roll: &str) -> bool {
        let roll = roll.trim();
        !roll.is_empty()
            && compare_rolls(&self.from, roll) != Ordering::Greater
            && compare_rolls(roll, &self.to) != Ordering::Greater
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}

/// Orders rolls by their leading digits as a number, then by the rest
/// case-insensitively. Rolls without leading digits sort before all others.
pub fn compare_rolls(left: &str, right: &str) -> Ordering {
    roll_key(left).cmp(&roll_key(right))
}

fn roll_key(roll: &str) -> (bool, usize, &str, String) {
    let digits = roll.bytes().take_while(u8::is_ascii_digit).count();
    let (prefix, suffix) = roll.split_at(digits);
    let number = prefix.trim_start_matches('0');
    (digits > 0, number.len(), number, suffix.to_ascii_uppercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Generated,
    /// Nothing qualified under the active filter. Informational, not a failure.
    NoContestsInRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub reports: Vec<StudentReport>,
    pub status: ReportStatus,
}

/// Restricts to `rolls` and normalizes each student's three feeds against `window`.
///
/// Output keeps snapshot order.
pub fn aggregate(
    students: &[StudentRecord],
    rolls: &RollRange,
    window: &DateWindow,
) -> Vec<StudentReport> {
    let reports: Vec<StudentReport> = students
        .iter()
        .filter(|student| rolls.contains(&student.rollno))
        .map(|student| StudentReport {
            identity: student.identity(),
            events: PlatformEvents {
                leetcode: normalize(student.leetcode_contests(), window),
                codechef: normalize(student.codechef_contests(), window),
                codeforces: normalize(student.codeforces_contests(), window),
            },
        })
        .collect();

    debug!(
        "kept {} of {} students in roll range {}..={}",
        reports.len(),
        students.len(),
        rolls.from(),
        rolls.to()
    );

    reports
}

pub fn any_event_exists(reports: &[StudentReport], filter: &PlatformFilter) -> bool {
    let active = filter.active();
    reports
        .iter()
        .any(|report| active.iter().any(|platform| !report.events.get(*platform).is_empty()))
}

/// Aggregates and classifies the run in one step.
pub fn run(
    students: &[StudentRecord],
    rolls: &RollRange,
    window: &DateWindow,
    filter: &PlatformFilter,
) -> Aggregation {
    let reports = aggregate(students, rolls, window);
    let status = if any_event_exists(&reports, filter) {
        ReportStatus::Generated
    } else {
        ReportStatus::NoContestsInRange
    };
    Aggregation { reports, status }
}

/// Contest counts per student over the active platforms, busiest first.
pub fn summarize(reports: &[StudentReport], filter: &PlatformFilter) -> Vec<ContestTally> {
    let active = filter.active();
    let mut tallies: Vec<ContestTally> = reports
        .iter()
        .map(|report| {
            let per_platform: Vec<_> = active
                .iter()
                .map(|platform| (*platform, report.events.get(*platform).len()))
                .collect();
            ContestTally {
                identity: report.identity.clone(),
                total: per_platform.iter().map(|(_, count)| count).sum(),
                per_platform,
            }
        })
        .collect();

    tallies.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| compare_rolls(&a.identity.roll_number, &b.identity.roll_number))
    });
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CodechefContest, CodechefProfile, CodeforcesContest, CodeforcesProfile, Platform,
    };

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-10", "2024-01-20").unwrap()
    }

    fn student(roll: &str, codechef_dates: &[&str]) -> StudentRecord {
        StudentRecord {
            rollno: roll.to_string(),
            name: format!("Student {roll}"),
            leetcode: None,
            codechef: Some(CodechefProfile {
                contests: Some(
                    codechef_dates
                        .iter()
                        .map(|date| CodechefContest {
                            name: format!("Starters on {date}"),
                            rank: Some(10),
                            no_of_problems: Some(3),
                            end_date: Some(date.to_string()),
                        })
                        .collect(),
                ),
            }),
            codeforces: None,
        }
    }

    #[test]
    fn roll_range_excludes_students_outside_bounds() {
        let students = vec![
            student("99", &["2024-01-12"]),
            student("100", &["2024-01-12"]),
            student("105", &[]),
            student("106", &["2024-01-12"]),
        ];
        let rolls = RollRange::new("100", "105").unwrap();

        let reports = aggregate(&students, &rolls, &window());
        let kept: Vec<&str> = reports
            .iter()
            .map(|report| report.identity.roll_number.as_str())
            .collect();
        assert_eq!(kept, vec!["100", "105"]);
    }

    #[test]
    fn inverted_or_blank_roll_range_is_rejected() {
        assert_eq!(
            RollRange::new("200", "100"),
            Err(ValidationError::InvertedRollRange {
                from: "200".to_string(),
                to: "100".to_string()
            })
        );
        assert_eq!(
            RollRange::new("", "100"),
            Err(ValidationError::MissingField("from roll number"))
        );
        assert_eq!(
            RollRange::new("100", " "),
            Err(ValidationError::MissingField("to roll number"))
        );
    }

    #[test]
    fn rolls_compare_numerically_then_as_text() {
        assert_eq!(compare_rolls("99", "100"), Ordering::Less);
        assert_eq!(compare_rolls("0100", "100"), Ordering::Equal);
        assert_eq!(compare_rolls("22501a1201", "22501A1266"), Ordering::Less);

        let rolls = RollRange::new("22501A1201", "22501A1266").unwrap();
        assert!(rolls.contains("22501a1230"));
        assert!(!rolls.contains("22501A1267"));
        assert!(!rolls.contains(""));
    }

    #[test]
    fn mixed_rolls_order_by_numeric_prefix() {
        let rolls = RollRange::new("99", "105").unwrap();
        assert!(rolls.contains("100A"));
        assert!(rolls.contains("105"));
        assert!(!rolls.contains("105A"));
        assert!(!rolls.contains("A100"));

        let mut sorted = vec!["100A", "99", "A7", "100", "1000"];
        sorted.sort_by(|a, b| compare_rolls(a, b));
        assert_eq!(sorted, vec!["A7", "99", "100", "100A", "1000"]);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let students = vec![
            student("101", &["2024-01-11", "2024-01-15"]),
            student("102", &["2024-01-02"]),
        ];
        let rolls = RollRange::new("100", "105").unwrap();

        let first = aggregate(&students, &rolls, &window());
        let second = aggregate(&students, &rolls, &window());
        assert_eq!(first, second);
        assert_eq!(first[0].events.codechef.len(), 2);
        assert!(first[1].events.codechef.is_empty());
    }

    #[test]
    fn empty_result_is_reported_per_filter() {
        let mut with_codeforces = student("101", &["2024-01-12"]);
        with_codeforces.codeforces = Some(CodeforcesProfile {
            attended_contests: Some(vec![CodeforcesContest {
                contest_name: "Round 918".to_string(),
                rank: Some(2011),
                problems_solved: Some(2),
                rating_update_time_seconds: Some(1_704_906_000),
            }]),
        });
        let students = vec![with_codeforces];
        let rolls = RollRange::new("100", "105").unwrap();

        let codeforces = PlatformFilter::only(Platform::Codeforces);
        let leetcode = PlatformFilter::only(Platform::Leetcode);
        assert_eq!(
            run(&students, &rolls, &window(), &codeforces).status,
            ReportStatus::Generated
        );
        let empty = run(&students, &rolls, &window(), &leetcode);
        assert_eq!(empty.status, ReportStatus::NoContestsInRange);
        assert_eq!(empty.reports.len(), 1);
    }

    #[test]
    fn summary_orders_by_total_then_roll() {
        let students = vec![
            student("103", &["2024-01-11"]),
            student("101", &["2024-01-11"]),
            student("102", &["2024-01-11", "2024-01-12"]),
        ];
        let rolls = RollRange::new("100", "105").unwrap();
        let reports = aggregate(&students, &rolls, &window());

        let tallies = summarize(&reports, &PlatformFilter::only(Platform::Codechef));
        let order: Vec<&str> = tallies
            .iter()
            .map(|tally| tally.identity.roll_number.as_str())
            .collect();
        assert_eq!(order, vec!["102", "101", "103"]);
        assert_eq!(tallies[0].per_platform, vec![(Platform::Codechef, 2)]);
    }
}
