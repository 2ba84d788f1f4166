use log::warn;

use crate::models::{
    CodechefContest, CodeforcesContest, LeetcodeContest, NormalizedEvent, Platform,
};
use crate::window::{date_to_ms, parse_calendar_date, DateWindow};

/// Adapter from one platform's raw contest shape to [`NormalizedEvent`].
pub trait RawContest {
    const PLATFORM: Platform;

    /// `None` skips the entry: it cannot be placed in any window.
    fn timestamp_ms(&self) -> Option<i64>;
    fn label(&self) -> &str;
    fn rank(&self) -> Option<u64>;
    fn solved_count(&self) -> Option<u64>;

    /// Entries the platform lists but the student did not take part in.
    fn skipped(&self) -> bool {
        false
    }
}

impl RawContest for LeetcodeContest {
    const PLATFORM: Platform = Platform::Leetcode;

    fn timestamp_ms(&self) -> Option<i64> {
        self.contest
            .as_ref()
            .and_then(|contest| contest.start_time)
            .and_then(|seconds| seconds.checked_mul(1000))
    }

    fn label(&self) -> &str {
        self.contest
            .as_ref()
            .map(|contest| contest.title.as_str())
            .unwrap_or_default()
    }

    fn rank(&self) -> Option<u64> {
        self.ranking
    }

    fn solved_count(&self) -> Option<u64> {
        self.problems_solved
    }

    fn skipped(&self) -> bool {
        self.attended == Some(false)
    }
}

impl RawContest for CodechefContest {
    const PLATFORM: Platform = Platform::Codechef;

    fn timestamp_ms(&self) -> Option<i64> {
        self.end_date
            .as_deref()
            .and_then(parse_calendar_date)
            .map(date_to_ms)
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn rank(&self) -> Option<u64> {
        self.rank
    }

    fn solved_count(&self) -> Option<u64> {
        self.no_of_problems
    }
}

impl RawContest for CodeforcesContest {
    const PLATFORM: Platform = Platform::Codeforces;

    fn timestamp_ms(&self) -> Option<i64> {
        self.rating_update_time_seconds
            .and_then(|seconds| seconds.checked_mul(1000))
    }

    fn label(&self) -> &str {
        &self.contest_name
    }

    fn rank(&self) -> Option<u64> {
        self.rank
    }

    fn solved_count(&self) -> Option<u64> {
        self.problems_solved
    }
}

/// Keeps the contests inside `window`, in feed order.
pub fn normalize<C: RawContest>(contests: &[C], window: &DateWindow) -> Vec<NormalizedEvent> {
    let mut events = Vec::new();

    for contest in contests {
        if contest.skipped() {
            continue;
        }

        let Some(timestamp_ms) = contest.timestamp_ms() else {
            warn!(
                "{}: skipping contest '{}' without a usable date",
                C::PLATFORM.label(),
                contest.label()
            );
            continue;
        };

        if !window.contains(timestamp_ms) {
            continue;
        }

        events.push(NormalizedEvent {
            label: contest.label().to_string(),
            rank: contest.rank(),
            solved_count: contest.solved_count(),
            timestamp_ms,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeetcodeContestInfo;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-10", "2024-01-20").unwrap()
    }

    fn seconds(date: &str) -> i64 {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        date_to_ms(date) / 1000
    }

    fn leetcode(title: &str, start_time: Option<i64>) -> LeetcodeContest {
        LeetcodeContest {
            attended: None,
            contest: Some(LeetcodeContestInfo {
                title: title.to_string(),
                start_time,
            }),
            ranking: Some(1500),
            problems_solved: Some(2),
        }
    }

    fn codechef(name: &str, end_date: &str) -> CodechefContest {
        CodechefContest {
            name: name.to_string(),
            rank: Some(300),
            no_of_problems: None,
            end_date: Some(end_date.to_string()),
        }
    }

    fn codeforces(name: &str, seconds: i64) -> CodeforcesContest {
        CodeforcesContest {
            contest_name: name.to_string(),
            rank: None,
            problems_solved: Some(5),
            rating_update_time_seconds: Some(seconds),
        }
    }

    #[test]
    fn codechef_dates_are_inclusive_at_day_granularity() {
        let contests = vec![
            codechef("Starters 114", "2024-01-09"),
            codechef("Starters 115", "2024-01-10"),
            codechef("Starters 117", "2024-01-20 23:00:00"),
            codechef("Starters 118", "2024-01-21"),
        ];

        let events = normalize(&contests, &window());
        let labels: Vec<&str> = events.iter().map(|event| event.label.as_str()).collect();
        assert_eq!(labels, vec!["Starters 115", "Starters 117"]);
        assert_eq!(events[0].rank, Some(300));
        assert_eq!(events[0].solved_count, None);
    }

    #[test]
    fn unix_seconds_are_scaled_and_bounded() {
        let start = seconds("2024-01-10");
        let end = seconds("2024-01-21") - 1;
        let contests = vec![
            codeforces("before", start - 1),
            codeforces("at start", start),
            codeforces("at end", end),
            codeforces("after", end + 1),
        ];

        let events = normalize(&contests, &window());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "at start");
        assert_eq!(events[0].timestamp_ms, start * 1000);
        assert_eq!(events[1].label, "at end");
    }

    #[test]
    fn feed_order_is_preserved() {
        let contests = vec![
            leetcode("Weekly 381", Some(seconds("2024-01-18"))),
            leetcode("Weekly 380", Some(seconds("2024-01-11"))),
        ];

        let events = normalize(&contests, &window());
        assert_eq!(events[0].label, "Weekly 381");
        assert_eq!(events[1].label, "Weekly 380");
    }

    #[test]
    fn unresolvable_and_unattended_entries_are_dropped() {
        let mut unattended = leetcode("Biweekly 121", Some(seconds("2024-01-13")));
        unattended.attended = Some(false);
        let contests = vec![
            leetcode("no date", None),
            unattended,
            leetcode("Weekly 380", Some(seconds("2024-01-14"))),
        ];

        let events = normalize(&contests, &window());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "Weekly 380");

        let garbled = vec![codechef("Starters 116", "soon")];
        assert!(normalize(&garbled, &window()).is_empty());
    }

    #[test]
    fn empty_feed_yields_no_events() {
        let contests: Vec<CodeforcesContest> = Vec::new();
        assert!(normalize(&contests, &window()).is_empty());
    }
}
