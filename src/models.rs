use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Leetcode,
    Codechef,
    Codeforces,
}

impl Platform {
    /// Column-group order used by every report.
    pub const ALL: [Platform; 3] = [Platform::Leetcode, Platform::Codechef, Platform::Codeforces];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Leetcode => "Leetcode",
            Platform::Codechef => "Codechef",
            Platform::Codeforces => "Codeforces",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentIdentity {
    pub roll_number: String,
    pub display_name: String,
}

/// One entry of the "all users" snapshot, exactly as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub rollno: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub leetcode: Option<LeetcodeProfile>,
    #[serde(default, deserialize_with = "lenient")]
    pub codechef: Option<CodechefProfile>,
    #[serde(default, deserialize_with = "lenient")]
    pub codeforces: Option<CodeforcesProfile>,
}

impl StudentRecord {
    pub fn identity(&self) -> StudentIdentity {
        StudentIdentity {
            roll_number: self.rollno.trim().to_string(),
            display_name: self.name.trim().to_string(),
        }
    }

    pub fn leetcode_contests(&self) -> &[LeetcodeContest] {
        self.leetcode
            .as_ref()
            .and_then(|profile| profile.data.as_ref())
            .and_then(|data| data.user_contest_ranking_history.as_deref())
            .unwrap_or_default()
    }

    pub fn codechef_contests(&self) -> &[CodechefContest] {
        self.codechef
            .as_ref()
            .and_then(|profile| profile.contests.as_deref())
            .unwrap_or_default()
    }

    pub fn codeforces_contests(&self) -> &[CodeforcesContest] {
        self.codeforces
            .as_ref()
            .and_then(|profile| profile.attended_contests.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeetcodeProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<LeetcodeData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeData {
    #[serde(default, deserialize_with = "lenient_list")]
    pub user_contest_ranking_history: Option<Vec<LeetcodeContest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeContest {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub attended: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub contest: Option<LeetcodeContestInfo>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub ranking: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub problems_solved: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeContestInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub start_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodechefProfile {
    #[serde(default, deserialize_with = "lenient_list")]
    pub contests: Option<Vec<CodechefContest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodechefContest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rank: Option<u64>,
    #[serde(default, rename = "noOfProblems", deserialize_with = "lenient_u64")]
    pub no_of_problems: Option<u64>,
    #[serde(default, deserialize_with = "lenient_date_text")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesProfile {
    #[serde(default, deserialize_with = "lenient_list")]
    pub attended_contests: Option<Vec<CodeforcesContest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesContest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub contest_name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rank: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub problems_solved: Option<u64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rating_update_time_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    pub label: String,
    pub rank: Option<u64>,
    pub solved_count: Option<u64>,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformEvents {
    pub leetcode: Vec<NormalizedEvent>,
    pub codechef: Vec<NormalizedEvent>,
    pub codeforces: Vec<NormalizedEvent>,
}

impl PlatformEvents {
    pub fn get(&self, platform: Platform) -> &[NormalizedEvent] {
        match platform {
            Platform::Leetcode => &self.leetcode,
            Platform::Codechef => &self.codechef,
            Platform::Codeforces => &self.codeforces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentReport {
    pub identity: StudentIdentity,
    pub events: PlatformEvents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestTally {
    pub identity: StudentIdentity,
    pub per_platform: Vec<(Platform, usize)>,
    pub total: usize,
}

// Snapshot fields are filled by scrapers; numbers show up as strings or null often enough,
// and a failed scrape leaves an error string where a profile should be.

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!("ignoring malformed snapshot field: {err}");
                None
            }
        },
    })
}

/// Drops undecodable entries one by one instead of the whole list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let entries = match value {
        Some(Value::Array(entries)) => entries,
        None | Some(Value::Null) => return Ok(None),
        Some(other) => {
            warn!("ignoring contest list that is not an array: {other}");
            return Ok(None);
        }
    };

    let mut decoded = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(contest) => decoded.push(contest),
            Err(err) => warn!("skipping malformed contest entry {index}: {err}"),
        }
    }
    Ok(Some(decoded))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|float| float != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

fn lenient_date_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|float| *float >= 0.0 && float.fract() == 0.0)
                .map(|float| float as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_record_with_all_platforms() {
        let json = r#"{
            "rollno": "22501A1201",
            "name": "Asha Rao",
            "leetcode": {"data": {"userContestRankingHistory": [
                {"attended": true, "contest": {"title": "Weekly Contest 380", "startTime": 1705199400},
                 "ranking": 4321, "problemsSolved": 3}
            ]}},
            "codechef": {"contests": [
                {"name": "Starters 115", "rank": "812", "noOfProblems": 4, "end_date": "2024-01-10 22:00:00"}
            ]},
            "codeforces": {"attendedContests": [
                {"contestName": "Codeforces Round 918", "rank": 2011, "problemsSolved": null,
                 "ratingUpdateTimeSeconds": 1704906000}
            ]}
        }"#;

        let record: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.identity().roll_number, "22501A1201");
        assert_eq!(record.leetcode_contests().len(), 1);
        assert_eq!(record.codechef_contests()[0].rank, Some(812));
        assert_eq!(record.codeforces_contests()[0].problems_solved, None);
    }

    #[test]
    fn malformed_profiles_and_fields_become_absent() {
        let json = r#"{
            "rollno": "101",
            "name": "Asha",
            "codechef": "error fetching",
            "codeforces": {"attendedContests": {"status": "FAILED"}},
            "leetcode": {"data": {"userContestRankingHistory": [
                {"attended": 1, "contest": {"title": "Weekly Contest 380", "startTime": 1705199400}},
                {"attended": "false", "contest": "n/a"},
                "garbage",
                {"attended": true, "contest": {"title": "Weekly Contest 381", "startTime": 1705804200}}
            ]}}
        }"#;

        let record: StudentRecord = serde_json::from_str(json).unwrap();
        assert!(record.codechef.is_none());
        assert!(record.codechef_contests().is_empty());
        assert!(record.codeforces_contests().is_empty());

        let leetcode = record.leetcode_contests();
        assert_eq!(leetcode.len(), 3);
        assert_eq!(leetcode[0].attended, Some(true));
        assert_eq!(leetcode[1].attended, Some(false));
        assert!(leetcode[1].contest.is_none());
        assert_eq!(leetcode[2].contest.as_ref().unwrap().title, "Weekly Contest 381");
    }

    #[test]
    fn non_text_end_date_is_absent() {
        let contest: CodechefContest =
            serde_json::from_str(r#"{"name": "Starters 115", "end_date": 20240110}"#).unwrap();
        assert_eq!(contest.end_date, None);
        assert_eq!(contest.name, "Starters 115");
    }

    #[test]
    fn tolerates_missing_platforms_and_numeric_roll() {
        let record: StudentRecord =
            serde_json::from_str(r#"{"rollno": 101, "name": "Dev", "codechef": null}"#).unwrap();
        assert_eq!(record.identity().roll_number, "101");
        assert!(record.leetcode_contests().is_empty());
        assert!(record.codechef_contests().is_empty());
        assert!(record.codeforces_contests().is_empty());
    }
}
