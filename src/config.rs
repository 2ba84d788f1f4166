use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Deserialize;

use crate::aggregate::RollRange;
use crate::error::ValidationError;
use crate::filter::{Choice, PlatformFilter};
use crate::models::Platform;
use crate::window::DateWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    All,
    Leetcode,
    Codechef,
    Codeforces,
}

impl From<PlatformChoice> for Choice {
    fn from(choice: PlatformChoice) -> Self {
        match choice {
            PlatformChoice::All => Choice::All,
            PlatformChoice::Leetcode => Choice::Platform(Platform::Leetcode),
            PlatformChoice::Codechef => Choice::Platform(Platform::Codechef),
            PlatformChoice::Codeforces => Choice::Platform(Platform::Codeforces),
        }
    }
}

/// Operator settings as written in a TOML file or passed on the command line.
/// Every field is optional here; [`ReportConfig::into_request`] decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub since_days: Option<i64>,
    pub from_roll: Option<String>,
    pub to_roll: Option<String>,
    pub platforms: Vec<PlatformChoice>,
    pub condensed_identity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub window: DateWindow,
    pub rolls: RollRange,
    pub filter: PlatformFilter,
    pub condensed_identity: bool,
}

impl ReportConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ReportConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: ReportConfig) -> Self {
        Self {
            start_date: overrides.start_date.or(self.start_date),
            end_date: overrides.end_date.or(self.end_date),
            since_days: overrides.since_days.or(self.since_days),
            from_roll: overrides.from_roll.or(self.from_roll),
            to_roll: overrides.to_roll.or(self.to_roll),
            platforms: if overrides.platforms.is_empty() {
                self.platforms
            } else {
                overrides.platforms
            },
            condensed_identity: overrides.condensed_identity || self.condensed_identity,
        }
    }

    /// Explicit dates take precedence over `since_days`.
    pub fn into_request(self, today: NaiveDate) -> Result<ReportRequest, ValidationError> {
        let window = match (&self.start_date, &self.end_date, self.since_days) {
            (None, None, Some(days)) => DateWindow::since_days(days, today)?,
            (start, end, _) => DateWindow::parse(
                start.as_deref().unwrap_or_default(),
                end.as_deref().unwrap_or_default(),
            )?,
        };

        let rolls = RollRange::new(
            self.from_roll.as_deref().unwrap_or_default(),
            self.to_roll.as_deref().unwrap_or_default(),
        )?;

        Ok(ReportRequest {
            window,
            rolls,
            filter: PlatformFilter::from_choices(self.platforms.into_iter().map(Choice::from)),
            condensed_identity: self.condensed_identity,
        })
    }
}
