use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    #[default]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::OneDay => "1d",
            TimeRange::FiveDays => "5d",
            TimeRange::OneMonth => "1mo",
            TimeRange::SixMonths => "6mo",
            TimeRange::YearToDate => "ytd",
            TimeRange::OneYear => "1y",
            TimeRange::FiveYears => "5y",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "1d" => TimeRange::OneDay,
            "5d" => TimeRange::FiveDays,
            "1mo" => TimeRange::OneMonth,
            "6mo" => TimeRange::SixMonths,
            "ytd" => TimeRange::YearToDate,
            "1y" => TimeRange::OneYear,
            "5y" => TimeRange::FiveYears,
            other => anyhow::bail!("unknown chart range: {other}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub period1: NaiveDate,
    pub period2: NaiveDate,
    pub interval: &'static str,
}

impl ChartQuery {
    pub fn for_range(range: TimeRange, today: NaiveDate) -> Self {
        let (period1, interval) = match range {
            // Two days back so a weekend or holiday morning still has bars.
            TimeRange::OneDay => (today - Duration::days(2), "15m"),
            TimeRange::FiveDays => (today - Duration::days(5), "1h"),
            TimeRange::OneMonth => (months_back(today, 1), "1d"),
            TimeRange::SixMonths => (months_back(today, 6), "1d"),
            TimeRange::YearToDate => (year_start(today), "1d"),
            TimeRange::OneYear => (months_back(today, 12), "1d"),
            TimeRange::FiveYears => (months_back(today, 60), "1wk"),
        };

        Self {
            period1,
            period2: today,
            interval,
        }
    }

    pub fn for_range_now(range: TimeRange, now_utc: DateTime<Utc>) -> Self {
        Self::for_range(range, now_utc.date_naive())
    }

    /// Unix seconds for `period1` at midnight UTC.
    pub fn period1_unix(&self) -> i64 {
        midnight_unix(self.period1)
    }

    /// Unix seconds for the midnight after `period2`, so bars from the
    /// current day are included.
    pub fn period2_unix(&self) -> i64 {
        midnight_unix(self.period2 + Duration::days(1))
    }
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn midnight_unix(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
