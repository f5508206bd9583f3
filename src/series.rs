use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::optimistic_rank;
use crate::error::{CounterError, Result};

const YMD_FORMAT: &str = "%Y/%m/%d";
const MDY_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: u64,
}

impl DayCount {
    pub fn new(day: NaiveDate, count: u64) -> Self {
        Self { day, count }
    }

    pub fn to_csv(&self) -> String {
        format!("{},{}", self.day.format(YMD_FORMAT), self.count)
    }

    pub fn from_csv(line: &str) -> Result<Self> {
        let (day, count) = line
            .split_once(',')
            .ok_or_else(|| CounterError::MalformedRecord(line.to_string()))?;
        if count.contains(',') {
            return Err(CounterError::MalformedRecord(line.to_string()));
        }
        Ok(Self::new(parse_ymd(day)?, parse_count(count)?))
    }
}

/// Gap-free daily history, sorted by day. Every consecutive pair of entries is
/// exactly one day apart, so a day's count is found by its offset from the first day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct CountSeries {
    daily_counts: Vec<DayCount>,
}

impl CountSeries {
    pub fn new(daily_counts: Vec<DayCount>) -> Result<Self> {
        for pair in daily_counts.windows(2) {
            let (previous, next) = (pair[0].day, pair[1].day);
            if next - previous != Duration::days(1) {
                return Err(CounterError::DiscontinuousSeries { previous, next });
            }
        }
        Ok(Self { daily_counts })
    }

    /// Upstream API shape: `(MM/DD/YYYY, count)` pairs, counts possibly written as floats.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, S)]) -> Result<Self> {
        let daily_counts = pairs
            .iter()
            .map(|(day, count)| {
                Ok(DayCount::new(
                    parse_date(day.as_ref(), MDY_FORMAT)?,
                    parse_count(count.as_ref())?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(daily_counts)
    }

    pub fn from_csv(contents: &str) -> Result<Self> {
        let daily_counts = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(DayCount::from_csv)
            .collect::<Result<Vec<_>>>()?;
        Self::new(daily_counts)
    }

    pub fn to_csv(&self) -> String {
        self.daily_counts
            .iter()
            .map(DayCount::to_csv)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.daily_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayCount> {
        self.daily_counts.iter()
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.daily_counts.iter().map(|entry| entry.day).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.daily_counts.iter().map(|entry| entry.count).collect()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.daily_counts.first().map(|entry| entry.day)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.daily_counts.last().map(|entry| entry.day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.index_of(day).is_some()
    }

    pub fn get_count(&self, day: NaiveDate) -> Result<u64> {
        self.index_of(day)
            .map(|index| self.daily_counts[index].count)
            .ok_or(CounterError::DayNotFound(day))
    }

    pub fn total(&self) -> u64 {
        self.daily_counts.iter().map(|entry| entry.count).sum()
    }

    /// Series as it was known on `day`: every later entry is dropped.
    pub fn until(&self, day: NaiveDate) -> CountSeries {
        CountSeries {
            daily_counts: self
                .daily_counts
                .iter()
                .take_while(|entry| entry.day <= day)
                .copied()
                .collect(),
        }
    }

    pub fn is_absolute_maximum(&self, day: NaiveDate) -> Result<bool> {
        let count = self.get_count(day)?;
        Ok(self.daily_counts.iter().all(|entry| entry.count <= count))
    }

    pub fn is_year_maximum(&self, day: NaiveDate) -> Result<bool> {
        let count = self.get_count(day)?;
        Ok(self
            .daily_counts
            .iter()
            .filter(|entry| entry.day.year() == day.year())
            .all(|entry| entry.count <= count))
    }

    pub fn is_month_maximum(&self, day: NaiveDate) -> Result<bool> {
        let count = self.get_count(day)?;
        Ok(self
            .daily_counts
            .iter()
            .filter(|entry| entry.day.year() == day.year() && entry.day.month() == day.month())
            .all(|entry| entry.count <= count))
    }

    pub fn day_rank(&self, day: NaiveDate) -> Result<usize> {
        let count = self.get_count(day)?;
        optimistic_rank(count, &self.counts())
    }

    fn index_of(&self, day: NaiveDate) -> Option<usize> {
        let first = self.first_day()?;
        let offset = (day - first).num_days();
        if offset < 0 {
            return None;
        }
        let index = offset as usize;
        (index < self.daily_counts.len()).then_some(index)
    }
}

#[derive(Serialize, Deserialize)]
struct RawSeries {
    daily_counts: Vec<RawDayCount>,
}

#[derive(Serialize, Deserialize)]
struct RawDayCount {
    date: String,
    count: RawCount,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCount {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawSeries> for CountSeries {
    type Error = CounterError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        let daily_counts = raw
            .daily_counts
            .into_iter()
            .map(|entry| {
                let count = match entry.count {
                    RawCount::Integer(value) => value,
                    RawCount::Float(value) => float_to_count(value, &value.to_string())?,
                    RawCount::Text(value) => parse_count(&value)?,
                };
                Ok(DayCount::new(parse_ymd(&entry.date)?, count))
            })
            .collect::<Result<Vec<_>>>()?;
        CountSeries::new(daily_counts)
    }
}

impl From<CountSeries> for RawSeries {
    fn from(series: CountSeries) -> Self {
        RawSeries {
            daily_counts: series
                .daily_counts
                .into_iter()
                .map(|entry| RawDayCount {
                    date: entry.day.format(YMD_FORMAT).to_string(),
                    count: RawCount::Integer(entry.count),
                })
                .collect(),
        }
    }
}

pub fn parse_ymd(value: &str) -> Result<NaiveDate> {
    parse_date(value, YMD_FORMAT)
}

pub fn parse_dmy(value: &str) -> Result<NaiveDate> {
    parse_date(value, "%d/%m/%Y")
}

fn parse_date(value: &str, format: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| CounterError::InvalidDate {
        value: value.to_string(),
        format,
    })
}

/// Counts sometimes arrive as `"350.0"`; the fractional part is dropped.
pub fn parse_count(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if let Ok(count) = trimmed.parse::<u64>() {
        return Ok(count);
    }
    let float: f64 = trimmed
        .parse()
        .map_err(|_| CounterError::InvalidCount(value.to_string()))?;
    float_to_count(float, value)
}

fn float_to_count(value: f64, raw: &str) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(CounterError::InvalidCount(raw.to_string()));
    }
    Ok(value.trunc() as u64)
}
