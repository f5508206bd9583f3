use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CounterError, Result};
use crate::series::CountSeries;

/// Calendar month of a given year. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(month: u32, year: i32) -> Self {
        Self { year, month }
    }

    pub fn of(day: NaiveDate) -> Self {
        Self::new(day.month(), day.year())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

pub fn group_by_month(series: &CountSeries) -> BTreeMap<Month, Vec<u64>> {
    let mut groups: BTreeMap<Month, Vec<u64>> = BTreeMap::new();
    for entry in series.iter() {
        groups.entry(Month::of(entry.day)).or_default().push(entry.count);
    }
    groups
}

pub fn group_by_year(series: &CountSeries) -> BTreeMap<i32, Vec<u64>> {
    let mut groups: BTreeMap<i32, Vec<u64>> = BTreeMap::new();
    for entry in series.iter() {
        groups.entry(entry.day.year()).or_default().push(entry.count);
    }
    groups
}

pub fn month_totals(series: &CountSeries) -> BTreeMap<Month, u64> {
    group_by_month(series)
        .into_iter()
        .map(|(month, counts)| (month, counts.iter().sum()))
        .collect()
}

pub fn year_totals(series: &CountSeries) -> BTreeMap<i32, u64> {
    group_by_year(series)
        .into_iter()
        .map(|(year, counts)| (year, counts.iter().sum()))
        .collect()
}

pub fn cumulative_sums(values: &[u64]) -> Vec<u64> {
    values
        .iter()
        .scan(0u64, |running, value| {
            *running += value;
            Some(*running)
        })
        .collect()
}

pub fn month_cumulative_sums(series: &CountSeries) -> BTreeMap<Month, Vec<u64>> {
    group_by_month(series)
        .into_iter()
        .map(|(month, counts)| (month, cumulative_sums(&counts)))
        .collect()
}

/// Position of `target` in `values` sorted in descending order. Ties resolve to
/// the best position, so two equal counts share the same rank.
pub fn optimistic_rank(target: u64, values: &[u64]) -> Result<usize> {
    if !values.contains(&target) {
        return Err(CounterError::RankTargetMissing(target));
    }
    Ok(values.iter().filter(|value| **value > target).count())
}

pub fn month_day_count(month: Month) -> u32 {
    let first = NaiveDate::from_ymd_opt(month.year, month.month, 1);
    let next_first = if month.month == 12 {
        NaiveDate::from_ymd_opt(month.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year, month.month + 1, 1)
    };
    match (first, next_first) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 0,
    }
}

pub fn is_last_day_of_month(day: NaiveDate) -> bool {
    day.succ_opt().map_or(true, |next| next.day() == 1)
}

pub fn is_last_day_of_year(day: NaiveDate) -> bool {
    day.month() == 12 && day.day() == 31
}

pub fn is_first_day_of_month(day: NaiveDate) -> bool {
    day.day() == 1
}

pub fn is_first_day_of_year(day: NaiveDate) -> bool {
    day.month() == 1 && day.day() == 1
}

/// Round milestones deserve more attention: repdigits of three digits or more
/// (777, 9999) and leading-digit multiples of a power of ten (1000, 9000).
pub fn looks_funny(number: u64) -> bool {
    let digits = number.to_string();
    let first = digits.as_bytes()[0];
    if digits.len() >= 3 && digits.bytes().all(|digit| digit == first) {
        return true;
    }
    number % 10u64.pow(digits.len() as u32 - 1) == 0
}

/// Ceiling of `fraction` to the next multiple of 5 %, e.g. 0.23 -> 25.
pub fn round_up_to_nearest_5_percent(fraction: f64) -> Result<u32> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(CounterError::FractionOutOfRange(fraction));
    }
    Ok((fraction * 20.0).ceil() as u32 * 5)
}
