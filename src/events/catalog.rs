use chrono::{Datelike, NaiveDate};

use crate::aggregate::{
    is_last_day_of_month, is_last_day_of_year, month_totals, optimistic_rank, year_totals, Month,
};
use crate::error::{CounterError, Result};
use crate::events::Event;
use crate::series::CountSeries;

/// Inspects the series as known on the target day and maybe reports a fact.
/// Computers only ever see a series truncated to the target day.
pub type EventComputer = fn(NaiveDate, &CountSeries) -> Result<Option<Event>>;

pub fn standard_catalog() -> Vec<EventComputer> {
    vec![
        historical_record,
        day_historical_rank,
        month_summary,
        year_summary,
        historical_total,
        month_total,
        year_total,
    ]
}

pub fn extended_catalog() -> Vec<EventComputer> {
    let mut computers = standard_catalog();
    computers.push(month_record);
    computers
}

pub fn historical_record(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    Ok(series
        .is_absolute_maximum(day)?
        .then_some(Event::HistoricalRecord))
}

pub fn month_record(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    Ok(series
        .is_month_maximum(day)?
        .then_some(Event::MonthRecord { day }))
}

pub fn day_historical_rank(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    let rank = series.day_rank(day)?;
    Event::day_historical_rank(rank, series.len()).map(Some)
}

pub fn month_summary(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    if !is_last_day_of_month(day) {
        return Ok(None);
    }
    series.get_count(day)?;
    let totals = month_totals(series);
    let month = Month::of(day);
    let month_total = totals
        .get(&month)
        .copied()
        .ok_or(CounterError::DayNotFound(day))?;
    let all_totals: Vec<u64> = totals.values().copied().collect();
    Ok(Some(Event::MonthSummary {
        month,
        month_total,
        month_rank: optimistic_rank(month_total, &all_totals)?,
    }))
}

pub fn year_summary(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    if !is_last_day_of_year(day) {
        return Ok(None);
    }
    series.get_count(day)?;
    let totals = year_totals(series);
    let year_total = totals
        .get(&day.year())
        .copied()
        .ok_or(CounterError::DayNotFound(day))?;
    let all_totals: Vec<u64> = totals.values().copied().collect();
    Ok(Some(Event::YearSummary {
        year: day.year(),
        year_total,
        year_rank: optimistic_rank(year_total, &all_totals)?,
    }))
}

pub fn historical_total(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    series.get_count(day)?;
    Ok(Some(Event::HistoricalTotal {
        total: series.until(day).total(),
    }))
}

pub fn month_total(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    series.get_count(day)?;
    let month_total = series
        .iter()
        .filter(|entry| entry.day <= day && Month::of(entry.day) == Month::of(day))
        .map(|entry| entry.count)
        .sum();
    Ok(Some(Event::MonthTotal { day, month_total }))
}

pub fn year_total(day: NaiveDate, series: &CountSeries) -> Result<Option<Event>> {
    series.get_count(day)?;
    let year_total = series
        .iter()
        .filter(|entry| entry.day <= day && entry.day.year() == day.year())
        .map(|entry| entry.count)
        .sum();
    Ok(Some(Event::YearTotal { day, year_total }))
}
