pub mod aggregate;
pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod publish;
pub mod series;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

pub use crate::aggregate::Month;
pub use crate::compose::{Hashtag, Message, MAX_MESSAGE_LENGTH};
pub use crate::error::{CounterError, Result};
pub use crate::events::{Event, EventPipeline};
pub use crate::series::{CountSeries, DayCount};

const FRENCH_MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDay {
    Last,
    Random,
    On(NaiveDate),
}

impl TargetDay {
    /// Accepts `last`, `random` or a `DD/MM/YYYY` date.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "last" => Ok(TargetDay::Last),
            "random" => Ok(TargetDay::Random),
            other => series::parse_dmy(other).map(TargetDay::On),
        }
    }

    pub fn resolve<R: Rng + ?Sized>(self, series: &CountSeries, rng: &mut R) -> Result<NaiveDate> {
        match self {
            TargetDay::Last => series.last_day().ok_or(CounterError::EmptySeries),
            TargetDay::Random => series
                .days()
                .choose(rng)
                .copied()
                .ok_or(CounterError::EmptySeries),
            TargetDay::On(day) => {
                if series.contains(day) {
                    Ok(day)
                } else {
                    Err(CounterError::DayNotFound(day))
                }
            }
        }
    }
}

/// Full pipeline for one counter and one day: extract events on the series
/// as known that day, elect the most interesting one, compose the message.
pub fn build_message<R: Rng + ?Sized>(
    day: NaiveDate,
    series: &CountSeries,
    publish_day: NaiveDate,
    hashtag: Option<&Hashtag>,
    pipeline: &EventPipeline,
    rng: &mut R,
) -> Result<Message> {
    let event = pipeline.most_interesting(day, series, rng)?;
    let message = compose::compose_message(day, series, publish_day, &event, hashtag)?;
    info!(
        day = %day,
        event = event.label(),
        length = message.content().chars().count(),
        "built message"
    );
    Ok(message)
}

/// Groups thousands with a space: 14000 -> "14 000".
pub fn format_number(value: u64) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(' ');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn capitalize_first_letter(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rank 0 is simply "meilleur"; rank r reads "{r+1}ème ".
pub fn french_ordinal(rank: usize) -> String {
    if rank == 0 {
        return String::new();
    }
    format!("{}ème ", rank + 1)
}

pub fn french_month(month: Month) -> String {
    let name = month
        .month
        .checked_sub(1)
        .and_then(|index| FRENCH_MONTHS.get(index as usize))
        .copied()
        .unwrap_or("?");
    format!("{} {}", name, month.year)
}
