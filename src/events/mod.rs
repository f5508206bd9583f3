pub mod catalog;
pub mod select;

use chrono::{Datelike, NaiveDate};

use crate::aggregate::{looks_funny, round_up_to_nearest_5_percent, Month};
use crate::error::{CounterError, Result};
use crate::{capitalize_first_letter, format_number, french_month, french_ordinal};

pub use catalog::{extended_catalog, standard_catalog, EventComputer};
pub use select::{choose_index_among_max, EventPipeline};

/// Candidate fact about the target day. Each variant carries what its score
/// and its sentence need, nothing more.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    HistoricalRecord,
    MonthRecord {
        day: NaiveDate,
    },
    DayHistoricalRank {
        rank: usize,
        among_nb_days: usize,
    },
    MonthSummary {
        month: Month,
        month_total: u64,
        month_rank: usize,
    },
    YearSummary {
        year: i32,
        year_total: u64,
        year_rank: usize,
    },
    HistoricalTotal {
        total: u64,
    },
    MonthTotal {
        day: NaiveDate,
        month_total: u64,
    },
    YearTotal {
        day: NaiveDate,
        year_total: u64,
    },
}

impl Event {
    pub fn day_historical_rank(rank: usize, among_nb_days: usize) -> Result<Self> {
        if rank >= among_nb_days {
            return Err(CounterError::RankOutOfRange {
                rank,
                population: among_nb_days,
            });
        }
        Ok(Event::DayHistoricalRank {
            rank,
            among_nb_days,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Event::HistoricalRecord => "historical_record",
            Event::MonthRecord { .. } => "month_record",
            Event::DayHistoricalRank { .. } => "day_historical_rank",
            Event::MonthSummary { .. } => "month_summary",
            Event::YearSummary { .. } => "year_summary",
            Event::HistoricalTotal { .. } => "historical_total",
            Event::MonthTotal { .. } => "month_total",
            Event::YearTotal { .. } => "year_total",
        }
    }

    pub fn default_score(&self) -> f64 {
        match self {
            Event::HistoricalRecord => 1.0,
            Event::MonthRecord { day } => {
                if day.day() >= 15 {
                    0.8
                } else if day.day() <= 5 {
                    0.0
                } else {
                    0.5
                }
            }
            Event::DayHistoricalRank {
                rank,
                among_nb_days,
            } => {
                let fraction = *rank as f64 / *among_nb_days as f64;
                if fraction <= 0.05 {
                    0.8
                } else if fraction <= 0.3 {
                    0.5
                } else {
                    0.0
                }
            }
            Event::MonthSummary { .. } => 0.95,
            Event::YearSummary { .. } => 0.96,
            Event::HistoricalTotal { total } => {
                if looks_funny(*total) {
                    0.75
                } else {
                    0.5
                }
            }
            Event::MonthTotal { day, month_total } => running_total_score(*day, *month_total),
            Event::YearTotal { day, year_total } => running_total_score(*day, *year_total),
        }
    }

    pub fn default_message(&self) -> Result<String> {
        let message = match self {
            Event::HistoricalRecord => "Record historique !".to_string(),
            Event::MonthRecord { .. } => "Record du mois !".to_string(),
            Event::DayHistoricalRank {
                rank,
                among_nb_days,
            } => {
                if *rank <= 10 {
                    format!("{}meilleur jour historique.", french_ordinal(*rank))
                } else {
                    let fraction = (*rank + 1) as f64 / *among_nb_days as f64;
                    format!("Top {}%.", round_up_to_nearest_5_percent(fraction)?)
                }
            }
            Event::MonthSummary {
                month,
                month_total,
                month_rank,
            } => format!(
                "{} : {}meilleur mois de l'histoire avec {} passages.",
                french_month(*month),
                french_ordinal(*month_rank),
                format_number(*month_total)
            ),
            Event::YearSummary {
                year,
                year_total,
                year_rank,
            } => format!(
                "{} : {}meilleure année de l'histoire avec {} passages.",
                year,
                french_ordinal(*year_rank),
                format_number(*year_total)
            ),
            Event::HistoricalTotal { total } => format!(
                "{} passages depuis l'installation du compteur.",
                format_number(*total)
            ),
            Event::MonthTotal { month_total, .. } => format!(
                "{} passages depuis le début du mois.",
                format_number(*month_total)
            ),
            Event::YearTotal { year_total, .. } => format!(
                "{} passages depuis le début de l'année.",
                format_number(*year_total)
            ),
        };
        Ok(capitalize_first_letter(&message))
    }
}

// A running total means nothing on the 1st and little in the first days.
fn running_total_score(day: NaiveDate, total: u64) -> f64 {
    if day.day() == 1 {
        0.0
    } else if day.day() <= 4 {
        0.4
    } else if looks_funny(total) {
        0.75
    } else {
        0.5
    }
}
