use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{CounterError, Result};
use crate::events::catalog::{extended_catalog, standard_catalog, EventComputer};
use crate::events::Event;
use crate::series::CountSeries;

#[derive(Clone)]
pub struct EventPipeline {
    computers: Vec<EventComputer>,
}

impl Default for EventPipeline {
    fn default() -> Self {
        Self::with_computers(standard_catalog())
    }
}

impl EventPipeline {
    pub fn with_computers(computers: Vec<EventComputer>) -> Self {
        Self { computers }
    }

    pub fn extended() -> Self {
        Self::with_computers(extended_catalog())
    }

    pub fn push(&mut self, computer: EventComputer) {
        self.computers.push(computer);
    }

    pub fn len(&self) -> usize {
        self.computers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computers.is_empty()
    }

    /// Runs every computer, in catalog order, on the series as known on `day`.
    pub fn extract(&self, day: NaiveDate, series: &CountSeries) -> Result<Vec<Event>> {
        let known = series.until(day);
        known.get_count(day)?;

        let mut events = Vec::new();
        for computer in &self.computers {
            if let Some(event) = computer(day, &known)? {
                events.push(event);
            }
        }
        debug!(day = %day, count = events.len(), "extracted events");
        Ok(events)
    }

    /// Highest scoring event; ties are broken uniformly with `rng`.
    pub fn elect<'a, R: Rng + ?Sized>(events: &'a [Event], rng: &mut R) -> Result<&'a Event> {
        let scores: Vec<f64> = events.iter().map(Event::default_score).collect();
        for (event, score) in events.iter().zip(&scores) {
            debug!(event = event.label(), score, "scored event");
        }
        let index = choose_index_among_max(&scores, rng)?;
        debug!(event = events[index].label(), "elected event");
        Ok(&events[index])
    }

    pub fn most_interesting<R: Rng + ?Sized>(
        &self,
        day: NaiveDate,
        series: &CountSeries,
        rng: &mut R,
    ) -> Result<Event> {
        let events = self.extract(day, series)?;
        Self::elect(&events, rng).cloned()
    }
}

pub fn choose_index_among_max<R: Rng + ?Sized>(scores: &[f64], rng: &mut R) -> Result<usize> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score == max)
        .map(|(index, _)| index)
        .collect();
    tied.choose(rng).copied().ok_or(CounterError::NoEvents)
}
