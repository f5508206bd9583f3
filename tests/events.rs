use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use rivoli_counter::events::catalog::{
    day_historical_rank, historical_record, month_record, month_summary, month_total,
    year_summary, year_total,
};
use rivoli_counter::events::{choose_index_among_max, extended_catalog, standard_catalog};
use rivoli_counter::{CountSeries, CounterError, DayCount, Event, EventPipeline, Month};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn small_series() -> CountSeries {
    CountSeries::from_csv(
        "2020/08/31,100\n2020/09/01,200\n2020/09/02,350\n2020/09/03,250\n2020/09/04,50\n2020/09/05,120",
    )
    .unwrap()
}

fn flat_series(first_day: NaiveDate, counts: &[u64]) -> CountSeries {
    let daily_counts = counts
        .iter()
        .zip(first_day.iter_days())
        .map(|(count, day)| DayCount::new(day, *count))
        .collect();
    CountSeries::new(daily_counts).unwrap()
}

fn rank_message(rank: usize, among_nb_days: usize) -> String {
    Event::day_historical_rank(rank, among_nb_days)
        .unwrap()
        .default_message()
        .unwrap()
}

fn score(event: Event) -> f64 {
    event.default_score()
}

#[test]
fn day_historical_rank_messages() {
    assert_eq!(rank_message(50, 100), "Top 55%.");
    assert_eq!(rank_message(99, 100), "Top 100%.");
    assert_eq!(rank_message(40, 1000), "Top 5%.");
    assert_eq!(rank_message(4, 100), "5ème meilleur jour historique.");
    assert_eq!(rank_message(0, 100), "Meilleur jour historique.");
    assert_eq!(rank_message(140, 159), "Top 90%.");
}

#[test]
fn day_historical_rank_must_fit_the_population() {
    assert!(matches!(
        Event::day_historical_rank(10, 10),
        Err(CounterError::RankOutOfRange {
            rank: 10,
            population: 10
        })
    ));
}

#[test]
fn day_historical_rank_scores() {
    let scored = |rank, among| score(Event::day_historical_rank(rank, among).unwrap());
    assert!((scored(5, 100) - 0.8).abs() < 1e-6);
    assert!((scored(6, 100) - 0.5).abs() < 1e-6);
    assert!((scored(30, 100) - 0.5).abs() < 1e-6);
    assert!((scored(31, 100) - 0.0).abs() < 1e-6);
}

#[test]
fn fixed_scores() {
    assert!((score(Event::HistoricalRecord) - 1.0).abs() < 1e-6);
    let month_summary = Event::MonthSummary {
        month: Month::new(1, 2020),
        month_total: 10,
        month_rank: 0,
    };
    let year_summary = Event::YearSummary {
        year: 2020,
        year_total: 10,
        year_rank: 0,
    };
    assert!((score(month_summary) - 0.95).abs() < 1e-6);
    assert!((score(year_summary) - 0.96).abs() < 1e-6);
}

#[test]
fn month_record_scores_depend_on_the_day() {
    let scored = |day| score(Event::MonthRecord { day });
    assert!((scored(date(2020, 9, 15)) - 0.8).abs() < 1e-6);
    assert!((scored(date(2020, 9, 5)) - 0.0).abs() < 1e-6);
    assert!((scored(date(2020, 9, 10)) - 0.5).abs() < 1e-6);
}

#[test]
fn running_total_scores() {
    let month = |day, month_total| score(Event::MonthTotal { day, month_total });
    assert!((month(date(2020, 9, 1), 1000) - 0.0).abs() < 1e-6);
    assert!((month(date(2020, 9, 3), 1000) - 0.4).abs() < 1e-6);
    assert!((month(date(2020, 9, 12), 1000) - 0.75).abs() < 1e-6);
    assert!((month(date(2020, 9, 12), 1234) - 0.5).abs() < 1e-6);

    let year = |day, year_total| score(Event::YearTotal { day, year_total });
    assert!((year(date(2020, 3, 1), 80_000) - 0.0).abs() < 1e-6);
    assert!((year(date(2020, 3, 20), 80_000) - 0.75).abs() < 1e-6);

    assert!((score(Event::HistoricalTotal { total: 1_000_000 }) - 0.75).abs() < 1e-6);
    assert!((score(Event::HistoricalTotal { total: 987_026 }) - 0.5).abs() < 1e-6);
}

#[test]
fn summary_and_total_messages() {
    let month_summary = Event::MonthSummary {
        month: Month::new(2, 2020),
        month_total: 188_430,
        month_rank: 2,
    };
    assert_eq!(
        month_summary.default_message().unwrap(),
        "Février 2020 : 3ème meilleur mois de l'histoire avec 188 430 passages."
    );

    let year_summary = Event::YearSummary {
        year: 2019,
        year_total: 781_117,
        year_rank: 0,
    };
    assert_eq!(
        year_summary.default_message().unwrap(),
        "2019 : meilleure année de l'histoire avec 781 117 passages."
    );

    assert_eq!(
        Event::HistoricalTotal { total: 1_000_000 }
            .default_message()
            .unwrap(),
        "1 000 000 passages depuis l'installation du compteur."
    );
    assert_eq!(
        Event::MonthTotal {
            day: date(2020, 9, 12),
            month_total: 53_337
        }
        .default_message()
        .unwrap(),
        "53 337 passages depuis le début du mois."
    );
    assert_eq!(
        Event::YearTotal {
            day: date(2020, 9, 12),
            year_total: 950
        }
        .default_message()
        .unwrap(),
        "950 passages depuis le début de l'année."
    );
    assert_eq!(
        Event::HistoricalRecord.default_message().unwrap(),
        "Record historique !"
    );
}

#[test]
fn record_computers() {
    let series = small_series();
    assert_eq!(
        historical_record(date(2020, 9, 2), &series).unwrap(),
        Some(Event::HistoricalRecord)
    );
    assert_eq!(historical_record(date(2020, 9, 3), &series).unwrap(), None);
    assert_eq!(
        month_record(date(2020, 9, 2), &series).unwrap(),
        Some(Event::MonthRecord {
            day: date(2020, 9, 2)
        })
    );
    assert_eq!(month_record(date(2020, 9, 4), &series).unwrap(), None);
}

#[test]
fn rank_computer_uses_the_series_length() {
    let series = small_series();
    assert_eq!(
        day_historical_rank(date(2020, 9, 5), &series).unwrap(),
        Some(Event::DayHistoricalRank {
            rank: 3,
            among_nb_days: 6
        })
    );
}

#[test]
fn summaries_only_fire_on_period_ends() {
    let series = small_series();
    assert_eq!(
        month_summary(date(2020, 8, 31), &series).unwrap(),
        Some(Event::MonthSummary {
            month: Month::new(8, 2020),
            month_total: 100,
            month_rank: 1,
        })
    );
    assert_eq!(month_summary(date(2020, 9, 3), &series).unwrap(), None);
    assert_eq!(year_summary(date(2020, 9, 3), &series).unwrap(), None);
}

#[test]
fn tied_month_totals_share_the_best_rank() {
    let mut counts = vec![58];
    counts.extend(vec![2; 29]);
    let series = flat_series(date(2020, 1, 31), &counts);

    assert_eq!(
        month_summary(date(2020, 2, 29), &series).unwrap(),
        Some(Event::MonthSummary {
            month: Month::new(2, 2020),
            month_total: 58,
            month_rank: 0,
        })
    );
}

#[test]
fn tied_year_totals_share_the_best_rank() {
    let mut counts = vec![366];
    counts.extend(vec![1; 366]);
    let series = flat_series(date(2019, 12, 31), &counts);
    assert_eq!(series.last_day(), Some(date(2020, 12, 31)));

    assert_eq!(
        year_summary(date(2020, 12, 31), &series).unwrap(),
        Some(Event::YearSummary {
            year: 2020,
            year_total: 366,
            year_rank: 0,
        })
    );
}

#[test]
fn running_totals_stop_at_the_target_day() {
    let series = small_series();
    assert_eq!(
        month_total(date(2020, 9, 3), &series).unwrap(),
        Some(Event::MonthTotal {
            day: date(2020, 9, 3),
            month_total: 800
        })
    );
    assert_eq!(
        year_total(date(2020, 9, 3), &series).unwrap(),
        Some(Event::YearTotal {
            day: date(2020, 9, 3),
            year_total: 900
        })
    );
}

#[test]
fn catalogs() {
    assert_eq!(standard_catalog().len(), 7);
    assert_eq!(extended_catalog().len(), 8);
    assert_eq!(EventPipeline::default().len(), 7);
    assert_eq!(EventPipeline::extended().len(), 8);
    assert!(EventPipeline::with_computers(Vec::new()).is_empty());
}

#[test]
fn extraction_sees_the_series_as_of_the_target_day() {
    let series = small_series();
    let events = EventPipeline::default()
        .extract(date(2020, 9, 1), &series)
        .unwrap();

    assert_eq!(events[0], Event::HistoricalRecord);
    assert!(events.contains(&Event::DayHistoricalRank {
        rank: 0,
        among_nb_days: 2
    }));
    assert!(events.contains(&Event::HistoricalTotal { total: 300 }));
    assert!(events.contains(&Event::MonthTotal {
        day: date(2020, 9, 1),
        month_total: 200
    }));
    assert!(!events.iter().any(|event| matches!(event, Event::MonthSummary { .. })));
}

#[test]
fn extraction_requires_the_target_day() {
    let series = small_series();
    assert!(matches!(
        EventPipeline::default().extract(date(2020, 9, 6), &series),
        Err(CounterError::DayNotFound(_))
    ));
}

#[test]
fn election_prefers_the_record() {
    let series = small_series();
    let mut rng = StdRng::seed_from_u64(7);
    let event = EventPipeline::default()
        .most_interesting(date(2020, 9, 2), &series, &mut rng)
        .unwrap();
    assert_eq!(event, Event::HistoricalRecord);
}

#[test]
fn election_of_nothing_fails() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        EventPipeline::elect(&[], &mut rng),
        Err(CounterError::NoEvents)
    ));
    assert!(matches!(
        choose_index_among_max(&[], &mut rng),
        Err(CounterError::NoEvents)
    ));
}

#[test]
fn tie_break_is_reproducible_with_a_seed() {
    let scores = [0.5, 0.9, 0.2, 0.9, 0.9];
    let first = choose_index_among_max(&scores, &mut StdRng::seed_from_u64(42)).unwrap();
    let second = choose_index_among_max(&scores, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn tie_break_reaches_every_maximum() {
    let scores = [0.5, 0.9, 0.2, 0.9, 0.9];
    let mut chosen = HashSet::new();
    for seed in 0..200 {
        let index = choose_index_among_max(&scores, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert!((scores[index] - 0.9).abs() < 1e-6);
        chosen.insert(index);
    }
    assert_eq!(chosen, HashSet::from([1, 3, 4]));
}
