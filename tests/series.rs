use chrono::NaiveDate;
use rivoli_counter::series::{parse_count, parse_dmy};
use rivoli_counter::{CountSeries, CounterError, DayCount};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn small_series() -> CountSeries {
    CountSeries::from_csv(
        "2020/08/31,100\n2020/09/01,200\n2020/09/02,350\n2020/09/03,250\n2020/09/04,50\n2020/09/05,120\n",
    )
    .unwrap()
}

#[test]
fn day_count_csv_line() {
    let entry = DayCount::new(date(2020, 9, 2), 350);
    assert_eq!(entry.to_csv(), "2020/09/02,350");
    assert_eq!(DayCount::from_csv("2020/09/02,350").unwrap(), entry);
    assert_eq!(DayCount::from_csv("2020/09/02,350.0").unwrap(), entry);
}

#[test]
fn day_count_rejects_malformed_lines() {
    assert!(matches!(
        DayCount::from_csv("2020/09/02"),
        Err(CounterError::MalformedRecord(_))
    ));
    assert!(matches!(
        DayCount::from_csv("2020/09/02,3,4"),
        Err(CounterError::MalformedRecord(_))
    ));
    assert!(matches!(
        DayCount::from_csv("02/09/2020,3"),
        Err(CounterError::InvalidDate { .. })
    ));
    assert!(matches!(
        DayCount::from_csv("2020/09/02,many"),
        Err(CounterError::InvalidCount(_))
    ));
}

#[test]
fn parse_count_truncates_floats() {
    assert_eq!(parse_count("350").unwrap(), 350);
    assert_eq!(parse_count("350.0").unwrap(), 350);
    assert_eq!(parse_count(" 12.9 ").unwrap(), 12);
    assert!(parse_count("-3").is_err());
}

#[test]
fn series_rejects_gaps_and_duplicates() {
    let gap = CountSeries::from_csv("2020/09/01,1\n2020/09/03,2");
    assert!(matches!(
        gap,
        Err(CounterError::DiscontinuousSeries { previous, next })
            if previous == date(2020, 9, 1) && next == date(2020, 9, 3)
    ));

    let duplicate = CountSeries::from_csv("2020/09/01,1\n2020/09/01,2");
    assert!(matches!(duplicate, Err(CounterError::DiscontinuousSeries { .. })));

    let backwards = CountSeries::from_csv("2020/09/02,1\n2020/09/01,2");
    assert!(matches!(backwards, Err(CounterError::DiscontinuousSeries { .. })));
}

#[test]
fn empty_series_is_valid() {
    let series = CountSeries::from_csv("").unwrap();
    assert!(series.is_empty());
    assert_eq!(series.total(), 0);
    assert_eq!(series.last_day(), None);
    assert_eq!(series, CountSeries::new(Vec::new()).unwrap());
}

#[test]
fn series_lookups() {
    let series = small_series();
    assert_eq!(series.len(), 6);
    assert_eq!(series.first_day(), Some(date(2020, 8, 31)));
    assert_eq!(series.last_day(), Some(date(2020, 9, 5)));
    assert_eq!(series.get_count(date(2020, 9, 3)).unwrap(), 250);
    assert_eq!(series.total(), 1070);
    assert!(series.contains(date(2020, 9, 1)));
    assert!(!series.contains(date(2020, 8, 30)));
    assert!(matches!(
        series.get_count(date(2020, 9, 6)),
        Err(CounterError::DayNotFound(_))
    ));
}

#[test]
fn until_truncates_without_touching_the_original() {
    let series = small_series();
    let known = series.until(date(2020, 9, 2));
    assert_eq!(known.len(), 3);
    assert_eq!(known.last_day(), Some(date(2020, 9, 2)));
    assert_eq!(known.total(), 650);
    assert_eq!(series.len(), 6);
    assert!(series.until(date(2020, 8, 1)).is_empty());
}

#[test]
fn maxima_and_ranks() {
    let series = small_series();

    assert!(series.is_absolute_maximum(date(2020, 9, 2)).unwrap());
    assert!(!series.is_absolute_maximum(date(2020, 9, 3)).unwrap());
    assert!(series.is_year_maximum(date(2020, 9, 2)).unwrap());
    assert!(series.is_month_maximum(date(2020, 8, 31)).unwrap());
    assert!(!series.is_month_maximum(date(2020, 9, 5)).unwrap());

    let known = series.until(date(2020, 8, 31));
    assert!(known.is_year_maximum(date(2020, 8, 31)).unwrap());
    assert!(known.is_absolute_maximum(date(2020, 8, 31)).unwrap());

    let ranks: Vec<usize> = series
        .days()
        .into_iter()
        .map(|day| series.day_rank(day).unwrap())
        .collect();
    assert_eq!(ranks, vec![4, 2, 0, 1, 5, 3]);
}

#[test]
fn csv_round_trip() {
    let series = small_series();
    let csv = series.to_csv();
    assert!(csv.starts_with("2020/08/31,100\n2020/09/01,200"));
    assert_eq!(CountSeries::from_csv(&csv).unwrap(), series);
}

#[test]
fn json_round_trip_and_loose_counts() {
    let series = small_series();
    let json = series.to_json().unwrap();
    assert_eq!(CountSeries::from_json(&json).unwrap(), series);

    let loose = r#"{"daily_counts": [
        {"date": "2020/09/01", "count": 12},
        {"date": "2020/09/02", "count": 13.0},
        {"date": "2020/09/03", "count": "14.0"}
    ]}"#;
    let parsed = CountSeries::from_json(loose).unwrap();
    assert_eq!(parsed.counts(), vec![12, 13, 14]);

    let gap = r#"{"daily_counts": [
        {"date": "2020/09/01", "count": 12},
        {"date": "2020/09/03", "count": 13}
    ]}"#;
    assert!(CountSeries::from_json(gap).is_err());
}

#[test]
fn from_pairs_reads_month_first_dates() {
    let pairs = vec![
        ("08/31/2020".to_string(), "100.0".to_string()),
        ("09/01/2020".to_string(), "200".to_string()),
    ];
    let series = CountSeries::from_pairs(&pairs).unwrap();
    assert_eq!(series.first_day(), Some(date(2020, 8, 31)));
    assert_eq!(series.counts(), vec![100, 200]);
}

#[test]
fn parse_dmy_reads_day_first_dates() {
    assert_eq!(parse_dmy("09/01/2020").unwrap(), date(2020, 1, 9));
    assert!(parse_dmy("2020/01/09").is_err());
}
