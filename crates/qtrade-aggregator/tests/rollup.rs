use chrono::{TimeZone, Utc};
use qtrade_aggregator::{Aggregator, Timeframe};
use qtrade_core::{Micros, UtcInstant};
use qtrade_types::Bar;

fn bar(symbol: &str, minute: i64, second_in_minute: i64, open: i64, high: i64, low: i64, close: i64, vol: i64) -> Bar {
    let ts = UtcInstant::from_utc(
        Utc.timestamp_opt(minute * 60 + second_in_minute, 0).unwrap(),
    );
    Bar::new(
        symbol,
        ts,
        Micros::from_units(open),
        Micros::from_units(high),
        Micros::from_units(low),
        Micros::from_units(close),
        Micros::from_units(vol),
    )
    .unwrap()
}

#[test]
fn base_bars_roll_up_into_the_open_higher_timeframe_bucket() {
    let agg = Aggregator::new(vec![Timeframe::M5], 100);

    agg.ingest_base_bar(&bar("AAPL", 0, 0, 100, 101, 99, 100, 10));
    agg.ingest_base_bar(&bar("AAPL", 1, 0, 100, 105, 98, 102, 10));
    agg.ingest_base_bar(&bar("AAPL", 2, 0, 102, 103, 101, 101, 10));

    let bars = agg.get_bars("AAPL", Timeframe::M5, 10);
    assert_eq!(bars.len(), 1);
    let rolled = &bars[0];
    assert_eq!(rolled.open, Micros::from_units(100));
    assert_eq!(rolled.high, Micros::from_units(105));
    assert_eq!(rolled.low, Micros::from_units(98));
    assert_eq!(rolled.close, Micros::from_units(101));
    assert_eq!(rolled.volume, Micros::from_units(30));
}

#[test]
fn crossing_into_the_next_bucket_closes_the_prior_bar() {
    let agg = Aggregator::new(vec![Timeframe::M5], 100);

    agg.ingest_base_bar(&bar("AAPL", 0, 0, 100, 101, 99, 100, 10));
    agg.ingest_base_bar(&bar("AAPL", 5, 0, 101, 102, 100, 101, 10));

    let bars = agg.get_bars("AAPL", Timeframe::M5, 10);
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, Micros::from_units(100));
    assert_eq!(bars[1].open, Micros::from_units(101));
}

#[test]
fn retention_is_bounded() {
    let agg = Aggregator::new(vec![Timeframe::M1], 2);
    for minute in 0..5 {
        agg.ingest_base_bar(&bar("AAPL", minute, 0, 100, 101, 99, 100, 1));
    }
    let bars = agg.get_bars("AAPL", Timeframe::M1, 100);
    // 2 retained closed bars + 1 currently-open bar.
    assert_eq!(bars.len(), 3);
}
