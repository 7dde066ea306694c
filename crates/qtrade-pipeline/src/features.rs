//! Turns raw bar history into the continuous [`FeatureInputs`] the agent
//! discretizes into a [`qtrade_agent::StateKey`].

use qtrade_aggregator::Aggregator;
use qtrade_agent::FeatureInputs;
use qtrade_core::Micros;
use qtrade_types::Bar;

use crate::config::PipelineConfig;

fn mean_close(bars: &[Bar], window: usize) -> f64 {
    let slice = tail(bars, window);
    if slice.is_empty() {
        return 0.0;
    }
    slice.iter().map(|b| b.close.to_f64()).sum::<f64>() / slice.len() as f64
}

fn tail(bars: &[Bar], window: usize) -> &[Bar] {
    if bars.len() <= window {
        bars
    } else {
        &bars[bars.len() - window..]
    }
}

/// Sample standard deviation of close-to-close percent returns over the
/// trailing `window` bars. Needs at least two bars to produce one return.
fn returns_stddev(bars: &[Bar], window: usize) -> f64 {
    let slice = tail(bars, window + 1);
    if slice.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = slice
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.close.is_zero() {
                0.0
            } else {
                (cur.close.to_f64() - prev.close.to_f64()) / prev.close.to_f64()
            }
        })
        .collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    variance.sqrt()
}

fn trend_sign(bars: &[Bar], short_window: usize, long_window: usize) -> i8 {
    let short = mean_close(bars, short_window);
    let long = mean_close(bars, long_window);
    if short > long * 1.001 {
        1
    } else if short < long * 0.999 {
        -1
    } else {
        0
    }
}

/// Fraction of configured higher timeframes whose trend direction agrees
/// with the primary timeframe's. Timeframes with too little history to
/// judge a trend are excluded from both numerator and denominator; if none
/// can be judged the result is a neutral `0.5`.
pub fn cross_timeframe_agreement(
    aggregator: &Aggregator,
    symbol: &str,
    primary_sign: i8,
    cfg: &PipelineConfig,
) -> f64 {
    let mut agree = 0usize;
    let mut considered = 0usize;
    for &timeframe in &cfg.cross_timeframes {
        let bars = aggregator.get_bars(symbol, timeframe, cfg.long_ma_window);
        if bars.len() < cfg.long_ma_window {
            continue;
        }
        considered += 1;
        if trend_sign(&bars, cfg.short_ma_window, cfg.long_ma_window) == primary_sign {
            agree += 1;
        }
    }
    if considered == 0 {
        0.5
    } else {
        agree as f64 / considered as f64
    }
}

/// Builds [`FeatureInputs`] from closed primary-timeframe `bars` (most
/// recent last). `position_notional_abs` and `equity` feed `position_pct`.
pub fn extract(
    bars: &[Bar],
    position_notional_abs: Micros,
    equity: Micros,
    cfg: &PipelineConfig,
) -> FeatureInputs {
    let latest = bars.last().expect("caller guarantees at least one bar");
    let history = &bars[..bars.len() - 1];
    let mean_volume = if history.is_empty() {
        latest.volume.to_f64()
    } else {
        history.iter().map(|b| b.volume.to_f64()).sum::<f64>() / history.len() as f64
    };
    let volume_ratio = if mean_volume > 0.0 {
        latest.volume.to_f64() / mean_volume
    } else {
        1.0
    };

    let position_pct = if equity.is_zero() || equity.is_negative() {
        0.0
    } else {
        position_notional_abs.to_f64() / equity.to_f64()
    };

    FeatureInputs {
        price_change_pct: latest.change_pct(),
        volume_ratio,
        short_ma: mean_close(bars, cfg.short_ma_window),
        long_ma: mean_close(bars, cfg.long_ma_window),
        returns_stddev: returns_stddev(bars, cfg.volatility_window),
        returns_stddev_baseline: returns_stddev(bars, cfg.volatility_baseline_window),
        position_pct,
    }
}

/// `-1`/`0`/`1` trend direction of the primary timeframe, for cross-timeframe
/// comparison.
pub fn primary_trend_sign(bars: &[Bar], cfg: &PipelineConfig) -> i8 {
    trend_sign(bars, cfg.short_ma_window, cfg.long_ma_window)
}
