//! Shared helpers for engine unit tests.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use shadow_domain::Bar;

pub const DEFAULT_EPSILON: f64 = 1e-6;

pub fn assert_approx(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {expected}, got {actual} (eps {eps})"
    );
}

fn dec(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap().round_dp(8)
}

/// Bar with explicit prices, one minute apart by index.
pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Bar::new(
        t0 + Duration::minutes(i as i64),
        dec(open),
        dec(high),
        dec(low),
        dec(close),
        Decimal::ONE,
    )
    .unwrap()
}

/// Bars whose open/close equal the given prices and whose high-low range
/// spans `spread_pct` percent of the close, centred on it.
pub fn bars_from_closes(closes: &[f64], spread_pct: f64) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let half = c * spread_pct / 200.0;
            bar(i, c, c + half, c - half, c)
        })
        .collect()
}

/// Constant-price bars.
pub fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
    (0..n).map(|i| bar(i, price, price, price, price)).collect()
}
