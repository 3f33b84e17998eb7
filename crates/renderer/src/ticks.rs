//! Tick placement on a "nice" 1-2-5 sequence
//!
//! Intervals snap to 1, 2, 5 x 10^n, chosen so adjacent ticks stay at least
//! `min_gap_px` apart at the current zoom.

use ephys_charts_shared::AxisRange;

/// Smallest value from the 1-2-5 x 10^n sequence that is >= `raw`.
pub fn nice_interval(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

/// Tick values inside `range`, spaced so that consecutive ticks are at least
/// `min_gap_px` apart over `drawable_px`.
pub fn tick_positions(range: AxisRange, drawable_px: f64, min_gap_px: f64) -> Vec<f64> {
    if range.span() <= 0.0 || drawable_px <= 0.0 {
        return Vec::new();
    }
    let interval = nice_interval(range.span() * min_gap_px / drawable_px);
    let first = (range.min / interval).ceil() as i64;
    let last = (range.max / interval).floor() as i64;
    (first..=last).map(|k| k as f64 * interval).collect()
}

/// Format a tick value with just enough decimals for its interval.
pub fn format_tick(value: f64, interval: f64) -> String {
    let decimals = if interval >= 1.0 {
        0
    } else {
        (-interval.log10().floor()) as usize
    };
    format!("{value:.decimals$}")
}

/// Interval actually used by [`tick_positions`], exposed for label formatting.
pub fn tick_interval(range: AxisRange, drawable_px: f64, min_gap_px: f64) -> f64 {
    nice_interval(range.span() * min_gap_px / drawable_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_interval_snaps_up() {
        assert_eq!(nice_interval(0.7), 1.0);
        assert_eq!(nice_interval(1.3), 2.0);
        assert_eq!(nice_interval(3.0), 5.0);
        assert_eq!(nice_interval(7.0), 10.0);
        assert_eq!(nice_interval(30.0), 50.0);
        assert!((nice_interval(0.03) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_tick_positions_respect_min_gap() {
        let range = AxisRange::new(0.0, 999.0);
        let ticks = tick_positions(range, 600.0, 50.0);
        assert!(!ticks.is_empty());
        // 999 * 50 / 600 = 83.25 -> interval 100
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[1], 100.0);
        assert_eq!(*ticks.last().unwrap(), 900.0);
        let px_per_unit = 600.0 / range.span();
        assert!((ticks[1] - ticks[0]) * px_per_unit >= 50.0);
    }

    #[test]
    fn test_tick_positions_cover_negative_ranges() {
        let range = AxisRange::new(-250.0, 250.0);
        let ticks = tick_positions(range, 500.0, 40.0);
        assert!(ticks.contains(&0.0));
        assert!(ticks.first().unwrap() >= &-250.0);
        assert!(ticks.last().unwrap() <= &250.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(900.0, 100.0), "900");
        assert_eq!(format_tick(0.5, 0.5), "0.5");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(-2.0, 2.0), "-2");
    }
}
