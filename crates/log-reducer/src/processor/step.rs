use crate::{
    error::{Error, Result},
    processor::interval::Interval,
};
use serde::Serialize;

/// Offset subtracted from a window's end so that the two points of a step
/// render as a flat segment instead of a diagonal into the next level. Any
/// value smaller than the narrowest window width works; the original tooling
/// used values between 1e-4 and 1e-6 ad hoc, unified here.
pub const STEP_EPSILON: f64 = 1e-6;

/// A single point of a step-plottable series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepPoint {
    pub x: f64,
    pub y: f64,
}

/// Expands each interval into the two points of a piecewise-constant
/// segment: `(start, y)` and `(end - ε, y)`. The y-value is produced by
/// `value_of`, which lets callers plot the raw accumulation, a rate, or a
/// fraction without rebuilding the intervals.
pub fn to_step_points<F>(key: &str, intervals: &[Interval], mut value_of: F) -> Result<Vec<StepPoint>>
where
    F: FnMut(&Interval) -> Result<f64>,
{
    let mut points = Vec::with_capacity(intervals.len() * 2);
    for interval in intervals {
        if interval.end_ns <= interval.start_ns {
            return Err(Error::InvertedInterval {
                key: key.to_string(),
                start_ns: interval.start_ns,
                end_ns: interval.end_ns,
            });
        }
        let y = value_of(interval)?;
        points.push(StepPoint {
            x: interval.start_ns as f64,
            y,
        });
        points.push(StepPoint {
            x: interval.end_ns as f64 - STEP_EPSILON,
            y,
        });
    }
    Ok(points)
}

/// Step points carrying each interval's accumulated value unchanged.
pub fn to_raw_step_points(key: &str, intervals: &[Interval]) -> Result<Vec<StepPoint>> {
    to_step_points(key, intervals, |interval| Ok(interval.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start_ns: u64, end_ns: u64, value: f64) -> Interval {
        Interval {
            start_ns,
            end_ns,
            value,
        }
    }

    #[test]
    fn two_points_per_interval_with_shared_level() {
        let intervals = [interval(0, 1_000, 3.0), interval(1_000, 2_000, 7.0)];
        let points = to_raw_step_points("0 -> 1", &intervals).unwrap();
        assert_eq!(points.len(), 4);
        for (pair, source) in points.chunks(2).zip(&intervals) {
            assert_eq!(pair[0].y, pair[1].y);
            assert_eq!(pair[0].x, source.start_ns as f64);
            assert!(pair[1].x < source.end_ns as f64);
            assert!(pair[1].x >= source.start_ns as f64);
        }
    }

    #[test]
    fn inverted_interval_is_a_validation_error() {
        let intervals = [interval(1_000, 1_000, 1.0)];
        assert!(matches!(
            to_raw_step_points("0 -> 1", &intervals),
            Err(Error::InvertedInterval { .. })
        ));
    }

    #[test]
    fn mapped_level_is_applied_to_both_points() {
        let intervals = [interval(0, 1_000, 500.0)];
        let points = to_step_points("0 -> 1", &intervals, |iv| Ok(iv.value / 1_000.0)).unwrap();
        assert_eq!(points[0].y, 0.5);
        assert_eq!(points[1].y, 0.5);
    }

    #[test]
    fn empty_input_yields_no_points() {
        assert!(to_raw_step_points("0 -> 1", &[]).unwrap().is_empty());
    }
}
