use crate::{
    error::{Error, Result},
    processor::interval::Interval,
};

/// Converts an interval whose accumulated value is bytes into a
/// megabit-per-second rate over the interval's width.
pub fn megabit_per_s(key: &str, interval: &Interval) -> Result<f64> {
    let width_ns = nonzero_width(key, interval)?;
    Ok(interval.value * 8.0 * 1e9 / width_ns / 1e6)
}

/// Fraction of the interval the link was busy, for intervals whose
/// accumulated value is busy nanoseconds.
pub fn busy_fraction(key: &str, interval: &Interval) -> Result<f64> {
    let width_ns = nonzero_width(key, interval)?;
    Ok(interval.value / width_ns)
}

fn nonzero_width(key: &str, interval: &Interval) -> Result<f64> {
    let width_ns = interval.width_ns();
    if width_ns == 0 {
        return Err(Error::ZeroWidth {
            key: key.to_string(),
            start_ns: interval.start_ns,
        });
    }
    Ok(width_ns as f64)
}
