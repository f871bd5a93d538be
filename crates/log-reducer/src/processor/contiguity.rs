use crate::{
    error::{Error, Result},
    processor::interval::Interval,
};

/// Checks that the intervals recorded for one entity key form a gapless,
/// non-overlapping partition of time starting at zero.
///
/// `intervals` must already be filtered to the key and in file order. An
/// empty slice fails with [`Error::NoData`]: in the source format an empty
/// result is ambiguous with an invalid key, so the two are distinguished
/// here.
pub fn validate_contiguous(key: &str, intervals: &[Interval]) -> Result<()> {
    if intervals.is_empty() {
        return Err(Error::NoData {
            key: key.to_string(),
        });
    }

    let mut expected_next_start_ns = 0;
    for interval in intervals {
        if interval.start_ns != expected_next_start_ns {
            return Err(Error::Contiguity {
                key: key.to_string(),
                expected_ns: expected_next_start_ns,
                actual_ns: interval.start_ns,
            });
        }
        expected_next_start_ns = interval.end_ns;
    }
    Ok(())
}
