use crate::error::{Error, Result};

/// Half-open time window `[start_ns, end_ns)` with one accumulated scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start_ns: u64,
    pub end_ns: u64,
    pub value: f64,
}

impl Interval {
    pub fn width_ns(&self) -> u64 {
        self.end_ns.saturating_sub(self.start_ns)
    }
}

/// Buckets a non-decreasing timestamped event stream into fixed-width,
/// half-open windows `[0, w), [w, 2w), ...`.
///
/// Windows are advanced lazily: only windows actually reached by an event are
/// emitted, and the final in-progress window is always included. Trailing
/// empty windows are never back-filled; a caller that needs a dense tail must
/// post-process.
#[derive(Debug)]
pub struct IntervalAggregator {
    key: String,
    interval_ns: u64,
    current: Interval,
    closed: Vec<Interval>,
    last_time_ns: u64,
    saw_event: bool,
}

impl IntervalAggregator {
    /// `interval_ns` must be positive; callers validate it at configuration
    /// time.
    pub fn new(key: impl Into<String>, interval_ns: u64) -> Self {
        Self {
            key: key.into(),
            interval_ns,
            current: Interval {
                start_ns: 0,
                end_ns: interval_ns,
                value: 0.0,
            },
            closed: Vec::new(),
            last_time_ns: 0,
            saw_event: false,
        }
    }

    /// Adds `delta` into the window containing `time_ns`, closing and
    /// advancing windows as needed. Timestamps must be non-decreasing.
    pub fn push(&mut self, time_ns: u64, delta: f64) -> Result<()> {
        if time_ns < self.last_time_ns {
            return Err(Error::Sequence {
                key: self.key.clone(),
                message: format!(
                    "timestamps must be non-decreasing ({time_ns} ns after {} ns)",
                    self.last_time_ns
                ),
            });
        }
        self.last_time_ns = time_ns;
        self.saw_event = true;

        while time_ns >= self.current.end_ns {
            self.closed.push(self.current);
            self.current = Interval {
                start_ns: self.current.end_ns,
                end_ns: self.current.end_ns + self.interval_ns,
                value: 0.0,
            };
        }
        self.current.value += delta;
        Ok(())
    }

    /// Closes the in-progress window and returns all windows in order.
    /// An aggregator that never saw an event yields no windows.
    pub fn finish(mut self) -> Vec<Interval> {
        if self.saw_event {
            self.closed.push(self.current);
        }
        self.closed
    }
}

/// Sums per-event deltas into fixed-width windows.
pub fn aggregate_deltas<I>(key: &str, interval_ns: u64, events: I) -> Result<Vec<Interval>>
where
    I: IntoIterator<Item = (u64, f64)>,
{
    let mut aggregator = IntervalAggregator::new(key, interval_ns);
    for (time_ns, delta) in events {
        aggregator.push(time_ns, delta)?;
    }
    Ok(aggregator.finish())
}

/// Differences a monotonic cumulative counter into per-window deltas.
///
/// The previous counter value starts at 0. A counter that goes backwards is
/// not rejected here; the negative delta passes through.
pub fn aggregate_cumulative<I>(key: &str, interval_ns: u64, events: I) -> Result<Vec<Interval>>
where
    I: IntoIterator<Item = (u64, u64)>,
{
    let mut aggregator = IntervalAggregator::new(key, interval_ns);
    let mut previous = 0u64;
    for (time_ns, cumulative) in events {
        let delta = cumulative as f64 - previous as f64;
        aggregator.push(time_ns, delta)?;
        previous = cumulative;
    }
    Ok(aggregator.finish())
}
