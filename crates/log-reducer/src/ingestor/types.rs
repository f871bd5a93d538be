use serde::Deserialize;
use std::{fmt, str::FromStr};

/// Ordered (source, destination) pair identifying one telemetry series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub from: u64,
    pub to: u64,
}

impl PairKey {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl FromStr for PairKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid pair '{s}': expected '<from>:<to>'"))?;
        let from = from
            .parse()
            .map_err(|_| format!("invalid source node id '{from}'"))?;
        let to = to
            .parse()
            .map_err(|_| format!("invalid destination node id '{to}'"))?;
        Ok(Self { from, to })
    }
}

/// Cumulative progress sample for one flow, as written by the simulator.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProgressRecord {
    pub flow_id: u64,
    pub time_ns: u64,
    pub progress_byte: u64,
}

/// Pre-aggregated per-link interval row (`from, to, start, end, value`).
/// Queue occupancy carries packets or bytes; utilization carries busy
/// nanoseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkIntervalRecord {
    pub from: u64,
    pub to: u64,
    pub start_ns: u64,
    pub end_ns: u64,
    pub value: u64,
}

/// Raw pingmesh row. Numeric reply fields are `-1` sentinels when the ping
/// was lost; the arrival marker is validated against exactly two states.
#[derive(Debug, Clone, Deserialize)]
pub struct PingRecord {
    pub from: u64,
    pub to: u64,
    pub ping_no: u64,
    pub send_request_ns: u64,
    pub reply_ns: i64,
    pub receive_reply_ns: i64,
    pub latency_to_there_ns: i64,
    pub latency_from_there_ns: i64,
    pub rtt_ns: i64,
    pub arrived: String,
}

/// Reply timings of a ping that made it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingReply {
    pub reply_ns: u64,
    pub receive_reply_ns: u64,
    pub latency_to_there_ns: u64,
    pub latency_from_there_ns: u64,
    pub rtt_ns: u64,
}

/// A validated ping round-trip for one pair. `reply` is `None` when the ping
/// was marked lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingObservation {
    pub ping_no: u64,
    pub send_request_ns: u64,
    pub reply: Option<PingReply>,
}

impl PingObservation {
    pub fn is_lost(&self) -> bool {
        self.reply.is_none()
    }
}

/// One packet of a UDP burst (`burst_id, seq_no, time_ns`), either sent or
/// received depending on the file it came from.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BurstPacketRecord {
    pub burst_id: u64,
    pub seq_no: u64,
    pub time_ns: u64,
}
