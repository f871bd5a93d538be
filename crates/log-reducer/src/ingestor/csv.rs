use crate::{
    error::{Error, Result},
    ingestor::types::{
        BurstPacketRecord, LinkIntervalRecord, PairKey, PingObservation, PingRecord, PingReply,
        ProgressRecord,
    },
    processor::interval::Interval,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Reads a headerless simulator log CSV into typed rows. Column count or
/// type mismatches surface as parse errors immediately, not at use time.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    debug!(path = %path.display(), rows = rows.len(), "read log file");
    Ok(rows)
}

/// Filters pre-aggregated link intervals down to one pair, in file order.
pub fn intervals_for_pair(rows: &[LinkIntervalRecord], pair: PairKey) -> Vec<Interval> {
    rows.iter()
        .filter(|row| row.from == pair.from && row.to == pair.to)
        .map(|row| Interval {
            start_ns: row.start_ns,
            end_ns: row.end_ns,
            value: row.value as f64,
        })
        .collect()
}

/// Verifies that every progress row belongs to the requested flow and
/// returns its `(time_ns, cumulative_byte)` samples.
pub fn progress_for_flow(rows: &[ProgressRecord], flow_id: u64) -> Result<Vec<(u64, u64)>> {
    let key = format!("flow {flow_id}");
    for row in rows {
        if row.flow_id != flow_id {
            return Err(Error::Format {
                key,
                message: format!(
                    "flow identifier {} does not match (it must be the same in the entire progress file)",
                    row.flow_id
                ),
            });
        }
    }
    Ok(rows.iter().map(|row| (row.time_ns, row.progress_byte)).collect())
}

/// Filters pingmesh rows down to one pair and validates them into
/// round-trip observations.
///
/// Per pair, ping numbers must increment by exactly 1 starting at 0, the
/// arrival marker must be `YES` or `LOST`, a lost ping must carry `-1` in
/// every timing field, and an arrived ping must carry non-negative values in
/// all of them. Matching zero rows is a [`Error::NoData`] failure.
pub fn pings_for_pair(rows: &[PingRecord], pair: PairKey) -> Result<Vec<PingObservation>> {
    let key = pair.to_string();
    let mut observations = Vec::new();
    let mut expected_ping_no = 0u64;

    for row in rows {
        if row.from != pair.from || row.to != pair.to {
            continue;
        }

        if row.ping_no != expected_ping_no {
            return Err(Error::Sequence {
                key,
                message: format!(
                    "ping number must be incrementally ascending (expected {expected_ping_no}, found {})",
                    row.ping_no
                ),
            });
        }
        expected_ping_no += 1;

        let lost = match row.arrived.as_str() {
            "YES" => false,
            "LOST" => true,
            other => {
                return Err(Error::Format {
                    key,
                    message: format!("invalid arrival marker '{other}' for ping {}", row.ping_no),
                });
            }
        };

        let timing_fields = [
            row.reply_ns,
            row.receive_reply_ns,
            row.latency_to_there_ns,
            row.latency_from_there_ns,
            row.rtt_ns,
        ];
        let reply = if lost {
            if timing_fields.iter().any(|&field| field != -1) {
                return Err(Error::Sequence {
                    key,
                    message: format!("lost ping {} must carry -1 in all timing fields", row.ping_no),
                });
            }
            None
        } else {
            if timing_fields.iter().any(|&field| field < 0) {
                return Err(Error::Sequence {
                    key,
                    message: format!(
                        "arrived ping {} must carry non-negative timing fields",
                        row.ping_no
                    ),
                });
            }
            Some(PingReply {
                reply_ns: row.reply_ns as u64,
                receive_reply_ns: row.receive_reply_ns as u64,
                latency_to_there_ns: row.latency_to_there_ns as u64,
                latency_from_there_ns: row.latency_from_there_ns as u64,
                rtt_ns: row.rtt_ns as u64,
            })
        };

        observations.push(PingObservation {
            ping_no: row.ping_no,
            send_request_ns: row.send_request_ns,
            reply,
        });
    }

    if observations.is_empty() {
        return Err(Error::NoData { key });
    }
    Ok(observations)
}

/// Verifies that every burst packet row belongs to the requested burst.
/// When `sequenced` is set (outgoing packets), sequence numbers must count
/// up from 0 without gaps.
pub fn packets_for_burst(
    rows: &[BurstPacketRecord],
    burst_id: u64,
    sequenced: bool,
) -> Result<Vec<BurstPacketRecord>> {
    let key = format!("burst {burst_id}");
    for (index, row) in rows.iter().enumerate() {
        if row.burst_id != burst_id {
            return Err(Error::Format {
                key,
                message: format!(
                    "burst identifier {} does not match (it must be the same in the entire packet file)",
                    row.burst_id
                ),
            });
        }
        if sequenced && row.seq_no != index as u64 {
            return Err(Error::Sequence {
                key,
                message: format!(
                    "sequence numbers must count up from 0 (expected {index}, found {})",
                    row.seq_no
                ),
            });
        }
    }
    Ok(rows.to_vec())
}
