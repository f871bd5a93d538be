use crate::{
    error::Result,
    exporter::{
        ReductionSummary, write_cumulative_amounts, write_one_way_latencies, write_rtt_series,
        write_step_series,
    },
    ingestor::{
        csv::{
            intervals_for_pair, packets_for_burst, pings_for_pair, progress_for_flow, read_records,
        },
        types::{BurstPacketRecord, LinkIntervalRecord, PairKey, PingRecord, ProgressRecord},
    },
    processor::{
        contiguity::validate_contiguous,
        interval::{aggregate_cumulative, aggregate_deltas},
        ordering::flag_out_of_order,
        rate::{busy_fraction, megabit_per_s},
        step::{to_raw_step_points, to_step_points},
    },
};
use clap::ValueEnum;
use std::{fs, path::PathBuf};
use tracing::info;

/// Byte size the simulator accounts to every UDP burst packet.
const BURST_PACKET_SIZE_BYTE: u64 = 1500;

/// Input and output locations for one batch of reductions. Paths are
/// explicit; nothing is resolved relative to the process working directory.
#[derive(Debug, Clone)]
pub struct ReduceContext {
    logs_dir: PathBuf,
    data_out_dir: PathBuf,
}

impl ReduceContext {
    pub fn new(logs_dir: impl Into<PathBuf>, data_out_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_out_dir = data_out_dir.into();
        fs::create_dir_all(&data_out_dir)?;
        Ok(Self {
            logs_dir: logs_dir.into(),
            data_out_dir,
        })
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.logs_dir.join(name)
    }

    fn out_path(&self, name: &str) -> PathBuf {
        self.data_out_dir.join(name)
    }
}

/// Differences one flow's cumulative progress into per-window byte counts
/// and writes the resulting rate step series.
pub fn reduce_flow_rate(
    ctx: &ReduceContext,
    flow_id: u64,
    interval_ns: u64,
) -> Result<ReductionSummary> {
    let key = format!("flow {flow_id}");
    info!(%key, interval_ns, "reducing flow progress to rate");

    let rows: Vec<ProgressRecord> =
        read_records(&ctx.log_path(&format!("tcp_flow_{flow_id}_progress.csv")))?;
    let samples = progress_for_flow(&rows, flow_id)?;
    let intervals = aggregate_cumulative(&key, interval_ns, samples)?;
    let points = to_step_points(&key, &intervals, |interval| megabit_per_s(&key, interval))?;
    write_step_series(
        &ctx.out_path(&format!("tcp_flow_{flow_id}_rate_in_intervals.csv")),
        &[flow_id],
        &points,
    )?;

    Ok(ReductionSummary {
        series: key,
        records_in: rows.len(),
        files_out: 1,
    })
}

/// Which queue the simulator tracked: the point-to-point net-device queue or
/// the traffic-control qdisc on the interface in front of it. Both are logged
/// in the same pre-aggregated interval format, under different file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueSource {
    Link,
    InterfaceTcQdisc,
}

impl QueueSource {
    fn log_name(self, unit: &str) -> String {
        match self {
            Self::Link => format!("link_queue_{unit}.csv"),
            Self::InterfaceTcQdisc => format!("link_interface_tc_qdisc_queue_{unit}.csv"),
        }
    }

    fn out_name(self, pair: PairKey, unit: &str) -> String {
        match self {
            Self::Link => format!(
                "link_queue_{}_to_{}_{unit}_in_intervals.csv",
                pair.from, pair.to
            ),
            Self::InterfaceTcQdisc => format!(
                "link_interface_tc_qdisc_queue_{}_to_{}_{unit}_in_intervals.csv",
                pair.from, pair.to
            ),
        }
    }
}

/// Where busy time was measured: the link as a whole or its net-device. The
/// net-device variant historically omitted the `fraction` infix in its output
/// name, which downstream plot templates rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UtilizationSource {
    Link,
    NetDevice,
}

impl UtilizationSource {
    fn log_name(self) -> &'static str {
        match self {
            Self::Link => "link_utilization.csv",
            Self::NetDevice => "link_net_device_utilization.csv",
        }
    }

    fn out_name(self, pair: PairKey) -> String {
        match self {
            Self::Link => format!(
                "link_utilization_{}_to_{}_fraction_in_intervals.csv",
                pair.from, pair.to
            ),
            Self::NetDevice => format!(
                "link_net_device_utilization_{}_to_{}_in_intervals.csv",
                pair.from, pair.to
            ),
        }
    }
}

/// Re-emits one link's pre-aggregated queue occupancy (packets and bytes) as
/// step series, after checking the intervals partition time without gaps.
pub fn reduce_link_queue(
    ctx: &ReduceContext,
    pair: PairKey,
    source: QueueSource,
) -> Result<ReductionSummary> {
    let key = pair.to_string();
    info!(%key, ?source, "reducing link queue occupancy");

    let mut records_in = 0;
    for unit in ["pkt", "byte"] {
        let rows: Vec<LinkIntervalRecord> = read_records(&ctx.log_path(&source.log_name(unit)))?;
        let intervals = intervals_for_pair(&rows, pair);
        validate_contiguous(&key, &intervals)?;
        let points = to_raw_step_points(&key, &intervals)?;
        write_step_series(&ctx.out_path(&source.out_name(pair, unit)), &[], &points)?;
        records_in += intervals.len();
    }

    Ok(ReductionSummary {
        series: key,
        records_in,
        files_out: 2,
    })
}

/// Converts one link's pre-aggregated busy time into utilization fractions
/// and writes the step series.
pub fn reduce_link_utilization(
    ctx: &ReduceContext,
    pair: PairKey,
    source: UtilizationSource,
) -> Result<ReductionSummary> {
    let key = pair.to_string();
    info!(%key, ?source, "reducing link utilization");

    let rows: Vec<LinkIntervalRecord> = read_records(&ctx.log_path(source.log_name()))?;
    let intervals = intervals_for_pair(&rows, pair);
    validate_contiguous(&key, &intervals)?;
    let points = to_step_points(&key, &intervals, |interval| busy_fraction(&key, interval))?;
    write_step_series(&ctx.out_path(&source.out_name(pair)), &[], &points)?;

    Ok(ReductionSummary {
        series: key,
        records_in: intervals.len(),
        files_out: 1,
    })
}

/// Validates one pair's pings, writes the RTT series, and counts
/// causal-order violations per window.
pub fn reduce_ping(ctx: &ReduceContext, pair: PairKey, interval_ns: u64) -> Result<ReductionSummary> {
    let key = pair.to_string();
    info!(%key, interval_ns, "reducing ping round-trips");

    let rows: Vec<PingRecord> = read_records(&ctx.log_path("pingmesh.csv"))?;
    let observations = pings_for_pair(&rows, pair)?;

    write_rtt_series(
        &ctx.out_path(&format!("ping_{}_to_{}_rtt.csv", pair.from, pair.to)),
        pair,
        &observations,
    )?;

    let flags = flag_out_of_order(&observations);
    let events = observations
        .iter()
        .zip(&flags)
        .map(|(observation, &flagged)| {
            (observation.send_request_ns, if flagged { 1.0 } else { 0.0 })
        });
    let intervals = aggregate_deltas(&key, interval_ns, events)?;
    let points = to_raw_step_points(&key, &intervals)?;
    write_step_series(
        &ctx.out_path(&format!(
            "ping_{}_to_{}_out_of_order_in_intervals.csv",
            pair.from, pair.to
        )),
        &[pair.from, pair.to],
        &points,
    )?;

    Ok(ReductionSummary {
        series: key,
        records_in: observations.len(),
        files_out: 2,
    })
}

/// Reduces one UDP burst's packet logs into cumulative amounts, send and
/// arrival rates, and per-packet one-way latencies.
pub fn reduce_udp_burst(
    ctx: &ReduceContext,
    burst_id: u64,
    interval_ns: u64,
) -> Result<ReductionSummary> {
    let key = format!("burst {burst_id}");
    info!(%key, interval_ns, "reducing UDP burst packets");

    let outgoing_rows: Vec<BurstPacketRecord> =
        read_records(&ctx.log_path(&format!("udp_burst_{burst_id}_outgoing.csv")))?;
    let outgoing = packets_for_burst(&outgoing_rows, burst_id, true)?;
    let incoming_rows: Vec<BurstPacketRecord> =
        read_records(&ctx.log_path(&format!("udp_burst_{burst_id}_incoming.csv")))?;
    let incoming = packets_for_burst(&incoming_rows, burst_id, false)?;

    write_cumulative_amounts(
        &ctx.out_path(&format!("udp_burst_{burst_id}_total_sent_byte.csv")),
        burst_id,
        &outgoing,
        BURST_PACKET_SIZE_BYTE,
    )?;
    write_cumulative_amounts(
        &ctx.out_path(&format!("udp_burst_{burst_id}_total_arrived_byte.csv")),
        burst_id,
        &incoming,
        BURST_PACKET_SIZE_BYTE,
    )?;

    for (direction, packets) in [("sent", &outgoing), ("arrived", &incoming)] {
        write_burst_rate(
            ctx,
            &key,
            burst_id,
            direction,
            packets,
            interval_ns,
        )?;
    }

    write_one_way_latencies(
        &ctx.out_path(&format!("udp_burst_{burst_id}_one_way_latency_ns.csv")),
        burst_id,
        &outgoing,
        &incoming,
    )?;

    Ok(ReductionSummary {
        series: key,
        records_in: outgoing.len() + incoming.len(),
        files_out: 5,
    })
}

fn write_burst_rate(
    ctx: &ReduceContext,
    key: &str,
    burst_id: u64,
    direction: &str,
    packets: &[BurstPacketRecord],
    interval_ns: u64,
) -> Result<()> {
    let events = packets
        .iter()
        .map(|packet| (packet.time_ns, BURST_PACKET_SIZE_BYTE as f64));
    let intervals = aggregate_deltas(key, interval_ns, events)?;
    let points = to_step_points(key, &intervals, |interval| megabit_per_s(key, interval))?;
    let path = ctx.out_path(&format!(
        "udp_burst_{burst_id}_{direction}_rate_megabit_per_s_in_intervals.csv"
    ));
    write_step_series(&path, &[burst_id], &points)
}
