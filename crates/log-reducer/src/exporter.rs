use crate::{
    error::Result,
    ingestor::types::{BurstPacketRecord, PairKey, PingObservation},
    processor::step::StepPoint,
};
use std::{collections::HashMap, path::Path};
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

/// One row per reduction, for the run summary table.
#[derive(Debug, Clone, Tabled)]
pub struct ReductionSummary {
    #[tabled(rename = "series")]
    pub series: String,
    #[tabled(rename = "records_in")]
    pub records_in: usize,
    #[tabled(rename = "files_out")]
    pub files_out: usize,
}

/// Renders run summaries in the same table style used across the CLI.
pub fn render_summaries(summaries: &[ReductionSummary]) -> String {
    Table::new(summaries)
        .with(Style::psql().remove_horizontals())
        .to_string()
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    let writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    Ok(writer)
}

/// Writes a step series as `<prefix fields...>,x,y`, floats with ten decimal
/// places to match the layout the plotting collaborator consumes.
pub fn write_step_series(path: &Path, prefix: &[u64], points: &[StepPoint]) -> Result<()> {
    let mut writer = open_writer(path)?;
    for point in points {
        let mut record: Vec<String> = prefix.iter().map(u64::to_string).collect();
        record.push(format!("{:.10}", point.x));
        record.push(format!("{:.10}", point.y));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), points = points.len(), "wrote step series");
    Ok(())
}

/// Writes `from,to,send_ts,rtt_ns` per ping, with `0` standing in for a lost
/// reply so the series stays dense over time.
pub fn write_rtt_series(path: &Path, pair: PairKey, observations: &[PingObservation]) -> Result<()> {
    let mut writer = open_writer(path)?;
    for observation in observations {
        let rtt_ns = observation.reply.map_or(0, |reply| reply.rtt_ns);
        writer.write_record([
            pair.from.to_string(),
            pair.to.to_string(),
            observation.send_request_ns.to_string(),
            rtt_ns.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), pings = observations.len(), "wrote RTT series");
    Ok(())
}

/// Writes the running byte total of a burst as `burst_id,time,amount`, one
/// fixed-size packet per row.
pub fn write_cumulative_amounts(
    path: &Path,
    burst_id: u64,
    packets: &[BurstPacketRecord],
    packet_size_byte: u64,
) -> Result<()> {
    let mut writer = open_writer(path)?;
    let mut amount_byte = 0u64;
    for packet in packets {
        amount_byte += packet_size_byte;
        writer.write_record([
            burst_id.to_string(),
            format!("{:.6}", packet.time_ns as f64),
            amount_byte.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), packets = packets.len(), "wrote cumulative amounts");
    Ok(())
}

/// Writes `burst_id,send_time,one_way_latency_ns` for every sent packet that
/// arrived, matching sent and received packets on sequence number.
pub fn write_one_way_latencies(
    path: &Path,
    burst_id: u64,
    outgoing: &[BurstPacketRecord],
    incoming: &[BurstPacketRecord],
) -> Result<()> {
    let arrived: HashMap<u64, u64> = incoming
        .iter()
        .map(|packet| (packet.seq_no, packet.time_ns))
        .collect();

    let mut writer = open_writer(path)?;
    let mut matched = 0usize;
    for packet in outgoing {
        if let Some(&receive_ns) = arrived.get(&packet.seq_no) {
            writer.write_record([
                burst_id.to_string(),
                format!("{:.6}", packet.time_ns as f64),
                (receive_ns as i64 - packet.time_ns as i64).to_string(),
            ])?;
            matched += 1;
        }
    }
    writer.flush()?;
    info!(path = %path.display(), matched, "wrote one-way latencies");
    Ok(())
}
