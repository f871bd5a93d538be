use simlog_reducer::{
    error::Error,
    ingestor::types::PairKey,
    reduce::{ReduceContext, reduce_ping},
};
use std::fs;
use tempfile::TempDir;

fn setup(pingmesh_csv: &str) -> (TempDir, ReduceContext) {
    let dir = TempDir::new().unwrap();
    let logs_dir = dir.path().join("logs_ns3");
    fs::create_dir_all(&logs_dir).unwrap();
    fs::write(logs_dir.join("pingmesh.csv"), pingmesh_csv).unwrap();
    let ctx = ReduceContext::new(&logs_dir, dir.path().join("data")).unwrap();
    (dir, ctx)
}

fn read_rows(dir: &TempDir, name: &str) -> Vec<Vec<String>> {
    let content = fs::read_to_string(dir.path().join("data").join(name)).unwrap();
    content
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

fn arrived_row(pair: (u64, u64), ping_no: u64, send_ns: u64, receive_ns: u64) -> String {
    let rtt = receive_ns - send_ns;
    format!(
        "{},{},{ping_no},{send_ns},{},{receive_ns},{},{},{rtt},YES\n",
        pair.0,
        pair.1,
        receive_ns - 1,
        rtt / 2,
        rtt / 2,
    )
}

fn lost_row(pair: (u64, u64), ping_no: u64, send_ns: u64) -> String {
    format!("{},{},{ping_no},{send_ns},-1,-1,-1,-1,-1,LOST\n", pair.0, pair.1)
}

#[test]
fn rtt_series_reports_zero_for_lost_pings() {
    let csv = [
        arrived_row((3, 5), 0, 0, 200),
        lost_row((3, 5), 1, 100),
        arrived_row((3, 5), 2, 200, 500),
    ]
    .concat();
    let (dir, ctx) = setup(&csv);

    let summary = reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000).unwrap();
    assert_eq!(summary.records_in, 3);

    let rows = read_rows(&dir, "ping_3_to_5_rtt.csv");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["3", "5", "0", "200"]);
    assert_eq!(rows[1], vec!["3", "5", "100", "0"]);
    assert_eq!(rows[2], vec!["3", "5", "200", "300"]);
}

#[test]
fn out_of_order_counts_are_bucketed_per_window() {
    // Reply receive order ends with the earliest timestamp: every ping but
    // the last is overtaken by it. Sends fall in two windows.
    let csv = [
        arrived_row((3, 5), 0, 0, 2_000_000_100),
        arrived_row((3, 5), 1, 10, 2_000_000_090),
        arrived_row((3, 5), 2, 1_000_000_020, 2_000_000_110),
        arrived_row((3, 5), 3, 1_000_000_030, 2_000_000_080),
    ]
    .concat();
    let (dir, ctx) = setup(&csv);

    reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000).unwrap();

    let rows = read_rows(&dir, "ping_3_to_5_out_of_order_in_intervals.csv");
    // Two windows, two step points each, prefixed with the pair ids.
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "3");
    assert_eq!(rows[0][1], "5");

    let window0: f64 = rows[0][3].parse().unwrap();
    let window1: f64 = rows[2][3].parse().unwrap();
    assert_eq!(window0, 2.0);
    assert_eq!(window1, 1.0);
}

#[test]
fn lost_ping_is_counted_as_violation() {
    let csv = [
        arrived_row((3, 5), 0, 0, 100),
        lost_row((3, 5), 1, 10),
        arrived_row((3, 5), 2, 20, 200),
    ]
    .concat();
    let (dir, ctx) = setup(&csv);

    reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000).unwrap();

    let rows = read_rows(&dir, "ping_3_to_5_out_of_order_in_intervals.csv");
    assert_eq!(rows.len(), 2);
    let count: f64 = rows[0][3].parse().unwrap();
    assert_eq!(count, 1.0);
}

#[test]
fn other_pairs_are_filtered_out() {
    let csv = [
        arrived_row((3, 5), 0, 0, 100),
        arrived_row((5, 3), 0, 5, 120),
        arrived_row((3, 5), 1, 10, 200),
    ]
    .concat();
    let (dir, ctx) = setup(&csv);

    let summary = reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000).unwrap();
    assert_eq!(summary.records_in, 2);
    assert_eq!(read_rows(&dir, "ping_3_to_5_rtt.csv").len(), 2);
}

#[test]
fn unknown_pair_is_no_data_not_empty_output() {
    let csv = arrived_row((3, 5), 0, 0, 100);
    let (_dir, ctx) = setup(&csv);
    assert!(matches!(
        reduce_ping(&ctx, PairKey::new(9, 9), 1_000_000_000),
        Err(Error::NoData { .. })
    ));
}

#[test]
fn ping_number_gap_aborts() {
    let csv = [arrived_row((3, 5), 0, 0, 100), arrived_row((3, 5), 2, 10, 200)].concat();
    let (_dir, ctx) = setup(&csv);
    assert!(matches!(
        reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000),
        Err(Error::Sequence { .. })
    ));
}

#[test]
fn stray_timing_field_on_lost_ping_aborts() {
    let csv = "3,5,0,0,-1,-1,-1,-1,42,LOST\n";
    let (_dir, ctx) = setup(csv);
    assert!(matches!(
        reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000),
        Err(Error::Sequence { .. })
    ));
}

#[test]
fn invalid_arrival_marker_aborts() {
    let csv = "3,5,0,0,99,100,1,1,2,PERHAPS\n";
    let (_dir, ctx) = setup(csv);
    assert!(matches!(
        reduce_ping(&ctx, PairKey::new(3, 5), 1_000_000_000),
        Err(Error::Format { .. })
    ));
}
