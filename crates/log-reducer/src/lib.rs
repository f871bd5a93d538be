//! Offline reduction of discrete-event network simulation telemetry.
//!
//! The simulator appends timestamped records as it runs: cumulative flow
//! progress, per-link queue occupancy and busy time, and per-pair ping
//! round-trips. This crate turns those logs into two kinds of derived
//! artifacts: step-plottable interval series for visualization, and
//! causal-ordering diagnostics over ping sequences.
//!
//! Each run is a pure batch transform. Records for one entity key go in,
//! derived records come out, and any integrity violation (sequence gap,
//! interval discontinuity, missing data for a key) aborts the run with a
//! descriptive error. Plot rendering, templating, and process invocation are
//! collaborator responsibilities and live outside this crate.

pub mod error;
pub mod exporter;
pub mod ingestor;
pub mod processor;
pub mod reduce;
pub mod settings;
