pub mod contiguity;
pub mod interval;
pub mod ordering;
pub mod rate;
pub mod step;
