pub mod config;
pub mod export;
pub mod files;
pub mod grouping;
pub mod merge;
pub mod powerstat;
pub mod report;
pub mod run;
pub mod table;
pub mod throughput;

pub use run::{run, MergeRequest, RunOutcome};
