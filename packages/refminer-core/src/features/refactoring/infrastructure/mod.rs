//! Refactoring infrastructure: report rendering against both snapshots

mod report;

pub use report::build_report;
