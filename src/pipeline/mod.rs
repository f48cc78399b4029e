//! Pipeline entry points.
//!
//! - `calculate_diff`: added/removed posts between two snapshots
//! - `Watcher::run_cycle`: one fetch → extract → diff → notify → persist cycle
//! - `Runner`: cold-start cycle, then one cycle per interval

pub mod cycle;
pub mod diff;
pub mod runner;
#[cfg(test)]
pub(crate) mod testing;

pub use cycle::{CycleReport, Notification, Watcher};
pub use diff::{Diff, calculate_diff};
pub use runner::{CycleState, Runner};
