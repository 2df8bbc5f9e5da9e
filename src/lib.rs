//! Demand-paged virtual memory simulator.
//!
//! Replays a trace of 32-bit virtual addresses through a page table (dense,
//! two-level, three-level or inverted) backed by a fixed set of physical frames,
//! and counts page faults and dirty writebacks under a chosen replacement policy.

pub mod config;
pub mod error;
pub mod memory;
pub mod report;
pub mod sim;
pub mod trace;
pub mod utils;

pub use config::{PolicyKind, SimulationConfig, TableKind};
pub use error::{Result, SimError};
pub use report::Report;
pub use sim::{AccessEvent, SimulationStats, Simulator};
pub use trace::TraceEvent;
