use std::fmt;

use crate::{
    config::SimulationConfig,
    memory::page_table::Footprint,
    sim::{SimulationStats, Simulator},
};

/// End-of-run summary of one simulation
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub trace_name: &'a str,
    pub config: &'a SimulationConfig,
    pub stats: SimulationStats,
    pub footprint: Footprint,
}

impl<'a> Report<'a> {
    pub fn new(trace_name: &'a str, sim: &'a Simulator) -> Self {
        Report {
            trace_name,
            config: sim.config(),
            stats: sim.stats(),
            footprint: sim.table().footprint(),
        }
    }

    pub const ROW_HEADER: &'static str =
        "trace                table       policy page_kb mem_kb   accesses     faults writebacks table_kb";

    /// One fixed-width line, for comparing many runs side by side
    pub fn row(&self) -> String {
        format!("{:<20} {:<11} {:<6} {:>7} {:>6} {:>10} {:>10} {:>10} {:>8}",
            self.trace_name,
            self.config.table.as_str(),
            self.config.policy.as_str(),
            self.config.page_size / 1024,
            self.config.memory_size / 1024,
            self.stats.total_accesses,
            self.stats.page_faults,
            self.stats.dirty_writebacks,
            self.footprint.kilobytes())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input file: {}", self.trace_name)?;
        writeln!(f, "{}", self.config)?;
        writeln!(f, "Pages read: {}", self.stats.page_faults)?;
        writeln!(f, "Pages written: {}", self.stats.dirty_writebacks)?;
        writeln!(f, "Total memory accesses: {}", self.stats.total_accesses)?;
        writeln!(f, "Page fault rate: {:.4}", self.stats.fault_rate())?;
        write!(f, "Page table memory: {} KB ({} entries)", self.footprint.kilobytes(), self.footprint.entries)
    }
}
