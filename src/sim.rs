use std::fmt;

use tracing::{debug, info, trace};

use crate::{
    config::SimulationConfig,
    error::Result,
    memory::{
        frame::FrameStore,
        page_table::PageTable,
        policy::ReplacementPolicy,
        FrameIndex, PageNumber, Query,
    },
    trace::TraceEvent,
    utils::bit_ops::{self, Decomposed},
};

/// Counters accumulated over a run. They only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub total_accesses: u64,
    pub page_faults: u64,
    pub dirty_writebacks: u64,
}

impl SimulationStats {
    pub fn fault_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            0.0
        } else {
            self.page_faults as f64 / self.total_accesses as f64
        }
    }
}

/// What happened during one access
#[derive(Debug, Clone, Copy)]
pub struct AccessEvent {
    pub trace: TraceEvent,
    pub addr: Decomposed,
    pub result: Query,
    pub frame: FrameIndex,
    /// Page pushed out of `frame` to make room, if any
    pub evicted: Option<PageNumber>,
    /// Whether the evicted page had to be written back
    pub writeback: bool,
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let indices = self.addr.indices()
            .iter()
            .map(|i| format!("{:x}", i))
            .collect::<Vec<_>>()
            .join(".");
        write!(f,
            //addr   rw  page  off   levels res frame evicted wb
            "{:08x} {} {:6x} {:5x} {:>11} {:4} {:5} {:>6} {}",
            self.trace.addr(),
            if self.trace.is_write() { "W" } else { "R" },
            self.addr.page_number,
            self.addr.page_offset,
            indices,
            self.result.as_str(),
            self.frame,
            self.evicted.map_or("".to_string(), |p| format!("{:x}", p)),
            if self.writeback { "wb" } else { "" },
        )
    }
}

/// Replays accesses against one page table, frame store and replacement policy.
///
/// Strictly one access at a time: each is fully translated (or faulted in) before
/// the next begins. A fresh `Simulator` with the same config and trace always
/// produces the same stats, random policy included when seeded.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    table: PageTable,
    frames: FrameStore,
    policy: ReplacementPolicy,
    stats: SimulationStats,
    /// Logical clock, one tick per access
    now: u64,
    victim_selections: u64,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let table = PageTable::new(&config)?;
        let frames = FrameStore::new(config.frame_count);
        let policy = ReplacementPolicy::new(config.policy, config.seed);

        debug!(
            frames = config.frame_count,
            offset_bits = config.offset_bits,
            levels = ?table.level_widths(),
            table = %table.kind(),
            policy = %policy.kind(),
            "simulator ready"
        );

        Ok(Simulator {
            config,
            table,
            frames,
            policy,
            stats: SimulationStats::default(),
            now: 0,
            victim_selections: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn table(&self) -> &PageTable {
        &self.table
    }

    /// How many times the replacement policy was consulted
    pub fn victim_selections(&self) -> u64 {
        self.victim_selections
    }

    /// Processes one access: translate, or fault the page in.
    pub fn access(&mut self, event: TraceEvent) -> AccessEvent {
        self.stats.total_accesses += 1;
        self.now += 1;

        let is_write = event.is_write();
        let addr = bit_ops::decompose(event.addr(), self.config.offset_bits, self.table.level_widths());
        let page = addr.page_number;

        if let Some(frame) = self.table.lookup(page) {
            self.frames.touch(frame, self.now, is_write);
            return AccessEvent { trace: event, addr, result: Query::Hit, frame, evicted: None, writeback: false };
        }

        self.stats.page_faults += 1;
        let victim = self.acquire_frame();

        let mut evicted = None;
        let mut writeback = false;
        if let Some(previous) = self.frames.load(victim, page, self.now, is_write) {
            if let Some(old_page) = previous.resident_page {
                self.table.invalidate(old_page);
                evicted = Some(old_page);
            }
            if previous.dirty {
                self.stats.dirty_writebacks += 1;
                writeback = true;
            }
        }
        self.table.install(page, victim);

        trace!(page, frame = victim, evicted = ?evicted, writeback, "page fault");

        AccessEvent { trace: event, addr, result: Query::Miss, frame: victim, evicted, writeback }
    }

    /// A free frame if there is one, otherwise whatever the policy gives up
    fn acquire_frame(&mut self) -> FrameIndex {
        match self.frames.first_free() {
            Some(free) => free,
            None => {
                self.victim_selections += 1;
                self.policy.select_victim(&mut self.frames)
            }
        }
    }

    /// Replays a whole trace and returns the final counters
    pub fn run<I>(&mut self, trace: I) -> SimulationStats
    where
        I: IntoIterator<Item = TraceEvent>,
    {
        for event in trace {
            self.access(event);
        }
        info!(
            accesses = self.stats.total_accesses,
            faults = self.stats.page_faults,
            writebacks = self.stats.dirty_writebacks,
            "trace finished"
        );
        self.stats
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{PolicyKind, TableKind};
    use crate::trace::TraceEvent::{Read, Write};

    fn sim(policy: PolicyKind, table: TableKind, frames: u64) -> Simulator {
        // 4-byte pages keep page numbers readable: page = addr >> 2
        let config = SimulationConfig::new(4, 4 * frames, policy, table).unwrap();
        Simulator::new(config).unwrap()
    }

    #[test]
    fn fifo_evicts_the_page_it_needs_next() {
        let mut sim = sim(PolicyKind::Fifo, TableKind::Dense, 2);
        let stats = sim.run([Read(0x0), Read(0x4), Read(0x8), Read(0x0)]);
        assert_eq!(stats, SimulationStats { total_accesses: 4, page_faults: 4, dirty_writebacks: 0 });
        assert_eq!(sim.frames().get(0).resident_page, Some(2));
        assert_eq!(sim.frames().get(1).resident_page, Some(0));
    }

    #[test]
    fn lru_matches_fifo_without_repeats() {
        let mut sim = sim(PolicyKind::Lru, TableKind::Dense, 2);
        let stats = sim.run([Read(0x0), Read(0x4), Read(0x8), Read(0x0)]);
        assert_eq!(stats.page_faults, 4);
        assert_eq!(stats.dirty_writebacks, 0);
    }

    #[test]
    fn hits_refresh_and_dirty_the_frame() {
        let mut sim = sim(PolicyKind::Lru, TableKind::Dense, 2);
        let first = sim.access(Read(0x10));
        assert_eq!(first.result, Query::Miss);

        let second = sim.access(Write(0x11));
        assert_eq!(second.result, Query::Hit);
        assert_eq!(second.frame, first.frame);

        let frame = sim.frames().get(first.frame);
        assert!(frame.dirty);
        assert!(frame.referenced);
        assert_eq!(frame.last_access, 2);
    }

    #[test]
    fn dirty_victims_are_written_back() {
        let mut sim = sim(PolicyKind::Fifo, TableKind::Dense, 1);
        sim.access(Write(0x0));
        let event = sim.access(Read(0x4));
        assert_eq!(event.evicted, Some(0));
        assert!(event.writeback);

        // a clean victim is not
        let event = sim.access(Read(0x8));
        assert_eq!(event.evicted, Some(1));
        assert!(!event.writeback);

        assert_eq!(sim.stats().dirty_writebacks, 1);
        assert_eq!(sim.table().lookup(0), None);
        assert_eq!(sim.table().lookup(2), Some(0));
    }

    #[test]
    fn free_frames_are_used_before_the_policy() {
        let mut sim = sim(PolicyKind::Random, TableKind::Dense, 4);
        let stats = sim.run([Read(0x0), Read(0x4), Read(0x8), Read(0xc), Read(0x0)]);
        assert_eq!(stats.page_faults, 4);
        assert_eq!(sim.victim_selections(), 0);
        for i in 0..4 {
            assert_eq!(sim.frames().get(i).resident_page, Some(i as u32));
        }
    }

    #[test]
    fn clock_spares_a_recently_used_page() {
        let mut sim = sim(PolicyKind::Clock, TableKind::Dense, 3);
        sim.run([Read(0x0), Read(0x4), Read(0x8)]);
        // page 3 sweeps every bit clear and takes frame 0
        assert_eq!(sim.access(Read(0xc)).frame, 0);
        // page 1 is used again, so page 4 passes over frame 1 and takes frame 2
        sim.access(Read(0x4));
        let event = sim.access(Read(0x10));
        assert_eq!(event.frame, 2);
        assert_eq!(event.evicted, Some(2));
        assert_eq!(sim.table().lookup(1), Some(1));
        assert!(!sim.frames().get(1).referenced);
    }

    #[test]
    fn hierarchical_events_carry_level_indices() {
        let config = SimulationConfig::new(4096, 4 * 4096, PolicyKind::Fifo, TableKind::TwoLevel).unwrap();
        let mut sim = Simulator::new(config).unwrap();
        let event = sim.access(Read(0x1234_5678));
        assert_eq!(event.addr.page_number, 0x12345);
        assert_eq!(event.addr.indices(), &[0x48, 0x345]);
        assert!(event.to_string().starts_with("12345678 R  12345"));
    }

    #[test]
    fn inverted_tags_track_the_frame_store() {
        let mut sim = sim(PolicyKind::Lru, TableKind::Inverted, 2);
        sim.run([Read(0x0), Write(0x4), Read(0x0), Read(0x8), Read(0xc)]);
        for (idx, frame) in sim.frames().iter().enumerate() {
            let page = frame.resident_page.unwrap();
            assert_eq!(sim.table().lookup(page), Some(idx));
        }
        assert_eq!(sim.table().lookup(1), None);
        assert_eq!(sim.stats().dirty_writebacks, 1);
    }

    #[test]
    fn fault_rate_of_an_empty_run_is_zero() {
        let mut sim = sim(PolicyKind::Fifo, TableKind::Inverted, 2);
        let stats = sim.run(std::iter::empty());
        assert_eq!(stats, SimulationStats::default());
        assert_eq!(stats.fault_rate(), 0.0);
    }
}
