use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimError};
use crate::utils::{bit_ops, invalid};

const KB: u64 = 1024;
const MIN_PAGE_KB: u64 = 2;
const MAX_PAGE_KB: u64 = 64;
const MIN_MEMORY_KB: u64 = 128;
const MAX_MEMORY_KB: u64 = 16384;

/// Frame replacement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fifo,
    Lru,
    Random,
    /// Second chance, selected as `2a`
    Clock,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [PolicyKind::Fifo, PolicyKind::Lru, PolicyKind::Random, PolicyKind::Clock];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lru => "lru",
            PolicyKind::Random => "random",
            PolicyKind::Clock => "2a",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            "random" => Ok(PolicyKind::Random),
            "2a" | "clock" => Ok(PolicyKind::Clock),
            _ => Err(SimError::UnknownPolicy(s.to_owned())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page table organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Dense,
    TwoLevel,
    ThreeLevel,
    Inverted,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [TableKind::Dense, TableKind::TwoLevel, TableKind::ThreeLevel, TableKind::Inverted];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Dense => "dense",
            TableKind::TwoLevel => "doisNiveis",
            TableKind::ThreeLevel => "tresNiveis",
            TableKind::Inverted => "inverted",
        }
    }
}

impl FromStr for TableKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dense" => Ok(TableKind::Dense),
            "doisNiveis" | "two-level" => Ok(TableKind::TwoLevel),
            "tresNiveis" | "three-level" => Ok(TableKind::ThreeLevel),
            "inverted" => Ok(TableKind::Inverted),
            _ => Err(SimError::UnknownTableVariant(s.to_owned())),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one simulation run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub page_size: u64,
    pub memory_size: u64,
    pub frame_count: usize,
    pub offset_bits: u32,
    pub policy: PolicyKind,
    pub table: TableKind,
    /// Seed for the random policy. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Builds a config from byte sizes, checking only what the simulation itself needs
    pub fn new(page_size: u64, memory_size: u64, policy: PolicyKind, table: TableKind) -> Result<Self> {
        let offset_bits = bit_ops::offset_bits(page_size)?;
        let frame_count = memory_size / page_size;
        if frame_count == 0 {
            invalid!("{} bytes of memory hold no {}-byte frames", memory_size, page_size);
        }
        let frame_count = usize::try_from(frame_count)
            .map_err(|_| SimError::InvalidConfig(format!("{} frames do not fit in memory", frame_count)))?;

        Ok(SimulationConfig {
            page_size,
            memory_size,
            frame_count,
            offset_bits,
            policy,
            table,
            seed: None,
        })
    }

    /// Builds a config from KB sizes within the ranges accepted on the command line
    pub fn from_kb(page_kb: u64, memory_kb: u64, policy: PolicyKind, table: TableKind) -> Result<Self> {
        if !(MIN_PAGE_KB..=MAX_PAGE_KB).contains(&page_kb) {
            invalid!("page size {} KB is outside {} KB to {} KB", page_kb, MIN_PAGE_KB, MAX_PAGE_KB);
        }
        if !(MIN_MEMORY_KB..=MAX_MEMORY_KB).contains(&memory_kb) {
            invalid!("memory size {} KB is outside {} KB to {} KB", memory_kb, MIN_MEMORY_KB, MAX_MEMORY_KB);
        }
        Self::new(page_kb * KB, memory_kb * KB, policy, table)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of page number bits above the offset
    pub fn page_number_bits(&self) -> u32 {
        bit_ops::ADDRESS_BITS - self.offset_bits
    }

    /// Pages in the full virtual address space
    pub fn virtual_pages(&self) -> u64 {
        1u64 << self.page_number_bits()
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory size: {} KB", self.memory_size / KB)?;
        writeln!(f, "Page size: {} KB", self.page_size / KB)?;
        writeln!(f, "Replacement technique: {}", self.policy)?;
        writeln!(f, "Page table: {}", self.table)?;
        writeln!(f, "Number of physical frames is {}.", self.frame_count)?;
        write!(f, "Number of bits used for the page offset is {}.", self.offset_bits)
    }
}
