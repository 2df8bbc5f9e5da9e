//! Page table organizations.
//!
//! Every variant answers the same three questions: where does a page live
//! (`lookup`), bind a page to a frame (`install`), and forget a binding
//! (`invalidate`). Only lookup cost and memory footprint differ between them,
//! never which accesses fault.

mod dense;
mod hierarchical;
mod inverted;

pub use dense::DenseTable;
pub use hierarchical::HierarchicalTable;
pub use inverted::InvertedTable;

use crate::{
    config::{SimulationConfig, TableKind},
    error::Result,
    utils::bit_ops,
};
use super::{FrameIndex, PageNumber};

/// Bytes charged per table entry when estimating footprint
pub const ENTRY_BYTES: u64 = 8;

/// Translation for one virtual page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: Option<FrameIndex>,
    pub valid: bool,
}

impl PageTableEntry {
    /// Frame this entry maps to, if the mapping is live
    pub fn translation(&self) -> Option<FrameIndex> {
        if self.valid { self.frame } else { None }
    }
}

/// Memory a page table would occupy in a real system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Footprint {
    pub entries: u64,
    pub bytes: u64,
}

impl Footprint {
    pub fn from_entries(entries: u64) -> Self {
        Footprint { entries, bytes: entries * ENTRY_BYTES }
    }

    pub fn kilobytes(&self) -> u64 {
        self.bytes / 1024
    }
}

#[derive(Debug)]
pub enum PageTable {
    Dense(DenseTable),
    TwoLevel(HierarchicalTable),
    ThreeLevel(HierarchicalTable),
    Inverted(InvertedTable),
}

impl PageTable {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let table = match config.table {
            TableKind::Dense => PageTable::Dense(DenseTable::new(config.virtual_pages())),
            TableKind::TwoLevel => {
                let widths = bit_ops::level_widths(config.offset_bits, 2)?;
                PageTable::TwoLevel(HierarchicalTable::new(config.offset_bits, widths)?)
            }
            TableKind::ThreeLevel => {
                let widths = bit_ops::level_widths(config.offset_bits, 3)?;
                PageTable::ThreeLevel(HierarchicalTable::new(config.offset_bits, widths)?)
            }
            TableKind::Inverted => PageTable::Inverted(InvertedTable::new(config.frame_count)),
        };
        Ok(table)
    }

    pub fn kind(&self) -> TableKind {
        match self {
            PageTable::Dense(_) => TableKind::Dense,
            PageTable::TwoLevel(_) => TableKind::TwoLevel,
            PageTable::ThreeLevel(_) => TableKind::ThreeLevel,
            PageTable::Inverted(_) => TableKind::Inverted,
        }
    }

    /// Bits per level for hierarchical variants, empty for flat ones
    pub fn level_widths(&self) -> &[u32] {
        match self {
            PageTable::TwoLevel(t) | PageTable::ThreeLevel(t) => t.widths(),
            PageTable::Dense(_) | PageTable::Inverted(_) => &[],
        }
    }

    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        match self {
            PageTable::Dense(t) => t.lookup(page),
            PageTable::TwoLevel(t) | PageTable::ThreeLevel(t) => t.lookup(page),
            PageTable::Inverted(t) => t.lookup(page),
        }
    }

    pub fn install(&mut self, page: PageNumber, frame: FrameIndex) {
        match self {
            PageTable::Dense(t) => t.install(page, frame),
            PageTable::TwoLevel(t) | PageTable::ThreeLevel(t) => t.install(page, frame),
            PageTable::Inverted(t) => t.install(page, frame),
        }
    }

    pub fn invalidate(&mut self, page: PageNumber) {
        match self {
            PageTable::Dense(t) => t.invalidate(page),
            PageTable::TwoLevel(t) | PageTable::ThreeLevel(t) => t.invalidate(page),
            PageTable::Inverted(t) => t.invalidate(page),
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            PageTable::Dense(t) => t.footprint(),
            PageTable::TwoLevel(t) | PageTable::ThreeLevel(t) => t.footprint(),
            PageTable::Inverted(t) => t.footprint(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::PolicyKind;

    fn table(kind: TableKind) -> PageTable {
        // 4 KB pages, 4 frames
        let config = SimulationConfig::new(4096, 4 * 4096, PolicyKind::Fifo, kind).unwrap();
        PageTable::new(&config).unwrap()
    }

    #[test]
    fn every_variant_honours_the_contract() {
        for kind in TableKind::ALL {
            let mut pt = table(kind);
            assert_eq!(pt.kind(), kind);
            assert_eq!(pt.lookup(0x12345), None, "{kind}");

            pt.install(0x12345, 2);
            pt.install(0xfffff, 3);
            assert_eq!(pt.lookup(0x12345), Some(2), "{kind}");
            assert_eq!(pt.lookup(0xfffff), Some(3), "{kind}");
            assert_eq!(pt.lookup(0x12346), None, "{kind}");

            pt.invalidate(0x12345);
            assert_eq!(pt.lookup(0x12345), None, "{kind}");
            pt.invalidate(0x12345);
            pt.invalidate(0x00042);
            assert_eq!(pt.lookup(0xfffff), Some(3), "{kind}");

            pt.install(0x12345, 1);
            assert_eq!(pt.lookup(0x12345), Some(1), "{kind}");
        }
    }

    #[test]
    fn level_widths_follow_variant() {
        assert!(table(TableKind::Dense).level_widths().is_empty());
        assert_eq!(table(TableKind::TwoLevel).level_widths(), &[10, 10]);
        assert_eq!(table(TableKind::ThreeLevel).level_widths(), &[8, 6, 6]);
        assert!(table(TableKind::Inverted).level_widths().is_empty());
    }

    #[test]
    fn footprints() {
        assert_eq!(table(TableKind::Dense).footprint(), Footprint::from_entries(1 << 20));
        assert_eq!(table(TableKind::Inverted).footprint().entries, 4);
        assert_eq!(table(TableKind::TwoLevel).footprint().entries, 1 << 10);

        let mut pt = table(TableKind::ThreeLevel);
        assert_eq!(pt.footprint().entries, 1 << 8);
        pt.install(0, 0);
        assert_eq!(pt.footprint().entries, (1 << 8) + (1 << 6) + (1 << 6));
        assert_eq!(pt.footprint().kilobytes(), 384 * 8 / 1024);
    }
}
