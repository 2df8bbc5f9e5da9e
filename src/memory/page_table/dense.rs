use std::collections::HashMap;

use super::{Footprint, PageTableEntry};
use crate::memory::{FrameIndex, PageNumber};

/// Largest flat table that is actually backed by a vector. 2 KB pages need exactly this many.
pub const MAX_FLAT_ENTRIES: u64 = 1 << 21;

#[derive(Debug)]
enum Entries {
    /// Grows as far as the highest page installed
    Flat(Vec<PageTableEntry>),
    /// Page sizes below 2 KB would need a flat vector of up to 2^32 entries
    Sparse(HashMap<PageNumber, PageTableEntry>),
}

/// Flat table indexed directly by page number.
///
/// Models one entry per virtual page, and the footprint is always charged for the
/// full table. Only pages that were installed are actually stored.
#[derive(Debug)]
pub struct DenseTable {
    entries: Entries,
    virtual_pages: u64,
}

impl DenseTable {
    pub fn new(virtual_pages: u64) -> Self {
        let entries = if virtual_pages <= MAX_FLAT_ENTRIES {
            Entries::Flat(Vec::new())
        } else {
            Entries::Sparse(HashMap::new())
        };
        DenseTable { entries, virtual_pages }
    }

    fn entry(&self, page: PageNumber) -> Option<&PageTableEntry> {
        match &self.entries {
            Entries::Flat(v) => v.get(page as usize),
            Entries::Sparse(m) => m.get(&page),
        }
    }

    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        self.entry(page).and_then(PageTableEntry::translation)
    }

    pub fn install(&mut self, page: PageNumber, frame: FrameIndex) {
        debug_assert!((page as u64) < self.virtual_pages);
        let entry = PageTableEntry { frame: Some(frame), valid: true };
        match &mut self.entries {
            Entries::Flat(v) => {
                let idx = page as usize;
                if idx >= v.len() {
                    v.resize(idx + 1, PageTableEntry::default());
                }
                v[idx] = entry;
            }
            Entries::Sparse(m) => {
                m.insert(page, entry);
            }
        }
    }

    pub fn invalidate(&mut self, page: PageNumber) {
        let entry = match &mut self.entries {
            Entries::Flat(v) => v.get_mut(page as usize),
            Entries::Sparse(m) => m.get_mut(&page),
        };
        if let Some(entry) = entry {
            entry.valid = false;
        }
    }

    /// Entries actually held in memory
    pub fn stored(&self) -> usize {
        match &self.entries {
            Entries::Flat(v) => v.len(),
            Entries::Sparse(m) => m.len(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::from_entries(self.virtual_pages)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tiny_pages_at_the_top_of_memory() {
        // 4-byte pages: 2^30 virtual pages
        let mut table = DenseTable::new(1 << 30);
        table.install(0x3fff_ffff, 1);
        assert_eq!(table.lookup(0x3fff_ffff), Some(1));
        assert_eq!(table.stored(), 1);
        assert_eq!(table.footprint().entries, 1 << 30);

        table.invalidate(0x3fff_ffff);
        assert_eq!(table.lookup(0x3fff_ffff), None);
    }

    #[test]
    fn real_page_sizes_stay_flat() {
        // 2 KB pages
        let mut table = DenseTable::new(MAX_FLAT_ENTRIES);
        table.install(5, 0);
        assert_eq!(table.stored(), 6);
        assert_eq!(table.lookup(5), Some(0));
        assert_eq!(table.lookup(4), None);
    }
}
