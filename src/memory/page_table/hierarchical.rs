use super::{Footprint, PageTableEntry};
use crate::{
    error::Result,
    memory::{FrameIndex, PageNumber},
    utils::{bit_ops, invalid},
};

type DirId = usize;
type LeafId = usize;

const ROOT: DirId = 0;

/// Multi-level page table whose lower levels are allocated on first install.
///
/// Directories and leaf tables live in two arenas and refer to each other by index.
/// A slot in the last directory level names a leaf; a slot in any other directory
/// names the next directory. Nothing is freed during a run.
#[derive(Debug)]
pub struct HierarchicalTable {
    widths: Vec<u32>,
    dirs: Vec<Vec<Option<usize>>>,
    leaves: Vec<Vec<PageTableEntry>>,
}

impl HierarchicalTable {
    pub fn new(offset_bits: u32, widths: Vec<u32>) -> Result<Self> {
        bit_ops::validate_widths(offset_bits, &widths)?;
        if widths.len() < 2 {
            invalid!("a hierarchical page table needs at least 2 levels, got {}", widths.len());
        }
        let root = vec![None; 1usize << widths[0]];
        Ok(HierarchicalTable { widths, dirs: vec![root], leaves: Vec::new() })
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    fn last_level(&self) -> usize {
        self.widths.len() - 1
    }

    /// Walks the directories without allocating. `None` if any level is missing.
    fn find_leaf(&self, indices: &[u32]) -> Option<LeafId> {
        let last = self.last_level();
        let mut dir = ROOT;
        for &index in &indices[..last - 1] {
            dir = self.dirs[dir][index as usize]?;
        }
        self.dirs[dir][indices[last - 1] as usize]
    }

    /// Walks the directories, allocating whatever is missing along the way
    fn find_or_alloc_leaf(&mut self, indices: &[u32]) -> LeafId {
        let last = self.last_level();
        let mut dir = ROOT;
        for level in 0..last - 1 {
            let slot = indices[level] as usize;
            dir = match self.dirs[dir][slot] {
                Some(next) => next,
                None => {
                    let next = self.dirs.len();
                    self.dirs.push(vec![None; 1usize << self.widths[level + 1]]);
                    self.dirs[dir][slot] = Some(next);
                    next
                }
            };
        }

        let slot = indices[last - 1] as usize;
        match self.dirs[dir][slot] {
            Some(leaf) => leaf,
            None => {
                let leaf = self.leaves.len();
                self.leaves.push(vec![PageTableEntry::default(); 1usize << self.widths[last]]);
                self.dirs[dir][slot] = Some(leaf);
                leaf
            }
        }
    }

    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        let indices = bit_ops::level_indices(page, &self.widths);
        let leaf = self.find_leaf(&indices)?;
        self.leaves[leaf][indices[self.last_level()] as usize].translation()
    }

    pub fn install(&mut self, page: PageNumber, frame: FrameIndex) {
        let indices = bit_ops::level_indices(page, &self.widths);
        let leaf = self.find_or_alloc_leaf(&indices);
        let slot = indices[self.last_level()] as usize;
        self.leaves[leaf][slot] = PageTableEntry { frame: Some(frame), valid: true };
    }

    pub fn invalidate(&mut self, page: PageNumber) {
        let indices = bit_ops::level_indices(page, &self.widths);
        if let Some(leaf) = self.find_leaf(&indices) {
            let slot = indices[self.last_level()] as usize;
            self.leaves[leaf][slot].valid = false;
        }
    }

    /// Directories and leaf tables allocated so far, root included
    pub fn allocated(&self) -> (usize, usize) {
        (self.dirs.len(), self.leaves.len())
    }

    pub fn footprint(&self) -> Footprint {
        let dir_entries: usize = self.dirs.iter().map(Vec::len).sum();
        let leaf_entries: usize = self.leaves.iter().map(Vec::len).sum();
        Footprint::from_entries((dir_entries + leaf_entries) as u64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_never_allocates() {
        let table = HierarchicalTable::new(12, vec![8, 6, 6]).unwrap();
        assert_eq!(table.lookup(0xabcde), None);
        assert_eq!(table.allocated(), (1, 0));
    }

    #[test]
    fn install_allocates_each_missing_level_once() {
        let mut table = HierarchicalTable::new(12, vec![8, 6, 6]).unwrap();
        table.install(0x00001, 0);
        assert_eq!(table.allocated(), (2, 1));

        // same second-level directory, same leaf
        table.install(0x00002, 1);
        assert_eq!(table.allocated(), (2, 1));

        // same top-level slot, new leaf
        table.install(0x00040, 2);
        assert_eq!(table.allocated(), (2, 2));

        // new top-level slot
        table.install(0xff000, 3);
        assert_eq!(table.allocated(), (3, 3));

        assert_eq!(table.lookup(0x00001), Some(0));
        assert_eq!(table.lookup(0x00002), Some(1));
        assert_eq!(table.lookup(0x00040), Some(2));
        assert_eq!(table.lookup(0xff000), Some(3));
    }

    #[test]
    fn two_levels_have_no_middle_directory() {
        let mut table = HierarchicalTable::new(11, vec![11, 10]).unwrap();
        table.install(0x1fffff, 7);
        assert_eq!(table.allocated(), (1, 1));
        assert_eq!(table.lookup(0x1fffff), Some(7));
        assert_eq!(table.footprint().entries, (1 << 11) + (1 << 10));
    }

    #[test]
    fn invalidate_missing_page_is_a_no_op() {
        let mut table = HierarchicalTable::new(12, vec![10, 10]).unwrap();
        table.invalidate(0x12345);
        assert_eq!(table.allocated(), (1, 0));
    }

    #[test]
    fn invalidate_clears_only_that_page() {
        let mut table = HierarchicalTable::new(12, vec![8, 6, 6]).unwrap();
        table.install(0x00001, 0);
        table.install(0x00002, 1);
        table.invalidate(0x00001);
        assert_eq!(table.lookup(0x00001), None);
        assert_eq!(table.lookup(0x00002), Some(1));
        assert_eq!(table.allocated(), (2, 1));
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(HierarchicalTable::new(12, vec![10, 9]).is_err());
        assert!(HierarchicalTable::new(12, vec![20]).is_err());
    }
}
