use super::Footprint;
use crate::memory::{FrameIndex, PageNumber};

/// One entry per physical frame, tagged with the resident page.
///
/// There is no forward index: a lookup scans every frame's tag, so its cost grows
/// with physical memory rather than with the virtual address space.
///
/// `tags[i]` mirrors `FrameStore` frame `i`'s `resident_page`; the engine keeps the
/// two in step on every install and invalidate.
#[derive(Debug)]
pub struct InvertedTable {
    tags: Vec<Option<PageNumber>>,
}

impl InvertedTable {
    pub fn new(frame_count: usize) -> Self {
        InvertedTable { tags: vec![None; frame_count] }
    }

    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        self.tags.iter().position(|tag| *tag == Some(page))
    }

    /// Retags `frame` as holding `page`
    pub fn install(&mut self, page: PageNumber, frame: FrameIndex) {
        self.tags[frame] = Some(page);
    }

    pub fn invalidate(&mut self, page: PageNumber) {
        if let Some(frame) = self.lookup(page) {
            self.tags[frame] = None;
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::from_entries(self.tags.len() as u64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn retagging_a_frame_drops_the_old_page() {
        let mut table = InvertedTable::new(2);
        table.install(5, 0);
        table.install(6, 0);
        assert_eq!(table.lookup(5), None);
        assert_eq!(table.lookup(6), Some(0));
        assert_eq!(table.lookup(0), None);
    }
}
