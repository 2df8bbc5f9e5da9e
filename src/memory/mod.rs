//! Physical memory model: the frame store, the page table variants that map pages onto
//! frames, and the policies that choose which frame gives way on a fault.

pub mod frame;
pub mod page_table;
pub mod policy;

/// Virtual page number, the address with its offset bits shifted out
pub type PageNumber = u32;

/// Slot in the frame store
pub type FrameIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Hit,
    Miss,
}

impl Query {
    pub fn as_str(&self) -> &'static str {
        match self {
            Query::Hit => "hit",
            Query::Miss => "miss",
        }
    }
}
