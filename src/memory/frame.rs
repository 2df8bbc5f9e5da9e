use std::fmt;

use super::{FrameIndex, PageNumber};

/// One physical frame and the bookkeeping bits the replacement policies read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub resident_page: Option<PageNumber>,
    pub occupied: bool,
    pub dirty: bool,
    pub referenced: bool,
    /// Logical time of the last hit or load
    pub last_access: u64,
}

impl Frame {
    fn enfilthen(&mut self) {
        self.dirty = true;
    }
}

/// Fixed-size array of physical frames. A frame keeps its index for the whole run.
#[derive(Debug, Clone)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    pub fn new(frame_count: usize) -> Self {
        FrameStore { frames: vec![Frame::default(); frame_count] }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, idx: FrameIndex) -> &Frame {
        &self.frames[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Lowest-indexed unoccupied frame
    pub fn first_free(&self) -> Option<FrameIndex> {
        self.frames.iter().position(|frame| !frame.occupied)
    }

    pub fn is_full(&self) -> bool {
        self.first_free().is_none()
    }

    pub fn clear_reference(&mut self, idx: FrameIndex) {
        self.frames[idx].referenced = false;
    }

    /// Refreshes the bits of a frame that was just hit
    pub fn touch(&mut self, idx: FrameIndex, now: u64, is_write: bool) {
        let frame = &mut self.frames[idx];
        frame.referenced = true;
        frame.last_access = now;
        if is_write {
            frame.enfilthen();
        }
    }

    /// Loads `page` into frame `idx`, returning what the frame held before if it was occupied
    pub fn load(&mut self, idx: FrameIndex, page: PageNumber, now: u64, is_write: bool) -> Option<Frame> {
        let frame = &mut self.frames[idx];
        let previous = if frame.occupied { Some(*frame) } else { None };
        *frame = Frame {
            resident_page: Some(page),
            occupied: true,
            dirty: is_write,
            referenced: true,
            last_access: now,
        };
        previous
    }
}

impl fmt::Display for FrameStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame table:")?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(f, "| Frame  | Virtual page | Dirty | Referenced |")?;
        writeln!(f, "------------------------------------------------")?;
        for (idx, frame) in self.frames.iter().enumerate() {
            writeln!(f, "| {:<6} | {:<12} | {:<5} | {:<10} |",
                idx,
                frame.resident_page.map_or("-".to_string(), |p| format!("{:x}", p)),
                if frame.dirty { "yes" } else { "no" },
                if frame.referenced { "yes" } else { "no" })?;
        }
        write!(f, "------------------------------------------------")
    }
}
