use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An input event to the memory simulation
///
/// TraceEvents are explicitly either TraceEvent::Read or TraceEvent::Write. The inner
/// address is always a 32-bit virtual address.
pub enum TraceEvent {
    Read(u32),
    Write(u32),
}

impl TraceEvent {
    pub fn addr(&self) -> u32 {
        match *self {
            TraceEvent::Read(a) | TraceEvent::Write(a) => a,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, TraceEvent::Write(_))
    }

    /// Parses one `<hex address> <R|W>` record. Fields past the access type are ignored.
    fn parse(line: &str) -> Option<TraceEvent> {
        let mut fields = line.split_whitespace();
        let addr_str = fields.next()?;
        let access_str = fields.next()?;

        let addr_str = addr_str
            .strip_prefix("0x")
            .or_else(|| addr_str.strip_prefix("0X"))
            .unwrap_or(addr_str);
        let addr = u32::from_str_radix(addr_str, 16).ok()?;

        let mut access = access_str.chars();
        let access_type = access.next()?;
        if access.next().is_some() {
            return None;
        }

        match access_type {
            'R' | 'r' => Some(TraceEvent::Read(addr)),
            'W' | 'w' => Some(TraceEvent::Write(addr)),
            _ => None,
        }
    }
}

/// Reads a trace line by line, yielding a TraceEvent for every non-blank line.
///
/// Malformed lines are reported with their 1-based line number rather than skipped.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader { lines: reader.lines(), line_no: 0 }
    }
}

impl TraceReader<BufReader<File>> {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(TraceReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(TraceEvent::parse(trimmed).ok_or_else(|| SimError::MalformedTrace {
                line: self.line_no,
                content: trimmed.to_owned(),
            }));
        }
    }
}

/// Reads a whole trace up front, so a bad line stops the run before it starts
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    TraceReader::new(reader).collect()
}

pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEvent>> {
    TraceReader::from_file(path)?.collect()
}
