//! Error types for the simulator.
//!
//! Every error is raised before the first access is simulated. The access loop itself is total.

use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// Page size, memory size or level layout cannot describe a valid run
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown replacement policy '{0}' (expected one of: fifo, lru, random, 2a)")]
    UnknownPolicy(String),

    #[error("Unknown page table variant '{0}' (expected one of: dense, doisNiveis, tresNiveis, inverted)")]
    UnknownTableVariant(String),

    /// Trace line that is neither blank nor `<hex address> <R|W>`
    #[error("Malformed trace line {line}: '{content}'")]
    MalformedTrace { line: usize, content: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
