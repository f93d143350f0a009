//! Construction-time and run-time error types.

use thiserror::Error;

use crate::cordic::MAX_ITERATIONS;
use crate::edge::PortKind;
use crate::fix::MAX_WIDTH;

/// Errors detected while validating parameters or wiring the grid.
///
/// Every variant is fatal at construction time; a built network never raises
/// structural errors while running.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid matrix dimensions {rows}x{cols}: need rows >= cols >= 1")]
    Dimensions { rows: usize, cols: usize },

    #[error("fixed-point format Q{int_bits}.{frac_bits} needs 1 integer and 1 fractional bit and at most {MAX_WIDTH} bits total")]
    Format { int_bits: u32, frac_bits: u32 },

    #[error("CORDIC iteration count {0} out of range 1..={MAX_ITERATIONS}")]
    Iterations(usize),

    #[error("per-edge fifo depth must be at least 1")]
    FifoDepth,

    #[error("edge {edge} carries {found:?} tokens but the port expects {expected:?}")]
    PortKind { edge: usize, expected: PortKind, found: PortKind },
}

/// Errors raised while the network is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// No cell could fire before all joiners delivered their rows. This means
    /// an edge capacity was sized below its worst-case in-flight token count,
    /// which the grid builder is supposed to rule out by construction.
    #[error("network stalled after {after_firings} firings with {delivered}/{expected} result rows delivered")]
    Stalled {
        /// Firings completed before the stall.
        after_firings: u64,
        /// Result rows delivered before the stall.
        delivered: usize,
        /// Result rows the run was expected to deliver.
        expected: usize,
    },
}
