//! Build-time parameters of a QR decomposition network.

use crate::cordic::MAX_ITERATIONS;
use crate::error::BuildError;
use crate::fix::{Fix, FixFormat, MAX_WIDTH};

/// Magnitudes below this are treated as zero by the cells: vectoring a
/// near-zero vector is unstable, so the rotation degrades to the identity.
pub const NEAR_ZERO: f64 = 0.00005;

/// Step between successive generated test values.
pub const INCREMENT: f64 = 0.11;

/// All parameters of one network, fixed at construction.
///
/// Replaces the per-file constant blocks of a hardware description: nothing
/// here is process-wide, and changing a parameter means building a new
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrdConfig {
    /// Matrix row count M. Each cell fires M times per matrix.
    pub rows: usize,
    /// Matrix column count N. The triangular mesh has N rows.
    pub cols: usize,
    /// Fixed-point integer bits m, including sign.
    pub int_bits: u32,
    /// Fixed-point fractional bits n.
    pub frac_bits: u32,
    /// CORDIC iteration count. Beyond roughly `frac_bits` iterations the
    /// quantization floor dominates and extra iterations only add latency.
    pub iterations: usize,
    /// Base capacity of plain cell-to-cell edges. Source and row-internal
    /// edges are sized deeper than the row length on top of this.
    pub fifo_depth: usize,
    /// How many matrices the source streams before the network idles.
    pub num_matrices: usize,
}

impl Default for QrdConfig {
    fn default() -> Self {
        QrdConfig {
            rows: 4,
            cols: 4,
            int_bits: 3,
            frac_bits: 19,
            iterations: 16,
            fifo_depth: 4,
            num_matrices: 1,
        }
    }
}

impl QrdConfig {
    /// Checks every structural constraint. The grid builder refuses to wire
    /// anything before this passes.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.cols < 1 || self.rows < self.cols {
            return Err(BuildError::Dimensions { rows: self.rows, cols: self.cols });
        }
        if self.int_bits < 1 || self.frac_bits < 1 || self.int_bits + self.frac_bits > MAX_WIDTH {
            return Err(BuildError::Format { int_bits: self.int_bits, frac_bits: self.frac_bits });
        }
        if self.iterations < 1 || self.iterations > MAX_ITERATIONS {
            return Err(BuildError::Iterations(self.iterations));
        }
        if self.fifo_depth < 1 {
            return Err(BuildError::FifoDepth);
        }
        Ok(())
    }

    /// The Qm.n format in use.
    pub fn format(&self) -> FixFormat { FixFormat::new(self.int_bits, self.frac_bits) }

    /// The near-zero threshold encoded into the format.
    pub fn near_zero(&self) -> Fix { self.format().encode(NEAR_ZERO) }

    /// The generator increment encoded into the format.
    pub fn increment(&self) -> Fix { self.format().encode(INCREMENT) }

    /// Capacity of source-to-grid and row-internal edges: deeper than the full
    /// row length, so a new matrix's row never stalls behind values still
    /// propagating across the grid width.
    pub fn deep_capacity(&self) -> usize { self.cols + self.rows + self.fifo_depth }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(QrdConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let mut config = QrdConfig::default();
        config.cols = 0;
        assert!(matches!(config.validate(), Err(BuildError::Dimensions { .. })));

        let config = QrdConfig { rows: 2, cols: 3, ..QrdConfig::default() };
        assert!(matches!(config.validate(), Err(BuildError::Dimensions { .. })));
    }

    #[test]
    fn rejects_bad_format() {
        let config = QrdConfig { int_bits: 40, frac_bits: 40, ..QrdConfig::default() };
        assert!(matches!(config.validate(), Err(BuildError::Format { .. })));
        let config = QrdConfig { int_bits: 0, ..QrdConfig::default() };
        assert!(matches!(config.validate(), Err(BuildError::Format { .. })));
    }

    #[test]
    fn rejects_bad_iterations_and_depth() {
        let config = QrdConfig { iterations: 0, ..QrdConfig::default() };
        assert_eq!(config.validate(), Err(BuildError::Iterations(0)));
        let config = QrdConfig { iterations: MAX_ITERATIONS + 1, ..QrdConfig::default() };
        assert!(config.validate().is_err());
        let config = QrdConfig { fifo_depth: 0, ..QrdConfig::default() };
        assert_eq!(config.validate(), Err(BuildError::FifoDepth));
    }

    #[test]
    fn derived_constants_match_the_tables() {
        let config = QrdConfig::default();
        assert_eq!(config.near_zero().raw(), 26);
        assert_eq!(config.increment().raw(), 57671);
    }
}
