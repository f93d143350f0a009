//! CORDIC rotation kernel: magnitudes and Givens rotations from shifts and
//! adds, with one gain-compensation multiply at the end.

use arrayvec::ArrayVec;
use static_assertions::const_assert;

use crate::fix::{Fix, FixFormat};

/// Upper bound on the CORDIC iteration count.
pub const MAX_ITERATIONS: usize = 48;

/// The CORDIC gain-compensation constant, `prod(cos(atan(2^-j)))`.
pub const GAIN: f64 = 0.607252956441381;

// Iteration shifts must stay within the raw i64 width.
const_assert!(MAX_ITERATIONS < 64);

/// The rotation-direction sequence recorded by one vectoring pass.
///
/// One bit per iteration: `true` means phi = -1, `false` means phi = +1. A
/// sequence is produced once per matrix element, forwarded by value along a
/// cell row, and never mutated. The identity sequence stands in for the
/// rotation of a near-zero input, where vectoring would be unstable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AngleSeq {
    dirs: ArrayVec<bool, MAX_ITERATIONS>,
    identity: bool,
}

impl AngleSeq {
    /// The sequence that rotates by nothing.
    pub fn identity() -> Self { AngleSeq { dirs: ArrayVec::new(), identity: true } }

    /// Whether this is the identity sequence.
    pub fn is_identity(&self) -> bool { self.identity }

    /// Number of recorded iterations (zero for the identity).
    pub fn len(&self) -> usize { self.dirs.len() }

    /// Whether no iterations are recorded.
    pub fn is_empty(&self) -> bool { self.dirs.is_empty() }
}

/// A CORDIC engine bound to a fixed-point format and iteration count.
///
/// The gain constant is encoded into the format once at construction so the
/// numeric core never touches floating point.
#[derive(Debug, Clone, Copy)]
pub struct Cordic {
    fmt: FixFormat,
    iterations: usize,
    gain: Fix,
}

impl Cordic {
    /// Creates an engine for the given format and iteration count.
    pub fn new(fmt: FixFormat, iterations: usize) -> Self {
        Cordic { fmt, iterations, gain: fmt.encode(GAIN) }
    }

    /// Vectoring mode: rotates `(x, y)` until `y` is driven toward zero.
    ///
    /// Returns the gain-corrected magnitude `k * x_i` (negative when the pass
    /// converges on the negative x axis) and the recorded direction sequence.
    /// The direction rule is `phi = -1` when `x` and `y` carry the same sign,
    /// `+1` otherwise; downstream bit-compatibility depends on exactly this
    /// convention.
    pub fn vector(&self, mut x: Fix, mut y: Fix) -> (Fix, AngleSeq) {
        let mut seq = AngleSeq::default();
        for j in 0..self.iterations {
            let negative = (x.raw() >= 0) == (y.raw() >= 0);
            let (dx, dy) = (y.sar(j as u32), x.sar(j as u32));
            if negative {
                x = self.fmt.add(x, dx);
                y = self.fmt.sub(y, dy);
            } else {
                x = self.fmt.sub(x, dx);
                y = self.fmt.add(y, dy);
            }
            seq.dirs.push(negative);
        }
        (self.fmt.mul(self.gain, x), seq)
    }

    /// Rotation mode: replays a recorded sequence on a fresh `(x, y)` pair.
    ///
    /// Returns the gain-corrected `(k * x_i, k * y_i)`. The identity sequence
    /// passes both operands through untouched.
    pub fn rotate(&self, mut x: Fix, mut y: Fix, seq: &AngleSeq) -> (Fix, Fix) {
        if seq.is_identity() {
            return (x, y);
        }
        for (j, &negative) in seq.dirs.iter().enumerate() {
            let (dx, dy) = (y.sar(j as u32), x.sar(j as u32));
            if negative {
                x = self.fmt.add(x, dx);
                y = self.fmt.sub(y, dy);
            } else {
                x = self.fmt.sub(x, dx);
                y = self.fmt.add(y, dy);
            }
        }
        (self.fmt.mul(self.gain, x), self.fmt.mul(self.gain, y))
    }
}
