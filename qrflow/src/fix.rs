//! Fixed-point Qm.n arithmetic on scaled integers.
//!
//! A value is a signed integer `raw` interpreted as `raw / 2^n`, stored in
//! `m + n` bits where `m` counts the integer bits including sign. Widening
//! operations run in a double-width intermediate and saturate back to the
//! `m + n`-bit range on the way out; nothing silently wraps.

use static_assertions::const_assert;

/// Maximum total width (`m + n`) of a fixed-point format, in bits.
///
/// Raw values live in `i64`; one bit of headroom keeps `1 << width` well
/// defined during range computation.
pub const MAX_WIDTH: u32 = 63;

// Intermediates must hold a full product of two raw values plus the shift.
const_assert!(i128::BITS >= 2 * i64::BITS);

/// A raw fixed-point value.
///
/// The format that gives it meaning is carried separately (see [`FixFormat`]);
/// cells hold the format once and pass plain values along the mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fix(i64);

impl Fix {
    /// Zero in any format.
    pub const ZERO: Self = Fix(0);

    /// Creates a value from its raw integer representation.
    pub const fn from_raw(raw: i64) -> Self { Fix(raw) }

    /// Returns the raw integer representation.
    pub const fn raw(self) -> i64 { self.0 }

    /// Arithmetic shift right, the CORDIC micro-rotation primitive.
    pub const fn sar(self, shift: u32) -> Self { Fix(self.0 >> shift) }

    /// Absolute raw magnitude, used for near-zero guards.
    pub const fn abs_raw(self) -> i64 { self.0.abs() }
}

/// A Qm.n fixed-point format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixFormat {
    /// Integer bits, including the sign bit.
    pub int_bits: u32,
    /// Fractional bits.
    pub frac_bits: u32,
}

impl FixFormat {
    /// Creates a format. Width constraints are enforced by
    /// [`QrdConfig::validate`](crate::config::QrdConfig::validate).
    pub const fn new(int_bits: u32, frac_bits: u32) -> Self { FixFormat { int_bits, frac_bits } }

    /// Total width in bits.
    pub const fn width(self) -> u32 { self.int_bits + self.frac_bits }

    /// Largest representable raw value.
    pub const fn max_raw(self) -> i64 { (1i64 << (self.width() - 1)) - 1 }

    /// Smallest representable raw value.
    pub const fn min_raw(self) -> i64 { -(1i64 << (self.width() - 1)) }

    /// The constant 1.0.
    pub const fn one(self) -> Fix { Fix(1i64 << self.frac_bits) }

    /// Truncates a double-width intermediate back into the format, saturating
    /// instead of wrapping when it does not fit.
    pub fn saturate(self, wide: i128) -> Fix {
        if wide > self.max_raw() as i128 {
            Fix(self.max_raw())
        } else if wide < self.min_raw() as i128 {
            Fix(self.min_raw())
        } else {
            Fix(wide as i64)
        }
    }

    /// Encodes a real value, truncating toward zero like the hardware constant
    /// tables do.
    pub fn encode(self, value: f64) -> Fix {
        self.saturate((value * (1i64 << self.frac_bits) as f64) as i128)
    }

    /// Decodes to a real value (`raw * 2^-n`). Output and debug only; the
    /// numeric core never round-trips through floating point.
    pub fn decode(self, value: Fix) -> f64 { value.0 as f64 / (1i64 << self.frac_bits) as f64 }

    /// Saturating addition.
    pub fn add(self, a: Fix, b: Fix) -> Fix { self.saturate(a.0 as i128 + b.0 as i128) }

    /// Saturating subtraction.
    pub fn sub(self, a: Fix, b: Fix) -> Fix { self.saturate(a.0 as i128 - b.0 as i128) }

    /// Fixed-point multiply: widen, multiply, arithmetic shift right by `n`,
    /// then truncate. The shift happens on the full double-width product;
    /// truncating first would discard the bits the shift needs.
    pub fn mul(self, a: Fix, b: Fix) -> Fix {
        self.saturate((a.0 as i128 * b.0 as i128) >> self.frac_bits)
    }

    /// Fixed-point divide: widen the dividend, shift left by `n` first, then
    /// integer-divide. A zero divisor saturates toward the dividend's sign;
    /// callers guard near-zero divisors with the identity rotation instead of
    /// reaching this path.
    pub fn div(self, a: Fix, b: Fix) -> Fix {
        if b.0 == 0 {
            if a.0 < 0 {
                Fix(self.min_raw())
            } else {
                Fix(self.max_raw())
            }
        } else {
            self.saturate(((a.0 as i128) << self.frac_bits) / b.0 as i128)
        }
    }
}
