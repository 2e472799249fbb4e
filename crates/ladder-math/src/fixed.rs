use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};

/// Bit layout of a fixed-point value: `total` bits overall, of which
/// `integer` (sign included) sit left of the binary point.
///
/// Two string notations are accepted: "total/integer" (optionally
/// parenthesized) and "integer.fraction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precision {
    total: u32,
    integer: u32,
}

/// Widest layout a caller may request. Arithmetic results may carry more
/// integer bits internally, but never more fraction bits.
pub const MAX_TOTAL_BITS: u32 = 32;

impl Precision {
    pub fn new(total: u32, integer: u32) -> Result<Self> {
        if total == 0 || total > MAX_TOTAL_BITS {
            return Err(MathError::Precision(format!(
                "total bit length must be between 1 and {MAX_TOTAL_BITS}, got {total}"
            )));
        }
        if integer > total {
            return Err(MathError::Precision(format!(
                "integer bit length {integer} exceeds total bit length {total}"
            )));
        }
        Ok(Precision { total, integer })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn integer(&self) -> u32 {
        self.integer
    }

    pub fn fraction(&self) -> u32 {
        self.total - self.integer
    }

    /// Smallest layout that can hold either operand exactly: the wider
    /// integer part joined with the wider fraction part.
    pub fn align(a: Precision, b: Precision) -> Precision {
        let integer = a.integer.max(b.integer);
        let fraction = a.fraction().max(b.fraction());
        Precision {
            total: integer + fraction,
            integer,
        }
    }

    fn raw(total: u32, integer: u32) -> Precision {
        Precision { total, integer }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}/{})", self.total, self.integer)
    }
}

impl FromStr for Precision {
    type Err = MathError;

    fn from_str(text: &str) -> Result<Self> {
        let trimmed = text
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim();
        let (first, second, slash) = if let Some((a, b)) = trimmed.split_once('/') {
            (a, b, true)
        } else if let Some((a, b)) = trimmed.split_once('.') {
            (a, b, false)
        } else {
            return Err(MathError::Precision(format!(
                "unrecognized precision notation '{text}'"
            )));
        };
        let first: u32 = first.trim().parse().map_err(|_| {
            MathError::Precision(format!("unrecognized precision notation '{text}'"))
        })?;
        let second: u32 = second.trim().parse().map_err(|_| {
            MathError::Precision(format!("unrecognized precision notation '{text}'"))
        })?;
        if slash {
            // total/integer
            Precision::new(first, second)
        } else {
            // integer.fraction
            Precision::new(first + second, first)
        }
    }
}

/// Two's-complement fixed-point number: an integer mantissa scaled by
/// 2^-fraction. Arithmetic is exact; the fraction length is capped at
/// `MAX_TOTAL_BITS` and mantissas are kept within 62 bits, shedding
/// fraction bits (with rounding) before saturating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixPoint {
    mantissa: i128,
    precision: Precision,
}

const MANTISSA_LIMIT: i128 = 1i128 << 62;

impl FixPoint {
    /// Round `value` to the nearest representable number at the given
    /// layout, saturating at the layout's range.
    pub fn quantize(value: f64, precision: Precision) -> Result<FixPoint> {
        if !value.is_finite() {
            return Err(MathError::Precision(format!(
                "cannot quantize non-finite value {value}"
            )));
        }
        let scale = (1u64 << precision.fraction()) as f64;
        let max = (1i128 << (precision.total() - 1)) - 1;
        let min = -(1i128 << (precision.total() - 1));
        let mantissa = ((value * scale).round() as i128).clamp(min, max);
        Ok(FixPoint {
            mantissa,
            precision,
        })
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn double_value(&self) -> f64 {
        self.mantissa as f64 / (1u64 << self.precision.fraction()) as f64
    }

    fn aligned_mantissa(&self, target: Precision) -> i128 {
        self.mantissa << (target.fraction() - self.precision.fraction())
    }

    pub fn add(&self, other: &FixPoint) -> FixPoint {
        let common = Precision::align(self.precision, other.precision);
        let sum = self.aligned_mantissa(common) + other.aligned_mantissa(common);
        FixPoint::build(sum, common.fraction(), common.integer())
    }

    pub fn subtract(&self, other: &FixPoint) -> FixPoint {
        let common = Precision::align(self.precision, other.precision);
        let difference = self.aligned_mantissa(common) - other.aligned_mantissa(common);
        FixPoint::build(difference, common.fraction(), common.integer())
    }

    /// Exact product; the result carries the summed integer and fraction
    /// lengths of the operands (fraction capped, see above).
    pub fn multiply(&self, other: &FixPoint) -> FixPoint {
        let product = self.mantissa * other.mantissa;
        let fraction = self.precision.fraction() + other.precision.fraction();
        let integer = self.precision.integer() + other.precision.integer();
        FixPoint::build(product, fraction, integer)
    }

    /// Rounded quotient at the aligned layout of the two operands.
    pub fn divide(&self, other: &FixPoint) -> Result<FixPoint> {
        if other.mantissa == 0 {
            return Err(MathError::DivisionByZero);
        }
        let common = Precision::align(self.precision, other.precision);
        // a/b at fraction f is round(ma * 2^(f + fb - fa) / mb).
        let shift = common.fraction() + other.precision.fraction() - self.precision.fraction();
        let quotient = div_rounded(self.mantissa << shift, other.mantissa);
        Ok(FixPoint::build(
            quotient,
            common.fraction(),
            common.integer(),
        ))
    }

    pub fn negate(&self) -> FixPoint {
        FixPoint {
            mantissa: -self.mantissa,
            precision: self.precision,
        }
    }

    pub fn abs(&self) -> FixPoint {
        FixPoint {
            mantissa: self.mantissa.abs(),
            precision: self.precision,
        }
    }

    /// Mathematical equality at the aligned layout; layouts themselves may
    /// differ.
    pub fn value_eq(&self, other: &FixPoint) -> bool {
        let common = Precision::align(self.precision, other.precision);
        self.aligned_mantissa(common) == other.aligned_mantissa(common)
    }

    fn build(mantissa: i128, fraction: u32, integer: u32) -> FixPoint {
        let (mantissa, fraction) = clamp_mantissa(mantissa, fraction);
        FixPoint {
            mantissa,
            precision: Precision::raw(integer + fraction, integer),
        }
    }
}

impl fmt::Display for FixPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.double_value())
    }
}

/// Rounding division, half away from zero.
fn div_rounded(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder == 0 {
        return quotient;
    }
    if remainder.unsigned_abs() * 2 >= denominator.unsigned_abs() {
        if (numerator < 0) ^ (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

/// Shed excess fraction bits (rounding) and saturate astronomically large
/// mantissas so every stored value stays well inside i128 headroom.
fn clamp_mantissa(mut mantissa: i128, mut fraction: u32) -> (i128, u32) {
    if fraction > MAX_TOTAL_BITS {
        let shed = fraction - MAX_TOTAL_BITS;
        mantissa = div_rounded(mantissa, 1i128 << shed);
        fraction = MAX_TOTAL_BITS;
    }
    while mantissa.unsigned_abs() >= MANTISSA_LIMIT as u128 && fraction > 0 {
        mantissa = div_rounded(mantissa, 2);
        fraction -= 1;
    }
    mantissa = mantissa.clamp(-MANTISSA_LIMIT, MANTISSA_LIMIT - 1);
    (mantissa, fraction)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fix(value: f64, total: u32, integer: u32) -> FixPoint {
        FixPoint::quantize(value, Precision::new(total, integer).unwrap()).unwrap()
    }

    #[test]
    fn precision_parses_both_notations() {
        assert_eq!("16/4".parse::<Precision>().unwrap(), Precision::new(16, 4).unwrap());
        assert_eq!("(16/4)".parse::<Precision>().unwrap(), Precision::new(16, 4).unwrap());
        // integer.fraction
        assert_eq!("4.12".parse::<Precision>().unwrap(), Precision::new(16, 4).unwrap());
        assert!("sixteen/4".parse::<Precision>().is_err());
        assert!(Precision::new(0, 0).is_err());
        assert!(Precision::new(8, 9).is_err());
    }

    #[test]
    fn quantize_rounds_and_saturates() {
        let q = fix(5.34, 10, 4);
        // 5.34 * 64 = 341.76, rounds to 342 -> 5.34375
        assert_eq!(q.mantissa(), 342);
        assert_eq!(q.double_value(), 5.34375);

        // 2 integer bits (sign included) hold values below 2.0 only.
        let saturated = fix(100.0, 8, 2);
        assert_eq!(saturated.double_value(), (127.0) / 64.0);
    }

    #[test]
    fn add_aligns_the_binary_point() {
        let a = fix(1.5, 8, 4);
        let b = fix(0.25, 10, 2);
        let sum = a.add(&b);
        assert_eq!(sum.double_value(), 1.75);
        assert_eq!(sum.precision().integer(), 4);
        assert_eq!(sum.precision().fraction(), 8);
    }

    #[test]
    fn multiply_grows_precision() {
        let a = fix(1.5, 10, 2);
        let product = a.multiply(&a);
        assert_eq!(product.double_value(), 2.25);
        assert_eq!(product.precision().integer(), 4);
        assert_eq!(product.precision().fraction(), 16);
    }

    #[test]
    fn divide_rounds_at_the_aligned_layout() {
        let a = fix(1.0, 10, 2);
        let b = fix(3.0, 10, 4);
        let quotient = a.divide(&b).unwrap();
        // 1/3 at 8 fraction bits rounds to 85/256.
        assert_eq!(quotient.mantissa(), 85);
        assert!(b.divide(&fix(0.0, 10, 4)).is_err());
    }

    #[test]
    fn value_equality_ignores_layout() {
        assert!(fix(1.5, 8, 4).value_eq(&fix(1.5, 16, 8)));
        assert!(!fix(1.5, 8, 4).value_eq(&fix(1.25, 8, 4)));
    }
}
