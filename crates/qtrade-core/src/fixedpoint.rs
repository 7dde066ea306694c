//! Fixed-point money type.
//!
//! All money amounts in this system use a 1e-6 (micros) fixed-point
//! representation stored as `i64`. Using raw `i64` for money is error-prone:
//! it allows accidental arithmetic with unrelated integers (quantities, IDs,
//! prices at different scales) without any compile-time signal.
//!
//! `Micros` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Micros` with unrelated `i64` values in arithmetic.
//!
//! 1 unit of quoted currency = 1_000_000 Micros. Non-monetary quantities
//! (share counts, window counters) remain plain `i64` and are never
//! implicitly convertible.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Scale factor: 1 currency unit = 1_000_000 Micros.
pub const MICROS_SCALE: i64 = 1_000_000;

/// A fixed-point monetary (or share-quantity) amount at 1e-6 scale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);
    pub const MIN: Micros = Micros(i64::MIN);

    /// Construct a `Micros` from a raw `i64` already at 1e-6 scale.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Construct from a whole integer amount (e.g. `Micros::from_units(100)` = $100).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Micros(units * MICROS_SCALE)
    }

    /// Extract the underlying raw `i64`.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    pub fn abs(self) -> Micros {
        Micros(self.0.saturating_abs())
    }

    #[inline]
    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn min(self, rhs: Micros) -> Micros {
        if self.0 <= rhs.0 {
            self
        } else {
            rhs
        }
    }

    #[inline]
    pub fn max(self, rhs: Micros) -> Micros {
        if self.0 >= rhs.0 {
            self
        } else {
            rhs
        }
    }

    /// Multiply a per-unit price by an integer share quantity.
    ///
    /// Uses `i128` internally so the multiply itself cannot overflow for any
    /// representable `Micros` and `i64` quantity; the result is clamped back
    /// to `i64` range. Callers working with quantities that can realistically
    /// overflow after clamping (share counts in the billions at triple-digit
    /// prices) are outside this system's intended scale.
    #[inline]
    pub fn mul_qty(self, qty: i64) -> Micros {
        let product = (self.0 as i128) * (qty as i128);
        Micros(clamp_i128_to_i64(product))
    }

    /// Multiply by an integer multiplier (contract size, e.g. futures).
    #[inline]
    pub fn mul_multiplier(self, multiplier: i64) -> Micros {
        self.mul_qty(multiplier)
    }

    /// Multiply two decimal (1e-6-scaled) amounts together, e.g. a price by a
    /// decimal share quantity, rescaling the product back down to 1e-6 scale.
    ///
    /// `mul_qty` multiplies by a *plain* integer (a share count or
    /// multiplier that is not itself 1e-6 scaled); `mul_amount` is for the
    /// case where both operands are [`Micros`] values.
    #[inline]
    pub fn mul_amount(self, rhs: Micros) -> Micros {
        let product = (self.0 as i128) * (rhs.0 as i128) / (MICROS_SCALE as i128);
        Micros(clamp_i128_to_i64(product))
    }

    /// Divide by a strictly-positive integer divisor, rounding toward zero.
    #[inline]
    pub fn div_int(self, divisor: i64) -> Micros {
        debug_assert!(divisor != 0, "Micros::div_int divisor must be nonzero");
        Micros(self.0 / divisor)
    }

    /// Weighted average of two amounts, `(self*w_self + rhs*w_rhs) / (w_self+w_rhs)`.
    ///
    /// Used for weighted-average cost-basis recomputation. Returns `self` if
    /// both weights are zero.
    pub fn weighted_average(self, w_self: i64, rhs: Micros, w_rhs: i64) -> Micros {
        let total_weight = w_self + w_rhs;
        if total_weight == 0 {
            return self;
        }
        let numerator = (self.0 as i128) * (w_self as i128) + (rhs.0 as i128) * (w_rhs as i128);
        Micros(clamp_i128_to_i64(numerator / (total_weight as i128)))
    }

    /// Weighted average of two *decimal* amounts using decimal weights, e.g.
    /// cost-basis recomputation where both the cost and the quantity being
    /// weighted are fractional-share-capable [`Micros`] values:
    /// `(self*w_self + rhs*w_rhs) / (w_self+w_rhs)`.
    ///
    /// Unlike [`Micros::weighted_average`] (whose weights are plain integer
    /// counts), both weights here are themselves 1e-6-scaled quantities; the
    /// division naturally cancels one scale factor so no explicit rescale is
    /// needed. Returns `self` if both weights are zero.
    pub fn weighted_average_micros(self, w_self: Micros, rhs: Micros, w_rhs: Micros) -> Micros {
        let total_weight = w_self.0 as i128 + w_rhs.0 as i128;
        if total_weight == 0 {
            return self;
        }
        let numerator = (self.0 as i128) * (w_self.0 as i128) + (rhs.0 as i128) * (w_rhs.0 as i128);
        Micros(clamp_i128_to_i64(numerator / total_weight))
    }

    /// Fraction of this amount: `self * numerator / denominator` using i128
    /// intermediate precision. `denominator` must be positive.
    pub fn mul_frac(self, numerator: i64, denominator: i64) -> Micros {
        debug_assert!(denominator > 0, "mul_frac denominator must be positive");
        let product = (self.0 as i128) * (numerator as i128) / (denominator as i128);
        Micros(clamp_i128_to_i64(product))
    }

    /// Ratio of two amounts as an `f64`. Only used at statistics/reporting
    /// boundaries — never re-enters ledger arithmetic.
    pub fn ratio(self, rhs: Micros) -> f64 {
        if rhs.0 == 0 {
            return 0.0;
        }
        self.0 as f64 / rhs.0 as f64
    }

    /// Convert to `f64` at reporting/statistics boundaries only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MICROS_SCALE as f64
    }

    /// Convert from `f64`, rounding to the nearest micro. Only used at
    /// ingestion boundaries for externally-sourced prices (e.g. broker
    /// slippage bps math); never for accumulating ledger state.
    pub fn from_f64(value: f64) -> Self {
        Micros((value * MICROS_SCALE as f64).round() as i64)
    }
}

fn clamp_i128_to_i64(x: i128) -> i64 {
    if x > i64::MAX as i128 {
        i64::MAX
    } else if x < i64::MIN as i128 {
        i64::MIN
    } else {
        x as i64
    }
}

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Micros {
    #[inline]
    fn sub_assign(&mut self, rhs: Micros) {
        self.0 -= rhs.0;
    }
}

/// `Micros * i64` scales the raw value directly (e.g. a per-share Micros
/// price times a plain signed quantity where overflow is the caller's
/// concern). Prefer `mul_qty` when overflow safety matters.
impl Mul<i64> for Micros {
    type Output = Micros;
    #[inline]
    fn mul(self, rhs: i64) -> Micros {
        Micros(self.0 * rhs)
    }
}

impl std::fmt::Display for Micros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.0 / MICROS_SCALE;
        let frac = (self.0 % MICROS_SCALE).abs();
        if self.0 < 0 && dollars == 0 {
            write!(f, "-{dollars}.{frac:06}")
        } else {
            write!(f, "{dollars}.{frac:06}")
        }
    }
}

impl serde::Serialize for Micros {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Decimals are serialized as strings end-to-end (spec: "all state
        // fields are serialized as strings for decimals").
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Micros {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<i64>().map(Micros).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_additive_identity() {
        let a = Micros::from_units(42);
        assert_eq!(a + Micros::ZERO, a);
        assert_eq!(Micros::ZERO + a, a);
    }

    #[test]
    fn add_and_sub_roundtrip() {
        let a = Micros::from_units(100);
        let b = Micros::from_units(25);
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn neg_produces_opposite_sign() {
        let pos = Micros::from_units(5);
        assert_eq!(-pos, Micros::new(-5_000_000));
    }

    #[test]
    fn mul_qty_normal() {
        let price = Micros::from_units(150);
        assert_eq!(price.mul_qty(100), Micros::from_units(15_000));
    }

    #[test]
    fn mul_qty_clamps_on_overflow() {
        let price = Micros::MAX;
        assert_eq!(price.mul_qty(2), Micros::MAX);
    }

    #[test]
    fn mul_amount_rescales_product() {
        let price = Micros::from_units(150);
        let qty = Micros::from_units(10);
        assert_eq!(price.mul_amount(qty), Micros::from_units(1_500));
    }

    #[test]
    fn weighted_average_basic() {
        // (150*100 + 200*50) / 150 = 166.666666..
        let a = Micros::from_units(150);
        let b = Micros::from_units(200);
        let avg = a.weighted_average(100, b, 50);
        assert_eq!(avg, Micros::new(166_666_666));
    }

    #[test]
    fn display_formats_six_decimals() {
        assert_eq!(format!("{}", Micros::new(1_500_000)), "1.500000");
        assert_eq!(format!("{}", Micros::new(-2_750_000)), "-2.750000");
    }

    #[test]
    fn serde_roundtrip_as_string() {
        let m = Micros::from_units(1234);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"1234000000\"");
        let back: Micros = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
