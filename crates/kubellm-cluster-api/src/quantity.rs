//! Exact resource quantities.
//!
//! A [`Quantity`] stores a signed amount in milli-units (`1` core is `1000`,
//! `1Gi` of memory is `1073741824000`). Amounts finer than a milli-unit round
//! up, so `"1n"` parses as `1m`. Comparison is exact integer comparison; the
//! remembered [`QuantityFormat`] only affects how the value is printed.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QuantityError, QuantityResult};

const MILLIS_PER_UNIT: i128 = 1000;

/// Largest decimal exponent accepted in `e<N>` notation.
const MAX_EXPONENT: u32 = 30;

const DECIMAL_SUFFIXES: [(&str, u32); 6] = [
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
];

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ei", 60),
    ("Pi", 50),
    ("Ti", 40),
    ("Gi", 30),
    ("Mi", 20),
    ("Ki", 10),
];

/// Suffix family a quantity was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityFormat {
    /// Powers of ten: `k`, `M`, `G`, ... and `e<N>` exponents.
    #[default]
    DecimalSI,
    /// Powers of two: `Ki`, `Mi`, `Gi`, ...
    BinarySI,
}

/// An exact resource amount.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    millis: i128,
    format: QuantityFormat,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity {
        millis: 0,
        format: QuantityFormat::DecimalSI,
    };

    /// Placeholder upper bound for the open end of a terminal grade.
    pub const UNBOUNDED: Quantity = Quantity {
        millis: i64::MAX as i128 * MILLIS_PER_UNIT,
        format: QuantityFormat::DecimalSI,
    };

    pub const fn from_millis(millis: i128) -> Self {
        Self {
            millis,
            format: QuantityFormat::DecimalSI,
        }
    }

    /// Whole units (cores, bytes, ...) in decimal format.
    pub const fn from_units(units: i64) -> Self {
        Self::from_millis(units as i128 * MILLIS_PER_UNIT)
    }

    pub const fn gibibytes(gib: i64) -> Self {
        Self {
            millis: gib as i128 * (1 << 30) * MILLIS_PER_UNIT,
            format: QuantityFormat::BinarySI,
        }
    }

    pub const fn millis(&self) -> i128 {
        self.millis
    }

    pub const fn format(&self) -> QuantityFormat {
        self.format
    }

    pub const fn is_zero(&self) -> bool {
        self.millis == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.millis < 0
    }

    /// Add two quantities. A zero left-hand side adopts the other's format.
    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        let millis = self.millis.checked_add(other.millis)?;
        Some(Quantity {
            millis,
            format: self.merged_format(other),
        })
    }

    pub fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity {
            millis: self.millis.saturating_add(other.millis),
            format: self.merged_format(other),
        }
    }

    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity {
            millis: self.millis.saturating_sub(other.millis),
            format: self.format,
        }
    }

    fn merged_format(&self, other: Quantity) -> QuantityFormat {
        if self.millis == 0 {
            other.format
        } else {
            self.format
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.millis.hash(state);
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, Quantity::saturating_add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(input: &str) -> QuantityResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }
        let overflow = || QuantityError::Overflow(input.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let split = body
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(split);
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(QuantityError::Invalid(input.to_string()));
        }

        let (exponent, multiplier, format) = parse_suffix(input, suffix)?;
        let digits: Vec<u8> = whole.bytes().chain(fraction.bytes()).map(|b| b - b'0').collect();
        let len = digits.len() as i64;
        // Position of the decimal point once the value is expressed in
        // milli-units of the suffix's power of ten.
        let point = whole.len() as i64 + 3 + i64::from(exponent);
        let digit_at = |i: i64| {
            usize::try_from(i)
                .ok()
                .and_then(|i| digits.get(i).copied())
                .unwrap_or(0)
        };

        let mut whole_millis: i128 = 0;
        for i in 0..point.max(0) {
            whole_millis = whole_millis
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit_at(i))))
                .ok_or_else(overflow)?;
        }

        // ceil(0.ddd * multiplier), folded from the least significant digit.
        let mut carry: i128 = 0;
        let mut exact = true;
        for i in (point..len).rev() {
            let value = i128::from(digit_at(i)) * multiplier + carry;
            exact &= value % 10 == 0;
            carry = value / 10;
        }
        let fraction_millis = if exact { carry } else { carry + 1 };

        let magnitude = whole_millis
            .checked_mul(multiplier)
            .and_then(|m| m.checked_add(fraction_millis))
            .ok_or_else(overflow)?;

        Ok(Quantity {
            millis: if negative { -magnitude } else { magnitude },
            format,
        })
    }
}

/// Map a suffix to `(decimal exponent, binary multiplier, format)`.
fn parse_suffix(input: &str, suffix: &str) -> QuantityResult<(i32, i128, QuantityFormat)> {
    let decimal = |exp: i32| (exp, 1, QuantityFormat::DecimalSI);
    let binary = |shift: u32| (0, 1i128 << shift, QuantityFormat::BinarySI);

    let parsed = match suffix {
        "" => decimal(0),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        "Ki" => binary(10),
        "Mi" => binary(20),
        "Gi" => binary(30),
        "Ti" => binary(40),
        "Pi" => binary(50),
        "Ei" => binary(60),
        _ => return parse_exponent(input, suffix),
    };
    Ok(parsed)
}

fn parse_exponent(input: &str, suffix: &str) -> QuantityResult<(i32, i128, QuantityFormat)> {
    let unknown = || QuantityError::UnknownSuffix {
        input: input.to_string(),
        suffix: suffix.to_string(),
    };
    let digits = suffix.strip_prefix(|c: char| c == 'e' || c == 'E').ok_or_else(unknown)?;
    let exponent: i32 = digits.parse().map_err(|_| unknown())?;

    if exponent.unsigned_abs() > MAX_EXPONENT {
        return Err(QuantityError::Overflow(input.to_string()));
    }
    Ok((exponent, 1, QuantityFormat::DecimalSI))
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis < 0 {
            f.write_str("-")?;
        }
        let magnitude = self.millis.unsigned_abs();
        if magnitude % MILLIS_PER_UNIT as u128 != 0 {
            return write!(f, "{magnitude}m");
        }
        let units = magnitude / MILLIS_PER_UNIT as u128;
        if units == 0 {
            return f.write_str("0");
        }

        let scaled = match self.format {
            QuantityFormat::BinarySI => BINARY_SUFFIXES
                .iter()
                .find(|(_, shift)| units % (1u128 << shift) == 0)
                .map(|(suffix, shift)| (units >> shift, *suffix)),
            QuantityFormat::DecimalSI => DECIMAL_SUFFIXES
                .iter()
                .find(|(_, exp)| units % 10u128.pow(*exp) == 0)
                .map(|(suffix, exp)| (units / 10u128.pow(*exp), *suffix)),
        };
        match scaled {
            Some((value, suffix)) => write!(f, "{value}{suffix}"),
            None => write!(f, "{units}"),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

struct QuantityVisitor;

impl Visitor<'_> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a quantity string such as \"4Gi\" or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        Ok(Quantity::from_units(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        Ok(Quantity::from_millis(i128::from(v) * MILLIS_PER_UNIT))
    }

    /// Floats go through their shortest decimal form, so `1.5` is exactly
    /// `1500m` and anything finer rounds up like a string would.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        if !v.is_finite() {
            return Err(E::invalid_value(de::Unexpected::Float(v), &self));
        }
        v.to_string().parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn parses_plain_and_milli_values() {
        assert_eq!(q("2").millis(), 2000);
        assert_eq!(q("500m").millis(), 500);
        assert_eq!(q("1.5").millis(), 1500);
        assert_eq!(q("0").millis(), 0);
        assert_eq!(q(".5").millis(), 500);
    }

    #[test]
    fn parses_binary_suffixes() {
        assert_eq!(q("4Gi"), Quantity::gibibytes(4));
        assert_eq!(q("1Ki").millis(), 1024 * 1000);
        assert_eq!(q("1.5Gi"), Quantity::from_units(3 * (1 << 29)));
        assert_eq!(q("2Ei").millis(), 2 * (1i128 << 60) * 1000);
        assert_eq!(q("1Gi").format(), QuantityFormat::BinarySI);
    }

    #[test]
    fn parses_decimal_suffixes_and_exponents() {
        assert_eq!(q("1k"), Quantity::from_units(1000));
        assert_eq!(q("3M"), Quantity::from_units(3_000_000));
        assert_eq!(q("1E"), Quantity::from_units(1_000_000_000_000_000_000));
        assert_eq!(q("12e3"), Quantity::from_units(12_000));
        assert_eq!(q("5E-3").millis(), 5);
        assert_eq!(q("1e+2"), Quantity::from_units(100));
    }

    #[test]
    fn sub_milli_values_round_up() {
        assert_eq!(q("1n").millis(), 1);
        assert_eq!(q("1500u").millis(), 2);
        assert_eq!(q("0.0001").millis(), 1);
        assert_eq!(q("0.0000").millis(), 0);
        assert_eq!(q("1.000000000000000000000000000000n").millis(), 1);
        let tiny = format!("0.{}1", "0".repeat(39));
        assert_eq!(q(&tiny).millis(), 1);
        assert_eq!(q("1e-30").millis(), 1);
    }

    #[test]
    fn long_fractions_keep_exact_value() {
        assert_eq!(q("2.500000000000000000000000000000000000000").millis(), 2500);
        assert_eq!(q("0.25000000000000000000000000000000000000000Ki").millis(), 256_000);
        // 1.0001Ki is 1024102.4m.
        assert_eq!(q("1.0001Ki").millis(), 1_024_103);
        assert_eq!(q("-0.0000001").millis(), -1);
    }

    #[test]
    fn parses_signs() {
        assert_eq!(q("-1").millis(), -1000);
        assert!(q("-250m").is_negative());
        assert_eq!(q("+3"), Quantity::from_units(3));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Quantity>(), Err(QuantityError::Empty));
        assert!(matches!("abc".parse::<Quantity>(), Err(QuantityError::Invalid(_))));
        assert!(matches!(".".parse::<Quantity>(), Err(QuantityError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Quantity>(), Err(QuantityError::Invalid(_))));
        assert!(matches!(
            "4Gb".parse::<Quantity>(),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            "1e99".parse::<Quantity>(),
            Err(QuantityError::Overflow(_))
        ));
        assert!(matches!(
            "99999999999999999999999999999999999999999".parse::<Quantity>(),
            Err(QuantityError::Overflow(_))
        ));
    }

    #[test]
    fn comparison_ignores_format() {
        assert_eq!(q("1Ki"), q("1024"));
        assert!(q("1G") < q("1Gi"));
        assert!(q("999m") < q("1"));
        assert_eq!(q("1000m").cmp(&q("1")), Ordering::Equal);
    }

    #[test]
    fn formats_canonically() {
        assert_eq!(q("4Gi").to_string(), "4Gi");
        assert_eq!(q("4096Mi").to_string(), "4Gi");
        assert_eq!(q("1536Mi").to_string(), "1536Mi");
        assert_eq!(q("2000").to_string(), "2k");
        assert_eq!(q("3").to_string(), "3");
        assert_eq!(q("250m").to_string(), "250m");
        assert_eq!(q("-2").to_string(), "-2");
        assert_eq!(Quantity::ZERO.to_string(), "0");
        assert_eq!(
            Quantity::UNBOUNDED.to_string(),
            "9223372036854775807"
        );
    }

    #[test]
    fn sum_adopts_first_nonzero_format() {
        let total: Quantity = [q("1Gi"), q("3Gi")].iter().sum();
        assert_eq!(total.to_string(), "4Gi");

        let empty: Quantity = std::iter::empty::<Quantity>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn saturating_sub_can_go_negative() {
        let free = q("1").saturating_sub(q("1500m"));
        assert_eq!(free.millis(), -500);
        assert_eq!(q("4Gi").saturating_sub(q("1Gi")).to_string(), "3Gi");
    }

    #[test]
    fn serde_accepts_strings_and_integers() {
        let from_str: Quantity = serde_json::from_str("\"16Gi\"").unwrap();
        assert_eq!(from_str, Quantity::gibibytes(16));

        let from_int: Quantity = serde_json::from_str("8").unwrap();
        assert_eq!(from_int, Quantity::from_units(8));

        let json = serde_json::to_string(&Quantity::gibibytes(16)).unwrap();
        assert_eq!(json, "\"16Gi\"");

        assert!(serde_json::from_str::<Quantity>("\"lots\"").is_err());
    }

    #[test]
    fn serde_accepts_floats() {
        let cpu: Quantity = serde_json::from_str("1.5").unwrap();
        assert_eq!(cpu.millis(), 1500);

        let tiny: Quantity = serde_json::from_str("0.0001").unwrap();
        assert_eq!(tiny.millis(), 1);

        let negative: Quantity = serde_json::from_str("-0.25").unwrap();
        assert_eq!(negative.millis(), -250);
    }
}
