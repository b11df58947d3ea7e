//! Integer views of Kubernetes resource quantities
//!
//! Only the integer part of a quantity is ever needed (CPU cores, GPU count),
//! so fractions truncate toward zero: "500m" -> 0, "2.5" -> 2, "1Ki" -> 1024.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::{Error, Result};

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
];

const DECIMAL_SUFFIXES: [(&str, i32); 7] = [
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Parse a quantity and return its integer part.
pub fn quantity_value(quantity: &Quantity) -> Result<i64> {
    parse_integer_part(&quantity.0)
}

/// Parse a raw quantity string and return its integer part.
///
/// Accepts plain numbers ("2", "0.5"), binary suffixes ("1Gi"), decimal SI
/// suffixes ("100m", "2k"), and decimal exponents ("1e3"). Scaling is done on
/// the exact decimal digits, so "0.29e2" is 29 and "2.01k" is 2010.
pub fn parse_integer_part(raw: &str) -> Result<i64> {
    let qty = raw.trim();
    if qty.is_empty() {
        return Err(Error::invalid_quantity(raw));
    }

    let value = if let Some((number, power)) = split_suffix(qty, &BINARY_SUFFIXES) {
        parse_decimal(number, raw)?.scale(power, 0)
    } else if let Some((number, exponent)) = split_suffix(qty, &DECIMAL_SUFFIXES) {
        parse_decimal(number, raw)?.scale(0, exponent.into())
    } else if let Some((mantissa, exponent)) = qty.split_once(|c: char| c == 'e' || c == 'E') {
        let exponent: i64 = exponent
            .parse()
            .map_err(|_| Error::invalid_quantity(raw))?;
        parse_decimal(mantissa, raw)?.scale(0, exponent)
    } else {
        parse_decimal(qty, raw)?.scale(0, 0)
    };

    value
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| Error::invalid_quantity(raw))
}

fn split_suffix<'a, T: Copy>(qty: &'a str, suffixes: &[(&str, T)]) -> Option<(&'a str, T)> {
    suffixes
        .iter()
        .find_map(|(suffix, scale)| qty.strip_suffix(*suffix).map(|number| (number, *scale)))
}

/// Exact decimal `digits * 10^-fraction_len`
struct Decimal {
    digits: i128,
    fraction_len: u32,
}

impl Decimal {
    /// Multiply by `1024^binary_power * 10^exponent` and truncate toward zero.
    ///
    /// Returns `None` when the integer part does not fit.
    fn scale(&self, binary_power: u32, exponent: i64) -> Option<i128> {
        if self.digits == 0 {
            return Some(0);
        }
        let numerator = self.digits.checked_mul(1024i128.checked_pow(binary_power)?)?;
        let net = exponent - i64::from(self.fraction_len);
        if net >= 0 {
            let factor = u32::try_from(net).ok().and_then(|p| 10i128.checked_pow(p))?;
            numerator.checked_mul(factor)
        } else {
            // a divisor past i128 leaves nothing of the integer part
            let divisor = u32::try_from(-net).ok().and_then(|p| 10i128.checked_pow(p));
            Some(divisor.map_or(0, |d| numerator / d))
        }
    }
}

fn parse_decimal(number: &str, raw: &str) -> Result<Decimal> {
    let invalid = || Error::invalid_quantity(raw);

    let (negative, unsigned) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    // Reject forms Kubernetes does not accept ("inf", "NaN", "", ".")
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let mut digits: i128 = 0;
    for c in whole.chars().chain(fraction.chars()) {
        let digit = c.to_digit(10).ok_or_else(invalid)?;
        digits = digits
            .checked_mul(10)
            .and_then(|d| d.checked_add(i128::from(digit)))
            .ok_or_else(invalid)?;
    }

    Ok(Decimal {
        digits: if negative { -digits } else { digits },
        fraction_len: u32::try_from(fraction.len()).map_err(|_| invalid())?,
    })
}
