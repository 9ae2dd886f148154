//! Text parsing for measures and unit expressions
//!
//! Measure literals follow `<value>[(<error>)][e<exp>][<unit>]`:
//! - "36.2(4)uL"   explicit error, aligned to the last written digit
//! - "24(1)e4cm"   the exponent scales both value and error
//! - "5.0(0.3)s"   parenthesized content with a '.' is an absolute error
//! - "0.250"       no parentheses: implied error from the written digits
//!
//! Unit expressions are whitespace/'*'-separated terms with an optional
//! numeric magnitude and '/' introducing denominator terms:
//! "cm", "m^2", "5 m^2", "kg m / s^2", "cm^-1".

use std::collections::BTreeMap;

use mensura_core::Number;

use crate::{MeasureError, Unit, UnitDefinitions};

/// The pieces of a measure literal, before construction
pub(crate) struct ParsedMeasure {
    pub value: Number,
    pub error: Number,
    pub implied: bool,
    pub unit: Unit,
}

pub(crate) fn parse_measure(
    s: &str,
    defs: &UnitDefinitions,
) -> Result<ParsedMeasure, MeasureError> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;

    // Mantissa: [+-]digits[.digits]
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_len = i - int_start;
    let mut frac_len = 0usize;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_len = i - frac_start;
    }
    if int_len == 0 && frac_len == 0 {
        return Err(MeasureError::Parse(format!("invalid measure: {:?}", s)));
    }
    let mantissa = &s[..i];

    // Optional parenthesized error
    let mut paren: Option<&str> = None;
    if bytes.get(i) == Some(&b'(') {
        let close = s[i..]
            .find(')')
            .ok_or_else(|| MeasureError::Parse(format!("unclosed parenthesis: {:?}", s)))?;
        paren = Some(s[i + 1..i + close].trim());
        i += close + 1;
    }

    // Optional decimal exponent
    let mut exp: isize = 0;
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let digit_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digit_start {
            exp = s[i + 1..j]
                .parse()
                .map_err(|_| MeasureError::Parse(format!("invalid exponent: {:?}", s)))?;
            i = j;
        }
        // No digits after 'e': leave it for the unit text
    }

    let unit = parse_unit_expr(&s[i..], defs)?;

    let value = Number::parse(mantissa)?.mul(&Number::pow10(exp));

    let (error, implied) = match paren {
        Some(content) => {
            if content.is_empty() {
                return Err(MeasureError::Parse(format!("empty error in {:?}", s)));
            }
            let raw = Number::parse(content)?;
            if raw.is_negative() {
                return Err(MeasureError::Parse(format!("negative error in {:?}", s)));
            }
            let error = if content.contains(['.', 'e', 'E']) {
                // Absolute error, still scaled by the exponent
                raw.mul(&Number::pow10(exp))
            } else {
                // Digits in the place of the last written mantissa digit
                raw.mul(&Number::pow10(exp - frac_len as isize))
            };
            (error, false)
        }
        None => {
            let error = if value.is_zero() {
                // A written zero is uncertain at its last written place
                Number::from_i64(5).mul(&Number::pow10(exp - frac_len as isize - 1))
            } else {
                value.half_place()
            };
            (error, true)
        }
    };

    Ok(ParsedMeasure {
        value,
        error,
        implied,
        unit,
    })
}

// ========== Unit expressions ==========

pub(crate) fn parse_unit_expr(s: &str, defs: &UnitDefinitions) -> Result<Unit, MeasureError> {
    let mut symbols: BTreeMap<String, i32> = BTreeMap::new();
    let mut magnitude = Number::one();
    let mut denominator = false;

    for token in tokenize(s) {
        if token == "/" {
            denominator = true;
            continue;
        }
        // A bare numeric token is a magnitude component
        if let Ok(n) = Number::parse(token) {
            magnitude = apply_magnitude(magnitude, &n, denominator, s)?;
            continue;
        }
        // A glued numeric prefix ("10cm") splits off first
        let token = if token.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
            let split = token
                .bytes()
                .position(|b| !b.is_ascii_digit() && b != b'.')
                .unwrap_or(token.len());
            let n = Number::parse(&token[..split])?;
            magnitude = apply_magnitude(magnitude, &n, denominator, s)?;
            &token[split..]
        } else {
            token
        };
        if token.is_empty() {
            continue;
        }

        let (symbol, exp) = match token.split_once('^') {
            Some((symbol, exp)) => {
                let exp: i32 = exp
                    .parse()
                    .map_err(|_| MeasureError::Parse(format!("invalid exponent in {:?}", s)))?;
                (symbol, exp)
            }
            None => (token, 1),
        };
        if symbol.is_empty() || symbol.contains(['(', ')']) {
            return Err(MeasureError::Parse(format!("invalid unit term: {:?}", s)));
        }
        let signed = if denominator { -exp } else { exp };
        merge(&mut symbols, symbol, signed);
    }

    Ok(Unit::from_symbols(symbols, magnitude, defs))
}

fn apply_magnitude(
    magnitude: Number,
    n: &Number,
    denominator: bool,
    source: &str,
) -> Result<Number, MeasureError> {
    if !n.is_positive() {
        return Err(MeasureError::Parse(format!(
            "unit magnitude must be positive: {:?}",
            source
        )));
    }
    if denominator {
        Ok(magnitude.checked_div(n)?)
    } else {
        Ok(magnitude.mul(n))
    }
}

/// Split on whitespace and '*', with '/' as its own token
fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        if c.is_whitespace() || c == '*' || c == '/' {
            if let Some(begin) = start.take() {
                tokens.push(&s[begin..i]);
            }
            if c == '/' {
                tokens.push("/");
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(begin) = start {
        tokens.push(&s[begin..]);
    }
    tokens
}

fn merge(map: &mut BTreeMap<String, i32>, symbol: &str, exp: i32) {
    if exp == 0 {
        return;
    }
    let entry = map.entry(symbol.to_string()).or_insert(0);
    *entry += exp;
    if *entry == 0 {
        map.remove(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> ParsedMeasure {
        parse_measure(s, UnitDefinitions::default_set()).unwrap()
    }

    fn num(s: &str) -> Number {
        Number::parse(s).unwrap()
    }

    #[test]
    fn test_plain_integer() {
        let m = parsed("36");
        assert_eq!(m.value, num("36"));
        assert_eq!(m.error, num("0.5"));
        assert!(m.implied);
        assert!(m.unit.is_dimensionless());
    }

    #[test]
    fn test_implied_error_follows_written_digits() {
        assert_eq!(parsed("36.2").error, num("0.05"));
        assert_eq!(parsed("40").error, num("5"));
        assert_eq!(parsed("0.250").error, num("0.005"));
        assert_eq!(parsed("-17").error, num("0.5"));
    }

    #[test]
    fn test_implied_error_of_zero() {
        assert_eq!(parsed("0").error, num("0.5"));
        assert_eq!(parsed("0.0").error, num("0.05"));
        assert_eq!(parsed("0.00").error, num("0.005"));
        assert!(parsed("0.0").value.is_zero());
    }

    #[test]
    fn test_explicit_error_alignment() {
        let m = parsed("36.2(4)uL");
        assert_eq!(m.value, num("36.2"));
        assert_eq!(m.error, num("0.4"));
        assert!(!m.implied);
        assert_eq!(m.unit, Unit::parse("uL").unwrap());

        // Written precision is hundredths, so digits land at 10^-2
        assert_eq!(parsed("36.20(5)").error, num("0.05"));
        assert_eq!(parsed("36(12)").error, num("12"));
    }

    #[test]
    fn test_absolute_error() {
        let m = parsed("5.0(0.3)s");
        assert_eq!(m.error, num("0.3"));
        assert!(!m.implied);
    }

    #[test]
    fn test_exponent_scales_value_and_error() {
        let m = parsed("24(1)e4cm");
        assert_eq!(m.value, num("240000"));
        assert_eq!(m.error, num("10000"));
        assert_eq!(m.unit, Unit::parse("cm").unwrap());

        let implied = parsed("22.3e4cm");
        assert_eq!(implied.value, num("223000"));
        assert_eq!(implied.error, num("500"));
    }

    #[test]
    fn test_unit_with_space() {
        let m = parsed("2 cm");
        assert_eq!(m.value, num("2"));
        assert_eq!(m.unit, Unit::parse("cm").unwrap());
    }

    #[test]
    fn test_malformed() {
        let defs = UnitDefinitions::default_set();
        assert!(parse_measure("", defs).is_err());
        assert!(parse_measure("abc", defs).is_err());
        assert!(parse_measure("1(2", defs).is_err());
        assert!(parse_measure("1()", defs).is_err());
        assert!(parse_measure("1(-2)", defs).is_err());
    }

    #[test]
    fn test_unit_expr_terms() {
        let defs = UnitDefinitions::default_set();
        let force = parse_unit_expr("kg m / s^2", defs).unwrap();
        assert_eq!(force.symbols().get("kg"), Some(&1));
        assert_eq!(force.symbols().get("m"), Some(&1));
        assert_eq!(force.symbols().get("s"), Some(&-2));

        let star = parse_unit_expr("kg*m/s^2", defs).unwrap();
        assert_eq!(star, force);
    }

    #[test]
    fn test_unit_expr_magnitude() {
        let defs = UnitDefinitions::default_set();
        let u = parse_unit_expr("5 m^2", defs).unwrap();
        assert_eq!(u.magnitude(), &num("5"));
        let glued = parse_unit_expr("10cm", defs).unwrap();
        assert_eq!(glued.magnitude(), &num("10"));
        assert!(parse_unit_expr("0 m", defs).is_err());
        assert!(parse_unit_expr("-2 m", defs).is_err());
    }

    #[test]
    fn test_unit_expr_negative_exponent() {
        let defs = UnitDefinitions::default_set();
        let u = parse_unit_expr("cm^-1", defs).unwrap();
        assert_eq!(u.symbols().get("cm"), Some(&-1));
    }
}
