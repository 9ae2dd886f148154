//! Measured quantities with uncertainty
//!
//! A `Measure` is an immutable value: a numeric value, a non-negative
//! uncertainty, a unit, and a flag recording whether the uncertainty was
//! implied by written precision rather than supplied explicitly. Every
//! operator returns a new `Measure`; failures are eager `MeasureError`s.

use std::fmt;
use std::str::FromStr;

use mensura_core::Number;
use serde::{Deserialize, Serialize};

use crate::{compare, parse, propagate, MeasureError, Unit, UnitDefinitions};

/// A value with uncertainty and a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measure {
    value: Number,
    error: Number,
    unit: Unit,
    /// True when the uncertainty was derived rather than supplied
    implied: bool,
}

/// Anything accepted as the right-hand side of a measure operation
///
/// Plain numbers and units coerce exactly (zero uncertainty) but count as
/// implied operands; strings go through the full literal parser and carry
/// whatever uncertainty the text implies.
#[derive(Debug, Clone)]
pub enum Operand {
    Measure(Measure),
    Number(Number),
    Text(String),
    Unit(Unit),
}

impl Operand {
    fn resolve(self) -> Result<Measure, MeasureError> {
        match self {
            Operand::Measure(m) => Ok(m),
            Operand::Number(n) => Ok(Measure {
                value: n,
                error: Number::zero(),
                unit: Unit::dimensionless(),
                implied: true,
            }),
            Operand::Text(s) => Measure::parse(&s),
            Operand::Unit(u) => Ok(Measure {
                value: Number::one(),
                error: Number::zero(),
                unit: u,
                implied: true,
            }),
        }
    }
}

impl From<Measure> for Operand {
    fn from(m: Measure) -> Self {
        Operand::Measure(m)
    }
}

impl From<&Measure> for Operand {
    fn from(m: &Measure) -> Self {
        Operand::Measure(m.clone())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Number(Number::from_i64(n))
    }
}

impl From<f64> for Operand {
    fn from(f: f64) -> Self {
        Operand::Number(Number::from_f64(f))
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<Unit> for Operand {
    fn from(u: Unit) -> Self {
        Operand::Unit(u)
    }
}

impl Measure {
    // ========== Construction ==========

    /// Parse a measure literal against the standard definition set
    pub fn parse(s: &str) -> Result<Self, MeasureError> {
        Self::parse_with(s, UnitDefinitions::default_set())
    }

    /// Parse a measure literal against an explicit definition set
    pub fn parse_with(s: &str, defs: &UnitDefinitions) -> Result<Self, MeasureError> {
        let parsed = parse::parse_measure(s, defs)?;
        Ok(Measure {
            value: parsed.value,
            error: parsed.error,
            unit: parsed.unit,
            implied: parsed.implied,
        })
    }

    /// Build from an explicit value, uncertainty, and unit
    pub fn from_parts(value: Number, error: Number, unit: Unit) -> Result<Self, MeasureError> {
        if error.is_negative() {
            return Err(MeasureError::Domain(
                "negative uncertainty".to_string(),
            ));
        }
        Ok(Measure {
            value,
            error,
            unit,
            implied: false,
        })
    }

    /// Build from a value alone; the uncertainty is implied by the value's
    /// decimal precision
    pub fn from_value(value: Number, unit: Unit) -> Self {
        Measure {
            error: value.half_place(),
            value,
            unit,
            implied: true,
        }
    }

    /// An exact quantity: zero uncertainty, explicit
    pub fn exact(value: Number, unit: Unit) -> Self {
        Measure {
            value,
            error: Number::zero(),
            unit,
            implied: false,
        }
    }

    // ========== Accessors ==========

    pub fn value(&self) -> &Number {
        &self.value
    }

    pub fn error(&self) -> &Number {
        &self.error
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn is_implied(&self) -> bool {
        self.implied
    }

    // ========== Arithmetic ==========

    /// Addition
    ///
    /// Identical units stay in the operand unit (affine offsets combine on
    /// the absolute scale and are re-applied once); compatible units land
    /// on the canonical decomposed unit. A zero-valued, zero-uncertainty
    /// linear `Measure` acts as the additive identity even across
    /// incompatible units; a bare numeric zero does not and fails as
    /// dimensionless-vs-unit.
    pub fn add(&self, other: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let other = other.into();
        let bare_number = matches!(other, Operand::Number(_));
        let other = other.resolve()?;
        let implied = self.implied || other.implied;

        if self.unit == other.unit {
            let base = self
                .unit
                .to_base(&self.value)
                .add(&other.unit.to_base(&other.value));
            return Ok(Measure {
                value: self.unit.from_base(&base)?,
                error: propagate::quadrature(&self.error, &other.error)?,
                unit: self.unit.clone(),
                implied,
            });
        }
        if self.unit.compatible(&other.unit) {
            let value = self
                .unit
                .to_base(&self.value)
                .add(&other.unit.to_base(&other.value));
            let error = propagate::quadrature(
                &self.unit.error_to_base(&self.error),
                &other.unit.error_to_base(&other.error),
            )?;
            return Ok(Measure {
                value,
                error,
                unit: self.unit.decompose(),
                implied,
            });
        }
        if !bare_number && other.is_additive_identity() {
            return Ok(Measure {
                implied,
                ..self.clone()
            });
        }
        if self.is_additive_identity() {
            return Ok(Measure { implied, ..other });
        }
        Err(MeasureError::incompatible(
            unit_label(&self.unit),
            unit_label(&other.unit),
        ))
    }

    /// Subtraction (same unit rules as addition, including the bare-number
    /// exclusion from the zero-identity bypass)
    pub fn sub(&self, other: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let other = other.into();
        let bare_number = matches!(other, Operand::Number(_));
        let other = other.resolve()?;
        let implied = self.implied || other.implied;

        if self.unit == other.unit {
            let base = self
                .unit
                .to_base(&self.value)
                .sub(&other.unit.to_base(&other.value));
            return Ok(Measure {
                value: self.unit.from_base(&base)?,
                error: propagate::quadrature(&self.error, &other.error)?,
                unit: self.unit.clone(),
                implied,
            });
        }
        if self.unit.compatible(&other.unit) {
            let value = self
                .unit
                .to_base(&self.value)
                .sub(&other.unit.to_base(&other.value));
            let error = propagate::quadrature(
                &self.unit.error_to_base(&self.error),
                &other.unit.error_to_base(&other.error),
            )?;
            return Ok(Measure {
                value,
                error,
                unit: self.unit.decompose(),
                implied,
            });
        }
        if !bare_number && other.is_additive_identity() {
            return Ok(Measure {
                implied,
                ..self.clone()
            });
        }
        if self.is_additive_identity() {
            return Ok(Measure {
                value: other.value.neg(),
                error: other.error,
                unit: other.unit,
                implied,
            });
        }
        Err(MeasureError::incompatible(
            unit_label(&self.unit),
            unit_label(&other.unit),
        ))
    }

    /// Multiplication
    ///
    /// Affine operands are taken to their absolute offset-free form first,
    /// and the result stays on that absolute scale (kelvin for
    /// temperatures) rather than being re-expressed in the affine unit.
    pub fn mul(&self, other: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let other = other.into().resolve()?;
        let implied = self.implied || other.implied;
        let a = self.linearized();
        let b = other.linearized();
        let value = a.value.mul(&b.value);
        let error = propagate::mul_error(&a.value, &a.error, &b.value, &b.error)?;
        Ok(Measure {
            value,
            error,
            unit: a.unit.mul(&b.unit),
            implied,
        })
    }

    /// Division; fails with `DivisionByZero` on a zero-valued divisor
    ///
    /// Affine operands divide on the absolute offset-free scale, and the
    /// result is expressed there (same convention as `mul`).
    pub fn div(&self, other: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let other = other.into().resolve()?;
        let implied = self.implied || other.implied;
        let a = self.linearized();
        let b = other.linearized();
        let value = a.value.checked_div(&b.value)?;
        let error = propagate::div_error(&a.value, &a.error, &b.value, &b.error)?;
        Ok(Measure {
            value,
            error,
            unit: a.unit.div(&b.unit)?,
            implied,
        })
    }

    /// Exponentiation
    ///
    /// The exponent must decompose to dimensionless. A united base only
    /// accepts integer exponents, since unit exponents are integers.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let exponent = exponent.into().resolve()?;
        if !exponent.unit.decomposes_dimensionless() {
            return Err(MeasureError::incompatible(
                unit_label(&exponent.unit),
                "dimensionless",
            ));
        }
        let n = exponent.unit.to_base(&exponent.value);
        let en = exponent.unit.error_to_base(&exponent.error);
        let implied = self.implied || exponent.implied;

        if self.unit == Unit::dimensionless() {
            let value = self.value.checked_pow(&n)?;
            let error = propagate::pow_error(&self.value, &self.error, &n, &en, &value)?;
            return Ok(Measure {
                value,
                error,
                unit: self.unit.clone(),
                implied,
            });
        }

        let exp = n
            .to_i64()
            .filter(|e| i32::try_from(*e).is_ok())
            .ok_or_else(|| {
                MeasureError::Domain("fractional power of a united measure".to_string())
            })? as i32;
        let value = self.value.checked_pow(&n)?;
        let error = propagate::pow_error(&self.value, &self.error, &n, &en, &value)?;
        Ok(Measure {
            value,
            error,
            unit: self.unit.powi(exp)?,
            implied,
        })
    }

    /// Natural logarithm of a dimensionless measure
    pub fn ln(&self) -> Result<Measure, MeasureError> {
        if !self.unit.decomposes_dimensionless() {
            return Err(MeasureError::incompatible(
                unit_label(&self.unit),
                "dimensionless",
            ));
        }
        let x = self.unit.to_base(&self.value);
        let ex = self.unit.error_to_base(&self.error);
        let value = x.ln()?;
        let error = propagate::log_error(&x, &ex)?;
        Ok(Measure {
            value,
            error,
            unit: Unit::dimensionless(),
            implied: self.implied,
        })
    }

    /// Logarithm in an arbitrary base: ln(x)/ln(base)
    ///
    /// Base 1 makes the denominator vanish and fails with
    /// `DivisionByZero`.
    pub fn log(&self, base: impl Into<Operand>) -> Result<Measure, MeasureError> {
        let base = base.into().resolve()?;
        if !self.unit.decomposes_dimensionless() {
            return Err(MeasureError::incompatible(
                unit_label(&self.unit),
                "dimensionless",
            ));
        }
        if !base.unit.decomposes_dimensionless() {
            return Err(MeasureError::incompatible(
                unit_label(&base.unit),
                "dimensionless",
            ));
        }
        let a = self.unit.to_base(&self.value);
        let ea = self.unit.error_to_base(&self.error);
        let b = base.unit.to_base(&base.value);
        let eb = base.unit.error_to_base(&base.error);
        let value = a.ln()?.checked_div(&b.ln()?)?;
        let error = propagate::log_base_error(&a, &ea, &b, &eb)?;
        Ok(Measure {
            value,
            error,
            unit: Unit::dimensionless(),
            implied: self.implied || base.implied,
        })
    }

    /// Sine of an angle
    ///
    /// The argument must decompose to dimensionless; the decomposition
    /// factor turns degrees into radians.
    pub fn sin(&self) -> Result<Measure, MeasureError> {
        let (x, ex) = self.angle()?;
        Ok(Measure {
            value: x.sin(),
            error: propagate::sin_error(&x, &ex),
            unit: Unit::dimensionless(),
            implied: self.implied,
        })
    }

    /// Cosine of an angle
    pub fn cos(&self) -> Result<Measure, MeasureError> {
        let (x, ex) = self.angle()?;
        Ok(Measure {
            value: x.cos(),
            error: propagate::cos_error(&x, &ex),
            unit: Unit::dimensionless(),
            implied: self.implied,
        })
    }

    /// Round the value to `places` fractional digits
    ///
    /// An implied measure gets a fresh implied uncertainty at the new
    /// precision; an explicit uncertainty is rounded to match.
    pub fn round(&self, places: i32) -> Measure {
        let value = self.value.round_places(places);
        let error = if self.implied {
            Number::from_i64(5).mul(&Number::pow10(-(places as isize) - 1))
        } else {
            self.error.round_places(places)
        };
        Measure {
            value,
            error,
            unit: self.unit.clone(),
            implied: self.implied,
        }
    }

    /// Negation
    pub fn neg(&self) -> Measure {
        Measure {
            value: self.value.neg(),
            error: self.error.clone(),
            unit: self.unit.clone(),
            implied: self.implied,
        }
    }

    // ========== Comparison ==========

    /// a <= b by value alone
    pub fn le(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, _, b, _) = self.aligned_with(&other)?;
        Ok(compare::plain_le(&a, &b))
    }

    /// a >= b by value alone
    pub fn ge(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, _, b, _) = self.aligned_with(&other)?;
        Ok(compare::plain_ge(&a, &b))
    }

    /// a < b by more than the combined uncertainty
    pub fn lt(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, ea, b, eb) = self.aligned_with(&other)?;
        Ok(compare::significant_lt(&a, &ea, &b, &eb))
    }

    /// a > b by more than the combined uncertainty
    pub fn gt(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, ea, b, eb) = self.aligned_with(&other)?;
        Ok(compare::significant_gt(&a, &ea, &b, &eb))
    }

    /// Indistinguishable within the combined uncertainty
    pub fn approx(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, ea, b, eb) = self.aligned_with(&other)?;
        Ok(compare::approx(&a, &ea, &b, &eb))
    }

    /// Exact equality of value and uncertainty after unit alignment
    pub fn eq_measure(&self, other: impl Into<Operand>) -> Result<bool, MeasureError> {
        let other = other.into().resolve()?;
        let (a, ea, b, eb) = self.aligned_with(&other)?;
        Ok(a == b && ea == eb)
    }

    // ========== Internals ==========

    fn is_additive_identity(&self) -> bool {
        self.value.is_zero() && self.error.is_zero() && !self.unit.is_affine()
    }

    /// The absolute offset-free form of an affine operand; linear operands
    /// pass through unchanged
    fn linearized(&self) -> Measure {
        if !self.unit.is_affine() {
            return self.clone();
        }
        Measure {
            value: self.unit.to_base(&self.value),
            error: self.unit.error_to_base(&self.error),
            unit: self.unit.decompose(),
            implied: self.implied,
        }
    }

    /// Values and uncertainties of both operands on a common scale
    fn aligned_with(
        &self,
        other: &Measure,
    ) -> Result<(Number, Number, Number, Number), MeasureError> {
        if self.unit == other.unit {
            Ok((
                self.value.clone(),
                self.error.clone(),
                other.value.clone(),
                other.error.clone(),
            ))
        } else if self.unit.compatible(&other.unit) {
            Ok((
                self.unit.to_base(&self.value),
                self.unit.error_to_base(&self.error),
                other.unit.to_base(&other.value),
                other.unit.error_to_base(&other.error),
            ))
        } else {
            Err(MeasureError::incompatible(
                unit_label(&self.unit),
                unit_label(&other.unit),
            ))
        }
    }

    /// A trig argument in radians, or `IncompatibleUnit` for dimensioned
    /// arguments (including "rad", which is absorbed dose here)
    fn angle(&self) -> Result<(Number, Number), MeasureError> {
        if !self.unit.decomposes_dimensionless() {
            return Err(MeasureError::incompatible(
                unit_label(&self.unit),
                "dimensionless",
            ));
        }
        Ok((
            self.unit.to_base(&self.value),
            self.unit.error_to_base(&self.error),
        ))
    }

    /// The numeric part of the display form: value, plus a parenthesized
    /// error unless the implied uncertainty of the written digits already
    /// encodes it
    fn format_number(&self) -> String {
        if self.implied {
            if !self.value.is_zero() && self.error == self.value.half_place() {
                return self.value.to_string();
            }
            if self.value.is_zero() {
                let (sig, exp) = self.error.sci_parts();
                if sig == "5" {
                    // A written zero's last digit sits one place above the
                    // uncertainty's
                    let place = exp + 1;
                    return if place == 0 {
                        "0".to_string()
                    } else if place < 0 {
                        format!("0.{}", "0".repeat((-place) as usize))
                    } else {
                        format!("0e{}", place)
                    };
                }
            }
            // Derived uncertainty with no written form: fall through to the
            // explicit rendering (the implied flag does not survive
            // re-parsing here)
        }

        let vstr = self.value.to_string();
        let (mantissa, exp): (&str, isize) = match vstr.split_once('e') {
            Some((m, e)) => (m, e.parse().unwrap_or(0)),
            None => (vstr.as_str(), 0),
        };
        let frac_len = mantissa
            .split_once('.')
            .map_or(0, |(_, frac)| frac.len()) as isize;

        // Error digits aligned to the last written mantissa place, falling
        // back to an absolute (dotted) form when they do not align
        let digits = self.error.mul(&Number::pow10(frac_len - exp));
        let digits_str = digits.to_string();
        let content = if digits.is_integer() && !digits_str.contains('e') {
            digits_str
        } else {
            self.error.mul(&Number::pow10(-exp)).to_string()
        };

        if exp == 0 {
            format!("{}({})", mantissa, content)
        } else {
            format!("{}({})e{}", mantissa, content, exp)
        }
    }
}

fn unit_label(unit: &Unit) -> String {
    let s = unit.to_string();
    if s.is_empty() {
        "dimensionless".to_string()
    } else {
        s
    }
}

impl PartialEq for Measure {
    /// Value and uncertainty equality after unit alignment; incompatible
    /// units are simply unequal
    fn eq(&self, other: &Self) -> bool {
        self.eq_measure(other).unwrap_or(false)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.format_number();
        if self.unit == Unit::dimensionless() {
            return write!(f, "{}", number);
        }
        let unit = self.unit.to_string();
        if unit.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
            write!(f, "{} {}", number, unit)
        } else {
            write!(f, "{}{}", number, unit)
        }
    }
}

impl FromStr for Measure {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
