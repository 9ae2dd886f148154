//! Arbitrary precision decimal numbers using dashu
//!
//! Uses dashu-float (DBig) for arbitrary precision decimal arithmetic.
//! Decimal literals parse exactly, and transcendentals (ln, exp, sqrt)
//! are available natively without rational-denominator blowup.

use dashu_float::ops::{Abs, SquareRoot};
use dashu_float::DBig;
use dashu_int::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),
}

/// Working precision for calculations (decimal digits)
const WORK_PRECISION: usize = 50;

/// Arbitrary precision decimal number
///
/// Built on dashu-float's DBig. All operations return Results or new
/// Numbers - never panic.
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    // ========== Construction ==========

    /// Ensure a DBig has adequate precision for calculations
    fn with_work_precision(val: DBig) -> DBig {
        val.with_precision(WORK_PRECISION).value()
    }

    /// Parse a decimal string: "123", "3.14", "-0.5", "24e4", "1.5e-10"
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();

        // Scientific notation with integer mantissa ("24e4") is built from
        // exact parts so the significand keeps its written digits.
        if (s.contains('e') || s.contains('E')) && !s.contains('.') {
            let lower = s.to_lowercase();
            if let Some((mantissa, exp)) = lower.split_once('e') {
                let mantissa: IBig = mantissa
                    .parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let exp: isize = exp
                    .parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let result = DBig::from_parts(mantissa, exp);
                return Ok(Self {
                    inner: Self::with_work_precision(result),
                });
            }
        }

        let inner: DBig = s
            .parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;
        Ok(Self {
            inner: Self::with_work_precision(inner),
        })
    }

    /// Create from i64
    pub fn from_i64(n: i64) -> Self {
        Self {
            inner: Self::with_work_precision(DBig::from(n)),
        }
    }

    /// Create from f64 (lossy for values that have no short decimal form)
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() || f.is_infinite() {
            return Self::zero();
        }
        // Shortest round-trip decimal form preserves what the caller wrote
        let s = format!("{}", f);
        Self::parse(&s).unwrap_or_else(|_| Self::zero())
    }

    /// Create from an exact ratio
    pub fn from_ratio(num: i64, den: i64) -> Result<Self, NumberError> {
        if den == 0 {
            return Err(NumberError::DivisionByZero);
        }
        let n = Self::with_work_precision(DBig::from(num));
        let d = Self::with_work_precision(DBig::from(den));
        Ok(Self { inner: n / d })
    }

    /// Exact power of ten: 10^exp
    pub fn pow10(exp: isize) -> Self {
        Self {
            inner: Self::with_work_precision(DBig::from_parts(IBig::ONE, exp)),
        }
    }

    pub fn zero() -> Self {
        Self { inner: DBig::ZERO }
    }

    pub fn one() -> Self {
        Self {
            inner: Self::with_work_precision(DBig::ONE),
        }
    }

    // ========== Predicates ==========

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.inner == DBig::ZERO
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.inner < DBig::ZERO
    }

    /// Check if positive (strictly greater than zero)
    pub fn is_positive(&self) -> bool {
        self.inner > DBig::ZERO
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        let floor_val = self.inner.clone().floor();
        self.inner == floor_val
    }

    // ========== Basic Arithmetic ==========

    /// Addition
    pub fn add(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner + &other.inner,
        }
    }

    /// Subtraction
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner - &other.inner,
        }
    }

    /// Multiplication
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner * &other.inner,
        }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self {
                inner: &self.inner / &other.inner,
            })
        }
    }

    /// Negation
    pub fn neg(&self) -> Self {
        Self {
            inner: -self.inner.clone(),
        }
    }

    /// Absolute value
    pub fn abs(&self) -> Self {
        Self {
            inner: Abs::abs(self.inner.clone()),
        }
    }

    /// Integer power (exact; negative exponents invert)
    pub fn powi(&self, exp: i32) -> Result<Self, NumberError> {
        if exp == 0 {
            return Ok(Self::one());
        }
        if self.is_zero() && exp < 0 {
            return Err(NumberError::DivisionByZero);
        }

        let mut result = Self::one();
        for _ in 0..exp.unsigned_abs() {
            result = result.mul(self);
        }

        if exp < 0 {
            Self::one().checked_div(&result)
        } else {
            Ok(result)
        }
    }

    /// Real-valued power: x^y, as exp(y * ln(x)) for fractional exponents
    ///
    /// Zero base with a non-positive exponent and negative base with a
    /// fractional exponent are domain failures, reported eagerly.
    pub fn checked_pow(&self, exp: &Self) -> Result<Self, NumberError> {
        if self.is_zero() {
            if exp.is_positive() {
                return Ok(Self::zero());
            }
            return Err(NumberError::DivisionByZero);
        }

        // Exact integer exponents, including for negative bases
        if exp.is_integer() {
            if let Some(e) = exp.to_i64() {
                if e.abs() <= i32::MAX as i64 {
                    return self.powi(e as i32);
                }
            }
        }

        if self.is_negative() {
            return Err(NumberError::DomainError(
                "fractional power of negative number".to_string(),
            ));
        }

        let ln_x = self.ln()?;
        Ok(ln_x.mul(exp).exp())
    }

    // ========== Transcendental Functions ==========

    /// Square root
    pub fn sqrt(&self) -> Result<Self, NumberError> {
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "square root of negative number".to_string(),
            ));
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let val = Self::with_work_precision(self.inner.clone());
        Ok(Self { inner: val.sqrt() })
    }

    /// Natural logarithm
    pub fn ln(&self) -> Result<Self, NumberError> {
        if self.inner <= DBig::ZERO {
            return Err(NumberError::DomainError(
                "logarithm of non-positive number".to_string(),
            ));
        }
        let val = Self::with_work_precision(self.inner.clone());
        Ok(Self { inner: val.ln() })
    }

    /// Exponential function (e^x)
    pub fn exp(&self) -> Self {
        let val = Self::with_work_precision(self.inner.clone());
        Self { inner: val.exp() }
    }

    /// Sine function (Taylor series)
    pub fn sin(&self) -> Self {
        let x = Self::with_work_precision(self.inner.clone());
        let x_squared = &x * &x;

        let mut sum = x.clone();
        let mut term = x;

        let iterations = (WORK_PRECISION / 3).max(12).min(50) as i64;
        for k in 1..iterations {
            let denom = DBig::from((2 * k) * (2 * k + 1));
            term = -&term * &x_squared / denom;
            sum = &sum + &term;
        }

        Self { inner: sum }
    }

    /// Cosine function (Taylor series)
    pub fn cos(&self) -> Self {
        let x = Self::with_work_precision(self.inner.clone());
        let x_squared = &x * &x;

        let one = DBig::ONE.with_precision(WORK_PRECISION).value();
        let mut sum = one.clone();
        let mut term = one;

        let iterations = (WORK_PRECISION / 3).max(12).min(50) as i64;
        for k in 1..iterations {
            let denom = DBig::from((2 * k - 1) * (2 * k));
            term = -&term * &x_squared / denom;
            sum = &sum + &term;
        }

        Self { inner: sum }
    }

    /// Pi - from high-precision string constant
    pub fn pi() -> Self {
        const PI_STR: &str =
            "3.1415926535897932384626433832795028841971693993751058209749445923078164";
        Self::parse(&PI_STR[..WORK_PRECISION + 2]).unwrap_or_else(|_| Self::from_i64(3))
    }

    // ========== Precision & Rounding ==========

    /// Half the place value of the least significant non-zero digit
    ///
    /// DBig keeps significands free of trailing zeros, so the stored
    /// exponent is exactly that digit's place. This is the implied one
    /// standard uncertainty of a decimal literal; a zero value falls back
    /// to half of the ones place.
    pub fn half_place(&self) -> Self {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        if significand == IBig::ZERO {
            return Self {
                inner: DBig::from_parts(IBig::from(5), -1),
            };
        }
        Self {
            inner: DBig::from_parts(IBig::from(5), exponent - 1),
        }
    }

    /// Round half-away-from-zero to `places` fractional digits
    pub fn round_places(&self, places: i32) -> Self {
        let scale = Self::pow10(places as isize);
        let shifted = self.mul(&scale);
        let half = Self {
            inner: DBig::from_parts(IBig::from(5), -1),
        };
        let rounded = if shifted.is_negative() {
            Self {
                inner: (&shifted.inner - &half.inner).ceil(),
            }
        } else {
            Self {
                inner: (&shifted.inner + &half.inner).floor(),
            }
        };
        let unscale = Self::pow10(-(places as isize));
        rounded.mul(&unscale)
    }

    /// Decimal scientific parts: (significand digits with sign, exponent)
    ///
    /// The significand carries no trailing zeros; `self == sig * 10^exp`.
    pub fn sci_parts(&self) -> (String, isize) {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        (significand.to_string(), exponent)
    }

    /// Try to convert to i64 (exact integers only)
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let sig: i64 = significand.try_into().ok()?;
        if exponent == 0 {
            Some(sig)
        } else if exponent > 0 && exponent <= 18 {
            sig.checked_mul(10_i64.checked_pow(exponent as u32)?)
        } else {
            None
        }
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    /// Exact decimal rendering that round-trips through `parse`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sig, exp) = self.sci_parts();
        if sig == "0" {
            return write!(f, "0");
        }
        let (sign, digits) = match sig.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", sig.as_str()),
        };

        if exp >= 0 {
            if exp <= 12 {
                // Plain integer with trailing zeros
                write!(f, "{}{}{}", sign, digits, "0".repeat(exp as usize))
            } else {
                write!(f, "{}{}e{}", sign, digits, exp)
            }
        } else {
            let frac_len = (-exp) as usize;
            if frac_len <= 12 + digits.len() {
                if digits.len() > frac_len {
                    let split = digits.len() - frac_len;
                    write!(f, "{}{}.{}", sign, &digits[..split], &digits[split..])
                } else {
                    let zeros = frac_len - digits.len();
                    write!(f, "{}0.{}{}", sign, "0".repeat(zeros), digits)
                }
            } else {
                write!(f, "{}{}e{}", sign, digits, exp)
            }
        }
    }
}

impl std::str::FromStr for Number {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner
            .partial_cmp(&other.inner)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Self::from_f64(f)
    }
}
