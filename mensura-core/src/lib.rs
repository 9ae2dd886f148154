//! Mensura Core - Fundamental numeric type
//!
//! This crate provides the numeric foundation used throughout Mensura:
//! - `Number`: arbitrary precision decimal numbers (dashu-float backed)
//! - `NumberError`: numeric failure conditions (parse, division, domain)

mod number;

pub use number::{Number, NumberError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, NumberError};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64() {
        let n = Number::from_i64(42);
        assert_eq!(n.to_i64(), Some(42));
    }

    #[test]
    fn test_parse_integer() {
        let n = Number::parse("123").unwrap();
        assert_eq!(n.to_i64(), Some(123));
    }

    #[test]
    fn test_parse_decimal() {
        let n = Number::parse("3.14").unwrap();
        assert!(!n.is_integer());
    }

    #[test]
    fn test_parse_scientific_integer_mantissa() {
        // Integer mantissa preserves full precision (no float64 intermediary)
        let n = Number::parse("24e4").unwrap();
        assert_eq!(n.to_i64(), Some(240000));

        let tiny = Number::parse("662607015e-42").unwrap();
        assert!(!tiny.is_zero());
        assert!(tiny.is_positive());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Number::parse("one hundred").is_err());
        assert!(Number::parse("").is_err());
    }

    #[test]
    fn test_add_sub_mul() {
        let a = Number::from_i64(10);
        let b = Number::from_i64(32);
        assert_eq!(a.add(&b).to_i64(), Some(42));
        assert_eq!(b.sub(&a).to_i64(), Some(22));
        assert_eq!(a.mul(&b).to_i64(), Some(320));
    }

    #[test]
    fn test_checked_div() {
        let a = Number::from_i64(84);
        let b = Number::from_i64(2);
        assert_eq!(a.checked_div(&b).unwrap().to_i64(), Some(42));
        assert!(a.checked_div(&Number::zero()).is_err());
    }

    #[test]
    fn test_powi() {
        let n = Number::from_i64(2);
        assert_eq!(n.powi(10).unwrap().to_i64(), Some(1024));
        // 2^-2 = 0.25
        assert!(!n.powi(-2).unwrap().is_integer());
        assert!(Number::zero().powi(-1).is_err());
    }

    #[test]
    fn test_checked_pow_integer_exponent() {
        let four = Number::from_i64(4);
        let six = Number::from_i64(6);
        assert_eq!(four.checked_pow(&six).unwrap().to_i64(), Some(4096));

        // Negative base with integer exponent is exact
        let neg = Number::from_i64(-2);
        assert_eq!(neg.checked_pow(&Number::from_i64(3)).unwrap().to_i64(), Some(-8));
    }

    #[test]
    fn test_checked_pow_fractional() {
        // 4^0.5 = 2
        let four = Number::from_i64(4);
        let half = Number::parse("0.5").unwrap();
        let result = four.checked_pow(&half).unwrap();
        let diff = result.sub(&Number::from_i64(2)).abs();
        assert!(diff < Number::parse("1e-40").unwrap());

        // domain failures
        assert!(Number::zero().checked_pow(&Number::zero()).is_err());
        assert!(Number::from_i64(-4).checked_pow(&half).is_err());
    }

    #[test]
    fn test_sqrt() {
        let n = Number::from_i64(4);
        assert_eq!(n.sqrt().unwrap().to_i64(), Some(2));
        assert!(Number::from_i64(-4).sqrt().is_err());
    }

    #[test]
    fn test_ln_exp() {
        let hundred = Number::from_i64(100);
        let ln_100 = hundred.ln().unwrap();
        let back = ln_100.exp();
        let diff = back.sub(&hundred).abs();
        assert!(diff < Number::parse("1e-40").unwrap());

        assert!(Number::zero().ln().is_err());
        assert!(Number::from_i64(-1).ln().is_err());
    }

    #[test]
    fn test_trig() {
        // sin(pi/2) = 1, cos(pi/2) = 0
        let half_pi = Number::pi().checked_div(&Number::from_i64(2)).unwrap();
        // The fixed-length Taylor truncation leaves ~1e-29 residue at pi/2
        let tol = Number::parse("1e-25").unwrap();
        assert!(half_pi.sin().sub(&Number::one()).abs() < tol);
        assert!(half_pi.cos().abs() < tol);
    }

    #[test]
    fn test_half_place() {
        assert_eq!(Number::from_i64(4).half_place(), Number::parse("0.5").unwrap());
        assert_eq!(Number::from_i64(40).half_place(), Number::from_i64(5));
        assert_eq!(Number::parse("0.4").unwrap().half_place(), Number::parse("0.05").unwrap());
        assert_eq!(Number::parse("24e4").unwrap().half_place(), Number::parse("0.5e4").unwrap());
        // Zero falls back to half the ones place
        assert_eq!(Number::zero().half_place(), Number::parse("0.5").unwrap());
    }

    #[test]
    fn test_round_places() {
        let n = Number::parse("0.0016").unwrap();
        assert_eq!(n.round_places(3), Number::parse("0.002").unwrap());

        let e = Number::parse("0.0026").unwrap();
        assert_eq!(e.round_places(3), Number::parse("0.003").unwrap());

        let neg = Number::parse("-2.5").unwrap();
        assert_eq!(neg.round_places(0), Number::from_i64(-3));

        let whole = Number::parse("12.34").unwrap();
        assert_eq!(whole.round_places(0), Number::from_i64(12));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["0", "42", "-42", "3.14", "0.0016", "240000", "-0.5"] {
            let n = Number::parse(s).unwrap();
            let back = Number::parse(&n.to_string()).unwrap();
            assert_eq!(n, back, "round-trip failed for {}", s);
        }
    }

    #[test]
    fn test_ordering() {
        let a = Number::parse("1.5").unwrap();
        let b = Number::from_i64(2);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(Number::parse("1.50").unwrap(), a);
    }

    #[test]
    fn test_serde_as_string() {
        let n = Number::parse("26.85").unwrap();
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"26.85\"");
        let back: Number = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
