//! Mensura Units - Measurement arithmetic with uncertainty propagation
//!
//! This crate provides the measurement engine built on `mensura-core`:
//! - `Unit`: symbol/exponent unit algebra with scale magnitudes and
//!   affine offsets (temperature scales)
//! - `UnitDefinitions`: immutable definition sets mapping symbols to
//!   canonical decompositions
//! - `Measure`: a value with uncertainty and a unit; arithmetic carries
//!   uncertainty through first-order propagation
//! - `MeasureError`: the failure taxonomy (incompatible units, ambiguous
//!   symbols, division by zero, domain, parse)

mod compare;
mod definitions;
mod error;
mod measure;
mod parse;
mod propagate;
mod unit;

pub use definitions::{UnitDef, UnitDefinitions};
pub use error::MeasureError;
pub use measure::{Measure, Operand};
pub use unit::Unit;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Measure, MeasureError, Unit, UnitDefinitions};
    pub use mensura_core::{Number, NumberError};
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensura_core::Number;

    fn m(s: &str) -> Measure {
        Measure::parse(s).unwrap()
    }

    #[test]
    fn test_construction_idempotence() {
        // parse(format(m)) reproduces value, error, unit, and implied-ness
        for s in [
            "42",
            "3.14",
            "0.250",
            "12(3)cm",
            "36.2(4)uL",
            "24(1)e4cm",
            "2(1)kg m / s^2",
            "26.85\u{00B0}C",
            "7(2)pigs",
        ] {
            let original = m(s);
            let reparsed = m(&original.to_string());
            assert_eq!(reparsed, original, "{:?}", s);
            assert_eq!(reparsed.is_implied(), original.is_implied(), "{:?}", s);
        }
    }

    #[test]
    fn test_propagation_symmetry() {
        let a = m("12(3)cm");
        let b = m("0.36(4)m");
        assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        assert_eq!(a.mul(&b).unwrap().error(), b.mul(&a).unwrap().error());
    }

    #[test]
    fn test_implied_monotonicity_across_operators() {
        let explicit = m("8(1)");
        let implied = m("3");
        assert!(explicit.add(&implied).unwrap().is_implied());
        assert!(explicit.sub(&implied).unwrap().is_implied());
        assert!(explicit.mul(&implied).unwrap().is_implied());
        assert!(explicit.div(&implied).unwrap().is_implied());
        assert!(explicit.pow(&implied).unwrap().is_implied());
        assert!(!explicit.mul(&explicit).unwrap().is_implied());
    }

    #[test]
    fn test_incompatible_units_rejected_everywhere() {
        let length = m("5(1)cm");
        let time = m("3(1)s");
        assert!(length.add(&time).is_err());
        assert!(length.sub(&time).is_err());
        assert!(length.le(&time).is_err());
        assert!(length.lt(&time).is_err());
        assert!(length.approx(&time).is_err());
        // Multiplication is the exception: units combine
        assert!(length.mul(&time).is_ok());
    }

    #[test]
    fn test_derived_unit_chain() {
        // F = m a, with mass in grams against a newton definition in
        // kilogram base terms
        let mass = m("2000(0)g");
        let accel = m("3(0)m").div("1(0)s").unwrap().div("1(0)s").unwrap();
        let force = mass.mul(&accel).unwrap();
        let newtons = m("6(0)N");
        assert!(force.unit().compatible(newtons.unit()));
        assert_eq!(force, newtons);
    }

    #[test]
    fn test_concentration_extension_set() {
        let defs = UnitDefinitions::default_set()
            .merged(&UnitDefinitions::concentration())
            .unwrap();
        let molar = Measure::parse_with("0.5(0)M", &defs).unwrap();
        let volume = Measure::parse_with("2(0)L", &defs).unwrap();
        let amount = molar.mul(volume).unwrap();
        let mole = Measure::parse_with("1(0)mol", &defs).unwrap();
        assert!(amount.unit().compatible(mole.unit()));
        assert_eq!(amount, mole);
    }

    #[test]
    fn test_unknown_symbols_stay_opaque() {
        let rate = m("6(0)carrot").div("2(0)pig").unwrap();
        assert_eq!(rate.value(), &Number::from_i64(3));
        assert_eq!(rate.unit().to_string(), "carrot / pig");
        assert!(m("1(0)carrot").add("1(0)pig").is_err());
    }

    #[test]
    fn test_temperature_round_trip_through_kelvin() {
        let celsius = m("26.85(0)\u{00B0}C");
        let kelvin = m("300(0)K");
        assert_eq!(celsius, kelvin);
        assert!(celsius.approx(&kelvin).unwrap());
    }

    #[test]
    fn test_equality_requires_matching_uncertainty() {
        assert_ne!(m("2(1)cm"), m("2(2)cm"));
        assert!(m("2(1)cm").approx("2(2)cm").unwrap());
    }
}
