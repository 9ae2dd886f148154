//! Unit definition sets
//!
//! A definition maps a symbol to its canonical decomposition: a scale
//! factor, a base-symbol map, and an optional affine offset. Definition
//! sets are immutable values; the standard set is built once behind a
//! `LazyLock` and extension sets are passed explicitly at construction
//! time - nothing mutates shared state after initialization.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use mensura_core::Number;

use crate::MeasureError;

/// Process-wide standard definition set
static STANDARD: LazyLock<UnitDefinitions> = LazyLock::new(UnitDefinitions::standard);

/// Canonical decomposition of a single unit symbol
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    /// Scale factor relative to the base symbols
    pub factor: Number,
    /// Base symbol -> exponent
    pub base: BTreeMap<String, i32>,
    /// Additive shift onto the absolute base scale (temperature-like units)
    pub offset: Option<Number>,
}

impl UnitDef {
    fn scaled(factor: Number, base: &[(&str, i32)]) -> Self {
        UnitDef {
            factor,
            base: base
                .iter()
                .map(|(s, e)| (s.to_string(), *e))
                .collect(),
            offset: None,
        }
    }

    fn affine(factor: Number, base: &str, offset: Number) -> Self {
        UnitDef {
            factor,
            base: BTreeMap::from([(base.to_string(), 1)]),
            offset: Some(offset),
        }
    }
}

/// An immutable table of unit definitions
#[derive(Debug, Clone, Default)]
pub struct UnitDefinitions {
    defs: HashMap<String, UnitDef>,
}

impl UnitDefinitions {
    /// The shared standard definition set
    pub fn default_set() -> &'static UnitDefinitions {
        &STANDARD
    }

    /// Look up a symbol's decomposition
    pub fn get(&self, symbol: &str) -> Option<&UnitDef> {
        self.defs.get(symbol)
    }

    /// All defined symbols
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(|s| s.as_str())
    }

    /// Combine with an extension set
    ///
    /// Fails with `AmbiguousUnit` when both sets define the same symbol
    /// with a different decomposition.
    pub fn merged(&self, extra: &UnitDefinitions) -> Result<UnitDefinitions, MeasureError> {
        let mut defs = self.defs.clone();
        for (symbol, def) in &extra.defs {
            match defs.get(symbol) {
                Some(existing) if existing != def => {
                    return Err(MeasureError::AmbiguousUnit(symbol.clone()));
                }
                _ => {
                    defs.insert(symbol.clone(), def.clone());
                }
            }
        }
        Ok(UnitDefinitions { defs })
    }

    fn register(&mut self, symbol: &str, def: UnitDef) {
        self.defs.insert(symbol.to_string(), def);
    }

    /// Register a symbol together with its SI-prefixed forms
    fn register_prefixed(&mut self, symbol: &str, factor: Number, base: &[(&str, i32)]) {
        let prefixes: [(&str, &str); 5] = [
            ("k", "1000"),
            ("c", "0.01"),
            ("m", "0.001"),
            ("u", "0.000001"),
            ("n", "0.000000001"),
        ];
        self.register(symbol, UnitDef::scaled(factor.clone(), base));
        for (prefix, scale) in prefixes {
            let scale = Number::parse(scale).unwrap();
            self.register(
                &format!("{}{}", prefix, symbol),
                UnitDef::scaled(scale.mul(&factor), base),
            );
        }
    }

    /// The standard definition set (SI base + common derived units)
    pub fn standard() -> UnitDefinitions {
        let mut set = UnitDefinitions::default();
        set.register_base_units();
        set.register_time_units();
        set.register_derived_units();
        set.register_angle_units();
        set.register_temperature_units();
        set
    }

    fn register_base_units(&mut self) {
        let one = Number::one();
        self.register_prefixed("m", one.clone(), &[("m", 1)]);
        self.register_prefixed("g", one.clone(), &[("g", 1)]);
        self.register_prefixed("s", one.clone(), &[("s", 1)]);
        self.register_prefixed("mol", one.clone(), &[("mol", 1)]);
        self.register("A", UnitDef::scaled(one.clone(), &[("A", 1)]));
        self.register("K", UnitDef::scaled(one.clone(), &[("K", 1)]));
        self.register("cd", UnitDef::scaled(one, &[("cd", 1)]));
        // Litre and prefixed litres (mL, uL)
        self.register_prefixed("L", Number::parse("0.001").unwrap(), &[("m", 3)]);
    }

    fn register_time_units(&mut self) {
        self.register("min", UnitDef::scaled(Number::from_i64(60), &[("s", 1)]));
        self.register("h", UnitDef::scaled(Number::from_i64(3600), &[("s", 1)]));
        self.register("d", UnitDef::scaled(Number::from_i64(86400), &[("s", 1)]));
    }

    fn register_derived_units(&mut self) {
        let kilo = Number::from_i64(1000);
        self.register(
            "N",
            UnitDef::scaled(kilo.clone(), &[("g", 1), ("m", 1), ("s", -2)]),
        );
        self.register(
            "J",
            UnitDef::scaled(kilo.clone(), &[("g", 1), ("m", 2), ("s", -2)]),
        );
        self.register(
            "W",
            UnitDef::scaled(kilo.clone(), &[("g", 1), ("m", 2), ("s", -3)]),
        );
        self.register(
            "Pa",
            UnitDef::scaled(kilo, &[("g", 1), ("m", -1), ("s", -2)]),
        );
        self.register("Hz", UnitDef::scaled(Number::one(), &[("s", -1)]));
    }

    fn register_angle_units(&mut self) {
        // Angles decompose to dimensionless; deg carries the radian factor
        let deg = Number::pi()
            .checked_div(&Number::from_i64(180))
            .unwrap();
        self.register("deg", UnitDef::scaled(deg, &[]));
        // "rad" is the absorbed-dose unit (0.01 Gy), NOT an angle; a trig
        // argument carrying it is dimensioned and therefore rejected.
        self.register(
            "rad",
            UnitDef::scaled(Number::parse("0.01").unwrap(), &[("m", 2), ("s", -2)]),
        );
    }

    fn register_temperature_units(&mut self) {
        self.register(
            "\u{00B0}C",
            UnitDef::affine(Number::one(), "K", Number::parse("273.15").unwrap()),
        );
        // K = (F - 32) * 5/9 + 273.15 = F * 5/9 + 45967/180
        self.register(
            "\u{00B0}F",
            UnitDef::affine(
                Number::from_ratio(5, 9).unwrap(),
                "K",
                Number::from_ratio(45967, 180).unwrap(),
            ),
        );
    }

    /// Extension set for concentration work (pH, molarity, parts-per)
    pub fn concentration() -> UnitDefinitions {
        let mut set = UnitDefinitions::default();
        set.register("pH", UnitDef::scaled(Number::one(), &[("pH", 1)]));
        // Molarity: mol/L = 1000 mol/m^3
        set.register(
            "M",
            UnitDef::scaled(Number::from_i64(1000), &[("mol", 1), ("m", -3)]),
        );
        set.register("%", UnitDef::scaled(Number::parse("0.01").unwrap(), &[]));
        set.register("ppm", UnitDef::scaled(Number::parse("1e-6").unwrap(), &[]));
        set.register("ppb", UnitDef::scaled(Number::parse("1e-9").unwrap(), &[]));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lookup() {
        let defs = UnitDefinitions::default_set();
        let cm = defs.get("cm").unwrap();
        assert_eq!(cm.factor, Number::parse("0.01").unwrap());
        assert_eq!(cm.base.get("m"), Some(&1));
        assert!(cm.offset.is_none());
    }

    #[test]
    fn test_prefixed_litre() {
        let defs = UnitDefinitions::default_set();
        let ul = defs.get("uL").unwrap();
        assert_eq!(ul.factor, Number::parse("1e-9").unwrap());
        assert_eq!(ul.base.get("m"), Some(&3));
    }

    #[test]
    fn test_celsius_is_affine() {
        let defs = UnitDefinitions::default_set();
        let c = defs.get("\u{00B0}C").unwrap();
        assert_eq!(c.offset, Some(Number::parse("273.15").unwrap()));
        assert_eq!(c.base.get("K"), Some(&1));
    }

    #[test]
    fn test_rad_is_absorbed_dose() {
        let defs = UnitDefinitions::default_set();
        let rad = defs.get("rad").unwrap();
        assert!(!rad.base.is_empty());
    }

    #[test]
    fn test_merge_extension() {
        let merged = UnitDefinitions::default_set()
            .merged(&UnitDefinitions::concentration())
            .unwrap();
        assert!(merged.get("pH").is_some());
        assert!(merged.get("cm").is_some());
    }

    #[test]
    fn test_merge_conflict_is_ambiguous() {
        let mut conflicting = UnitDefinitions::default();
        conflicting.register("cm", UnitDef::scaled(Number::from_i64(2), &[("m", 1)]));
        let err = UnitDefinitions::default_set().merged(&conflicting);
        assert!(matches!(err, Err(MeasureError::AmbiguousUnit(s)) if s == "cm"));
    }

    #[test]
    fn test_merge_identical_is_fine() {
        let merged = UnitDefinitions::default_set()
            .merged(UnitDefinitions::default_set())
            .unwrap();
        assert!(merged.get("m").is_some());
    }
}
