//! Unit representation and algebra
//!
//! A unit is a symbol->exponent mapping plus a scale magnitude and an
//! optional affine offset. Each unit also carries its canonical
//! decomposition (base symbols and total scale factor), resolved against
//! the definition set in effect when it was constructed, so operators
//! never need registry access.

use std::collections::BTreeMap;
use std::fmt;

use mensura_core::Number;
use serde::{Deserialize, Serialize};

use crate::{MeasureError, UnitDefinitions};

/// A unit of measure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Display symbol -> exponent (empty = dimensionless)
    symbols: BTreeMap<String, i32>,
    /// Scale factor relative to the canonical decomposition
    magnitude: Number,
    /// Additive shift onto the absolute base scale, for temperature-like
    /// units; absent for all linear units
    offset: Option<Number>,
    /// Canonical base symbol -> exponent
    base_symbols: BTreeMap<String, i32>,
    /// Total scale to the base symbols (magnitude included)
    base_factor: Number,
}

impl Unit {
    /// The empty, dimensionless unit
    pub fn dimensionless() -> Self {
        Unit {
            symbols: BTreeMap::new(),
            magnitude: Number::one(),
            offset: None,
            base_symbols: BTreeMap::new(),
            base_factor: Number::one(),
        }
    }

    /// Parse a unit expression ("cm", "m^2", "5 m^2", "kg m / s^2")
    /// against the standard definition set
    pub fn parse(s: &str) -> Result<Self, MeasureError> {
        Self::parse_with(s, UnitDefinitions::default_set())
    }

    /// Parse a unit expression against an explicit definition set
    pub fn parse_with(s: &str, defs: &UnitDefinitions) -> Result<Self, MeasureError> {
        crate::parse::parse_unit_expr(s, defs)
    }

    /// Build a unit from a symbol map and magnitude, resolving the
    /// canonical decomposition against `defs`
    ///
    /// Symbols absent from the definitions are opaque base symbols that
    /// decompose to themselves (e.g. "pigs").
    pub fn from_symbols(
        symbols: BTreeMap<String, i32>,
        magnitude: Number,
        defs: &UnitDefinitions,
    ) -> Self {
        let mut base_symbols: BTreeMap<String, i32> = BTreeMap::new();
        let mut base_factor = magnitude.clone();
        let mut offset = None;

        let single_linear_symbol = symbols.len() == 1;
        for (symbol, &exp) in &symbols {
            match defs.get(symbol) {
                Some(def) => {
                    for (base, &base_exp) in &def.base {
                        merge_exponent(&mut base_symbols, base, base_exp * exp);
                    }
                    // powi of a positive factor cannot fail
                    if let Ok(scaled) = def.factor.powi(exp) {
                        base_factor = base_factor.mul(&scaled);
                    }
                    // An affine symbol only keeps its offset when it stands
                    // alone with exponent one; compounds are scale-only
                    if def.offset.is_some() && single_linear_symbol && exp == 1 {
                        offset = def.offset.clone();
                    }
                }
                None => {
                    merge_exponent(&mut base_symbols, symbol, exp);
                }
            }
        }

        Unit {
            symbols,
            magnitude,
            offset,
            base_symbols,
            base_factor,
        }
    }

    // ========== Accessors ==========

    pub fn symbols(&self) -> &BTreeMap<String, i32> {
        &self.symbols
    }

    pub fn magnitude(&self) -> &Number {
        &self.magnitude
    }

    pub fn offset(&self) -> Option<&Number> {
        self.offset.as_ref()
    }

    /// True when the display symbols are empty
    pub fn is_dimensionless(&self) -> bool {
        self.symbols.is_empty()
    }

    /// True when the canonical decomposition is dimensionless
    /// (e.g. "cm/cm", "deg")
    pub fn decomposes_dimensionless(&self) -> bool {
        self.base_symbols.is_empty()
    }

    /// True when the unit carries an affine offset
    pub fn is_affine(&self) -> bool {
        self.offset.is_some()
    }

    pub(crate) fn base_symbols(&self) -> &BTreeMap<String, i32> {
        &self.base_symbols
    }

    pub(crate) fn base_factor(&self) -> &Number {
        &self.base_factor
    }

    // ========== Algebra ==========

    /// Multiply units: exponents add, magnitudes multiply
    ///
    /// Offsets never combine; the result is offset-free.
    pub fn mul(&self, other: &Unit) -> Unit {
        let mut symbols = self.symbols.clone();
        for (symbol, &exp) in &other.symbols {
            merge_exponent(&mut symbols, symbol, exp);
        }
        let mut base_symbols = self.base_symbols.clone();
        for (symbol, &exp) in &other.base_symbols {
            merge_exponent(&mut base_symbols, symbol, exp);
        }
        Unit {
            symbols,
            magnitude: self.magnitude.mul(&other.magnitude),
            offset: None,
            base_symbols,
            base_factor: self.base_factor.mul(&other.base_factor),
        }
    }

    /// Divide units: exponents subtract, magnitudes divide
    pub fn div(&self, other: &Unit) -> Result<Unit, MeasureError> {
        let mut symbols = self.symbols.clone();
        for (symbol, &exp) in &other.symbols {
            merge_exponent(&mut symbols, symbol, -exp);
        }
        let mut base_symbols = self.base_symbols.clone();
        for (symbol, &exp) in &other.base_symbols {
            merge_exponent(&mut base_symbols, symbol, -exp);
        }
        Ok(Unit {
            symbols,
            magnitude: self.magnitude.checked_div(&other.magnitude)?,
            offset: None,
            base_symbols,
            base_factor: self.base_factor.checked_div(&other.base_factor)?,
        })
    }

    /// Raise to an integer power
    pub fn powi(&self, exp: i32) -> Result<Unit, MeasureError> {
        let symbols = scale_exponents(&self.symbols, exp);
        let base_symbols = scale_exponents(&self.base_symbols, exp);
        Ok(Unit {
            symbols,
            magnitude: self.magnitude.powi(exp)?,
            offset: None,
            base_symbols,
            base_factor: self.base_factor.powi(exp)?,
        })
    }

    /// The canonical base-symbol form of this unit: magnitude one, no
    /// offset, all scale folded away
    pub fn decompose(&self) -> Unit {
        Unit {
            symbols: self.base_symbols.clone(),
            magnitude: Number::one(),
            offset: None,
            base_symbols: self.base_symbols.clone(),
            base_factor: Number::one(),
        }
    }

    /// Units are compatible when their canonical decompositions share the
    /// same base symbols
    pub fn compatible(&self, other: &Unit) -> bool {
        self.base_symbols == other.base_symbols
    }

    // ========== Scale conversion ==========

    /// A raw value in this unit, expressed on the absolute base scale
    pub fn to_base(&self, value: &Number) -> Number {
        let scaled = value.mul(&self.base_factor);
        match &self.offset {
            Some(offset) => scaled.add(offset),
            None => scaled,
        }
    }

    /// An uncertainty in this unit, expressed on the base scale (offsets
    /// do not move uncertainties)
    pub fn error_to_base(&self, error: &Number) -> Number {
        error.mul(&self.base_factor)
    }

    /// A base-scale value, re-expressed as a raw value in this unit
    pub fn from_base(&self, value: &Number) -> Result<Number, MeasureError> {
        let shifted = match &self.offset {
            Some(offset) => value.sub(offset),
            None => value.clone(),
        };
        Ok(shifted.checked_div(&self.base_factor)?)
    }
}

fn merge_exponent(map: &mut BTreeMap<String, i32>, symbol: &str, exp: i32) {
    if exp == 0 {
        return;
    }
    let entry = map.entry(symbol.to_string()).or_insert(0);
    *entry += exp;
    if *entry == 0 {
        map.remove(symbol);
    }
}

fn scale_exponents(map: &BTreeMap<String, i32>, factor: i32) -> BTreeMap<String, i32> {
    if factor == 0 {
        return BTreeMap::new();
    }
    map.iter()
        .map(|(s, &e)| (s.clone(), e * factor))
        .collect()
}

impl Default for Unit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl PartialEq for Unit {
    /// Two units are equal iff symbols and magnitude are identical
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols && self.magnitude == other.magnitude
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.magnitude != Number::one() {
            parts.push(self.magnitude.to_string());
        }

        let positives: Vec<(&String, i32)> = self
            .symbols
            .iter()
            .filter(|(_, &e)| e > 0)
            .map(|(s, &e)| (s, e))
            .collect();
        let negatives: Vec<(&String, i32)> = self
            .symbols
            .iter()
            .filter(|(_, &e)| e < 0)
            .map(|(s, &e)| (s, e))
            .collect();

        if positives.is_empty() {
            // No numerator: write signed exponents inline ("cm^-1")
            for (symbol, exp) in &negatives {
                parts.push(format!("{}^{}", symbol, exp));
            }
        } else {
            for (symbol, exp) in &positives {
                if *exp == 1 {
                    parts.push(symbol.to_string());
                } else {
                    parts.push(format!("{}^{}", symbol, exp));
                }
            }
            if !negatives.is_empty() {
                parts.push("/".to_string());
                for (symbol, exp) in &negatives {
                    if *exp == -1 {
                        parts.push(symbol.to_string());
                    } else {
                        parts.push(format!("{}^{}", symbol, -exp));
                    }
                }
            }
        }

        write!(f, "{}", parts.join(" "))
    }
}
