//! First-order uncertainty propagation
//!
//! Each operator's result uncertainty combines the operand uncertainties
//! through the operator's partial derivatives, summed in quadrature:
//! e_z = sqrt((df/dx * e_x)^2 + (df/dy * e_y)^2). All inputs are raw
//! numbers on a common scale; unit alignment happens before these are
//! called.

use mensura_core::Number;

use crate::MeasureError;

/// sqrt(a^2 + b^2)
pub(crate) fn quadrature(a: &Number, b: &Number) -> Result<Number, MeasureError> {
    let sum = a.mul(a).add(&b.mul(b));
    Ok(sum.sqrt()?)
}

/// Uncertainty of x * y: sqrt((y e_x)^2 + (x e_y)^2)
pub(crate) fn mul_error(
    x: &Number,
    ex: &Number,
    y: &Number,
    ey: &Number,
) -> Result<Number, MeasureError> {
    quadrature(&y.mul(ex), &x.mul(ey))
}

/// Uncertainty of x / y: sqrt((e_x / y)^2 + (x e_y / y^2)^2)
pub(crate) fn div_error(
    x: &Number,
    ex: &Number,
    y: &Number,
    ey: &Number,
) -> Result<Number, MeasureError> {
    let dx = ex.checked_div(y)?;
    let dy = x.mul(ey).checked_div(&y.mul(y))?;
    quadrature(&dx, &dy)
}

/// Uncertainty of z = x^n
///
/// Base term: n x^(n-1) e_x. Exponent term: z ln(x) e_n, skipped when the
/// exponent is exact so integer powers of negative or zero bases stay in
/// domain.
pub(crate) fn pow_error(
    x: &Number,
    ex: &Number,
    n: &Number,
    en: &Number,
    z: &Number,
) -> Result<Number, MeasureError> {
    let base_term = if ex.is_zero() {
        Number::zero()
    } else {
        let n_minus_one = n.sub(&Number::one());
        // x^0 in the derivative is 1, even at a zero base
        let slope = if n_minus_one.is_zero() {
            Number::one()
        } else {
            x.checked_pow(&n_minus_one)?
        };
        n.mul(&slope).mul(ex)
    };
    let exp_term = if en.is_zero() {
        Number::zero()
    } else {
        z.mul(&x.ln()?).mul(en)
    };
    quadrature(&base_term, &exp_term)
}

/// Uncertainty of log_b(a) = ln(a)/ln(b)
///
/// da term: e_a / (a ln b). db term: ln(a) e_b / (b ln(b)^2).
pub(crate) fn log_base_error(
    a: &Number,
    ea: &Number,
    b: &Number,
    eb: &Number,
) -> Result<Number, MeasureError> {
    let ln_a = a.ln()?;
    let ln_b = b.ln()?;
    let da = ea.checked_div(&a.mul(&ln_b))?;
    let db = if eb.is_zero() {
        Number::zero()
    } else {
        ln_a.mul(eb).checked_div(&b.mul(&ln_b).mul(&ln_b))?
    };
    quadrature(&da, &db)
}

/// Uncertainty of ln(x): e_x / |x|
pub(crate) fn log_error(x: &Number, ex: &Number) -> Result<Number, MeasureError> {
    Ok(ex.checked_div(&x.abs())?)
}

/// Uncertainty of sin(x): |cos(x)| e_x
pub(crate) fn sin_error(x: &Number, ex: &Number) -> Number {
    x.cos().abs().mul(ex)
}

/// Uncertainty of cos(x): |sin(x)| e_x
pub(crate) fn cos_error(x: &Number, ex: &Number) -> Number {
    x.sin().abs().mul(ex)
}
