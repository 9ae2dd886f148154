//! Two-tier comparison predicates
//!
//! Plain `le`/`ge` order by value alone. Significant `lt`/`gt` demand the
//! values differ by more than the combined uncertainty, and `approx`
//! accepts anything within it. All inputs are raw numbers already on a
//! common scale.

use mensura_core::Number;

/// a <= b by value alone
pub(crate) fn plain_le(a: &Number, b: &Number) -> bool {
    a <= b
}

/// a >= b by value alone
pub(crate) fn plain_ge(a: &Number, b: &Number) -> bool {
    a >= b
}

/// a < b beyond the combined uncertainty: b - a > e_a + e_b
pub(crate) fn significant_lt(a: &Number, ea: &Number, b: &Number, eb: &Number) -> bool {
    b.sub(a) > ea.add(eb)
}

/// a > b beyond the combined uncertainty: a - b > e_a + e_b
pub(crate) fn significant_gt(a: &Number, ea: &Number, b: &Number, eb: &Number) -> bool {
    a.sub(b) > ea.add(eb)
}

/// |a - b| <= e_a + e_b (indistinguishable within uncertainty)
pub(crate) fn approx(a: &Number, ea: &Number, b: &Number, eb: &Number) -> bool {
    a.sub(b).abs() <= ea.add(eb)
}
