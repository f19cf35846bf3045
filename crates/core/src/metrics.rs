//! Derived marketing metrics. These are always computed from summed
//! numerators and denominators; a zero denominator yields `0.0`.

/// Divide, returning `0.0` instead of NaN or infinity.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Return on ad spend: `revenue / spend`.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    guarded_ratio(revenue, spend)
}

/// Cost per acquisition: `spend / conversions`.
pub fn cpa(spend: f64, conversions: u64) -> f64 {
    guarded_ratio(spend, conversions as f64)
}

/// Round a currency amount to cents.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
