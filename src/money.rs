//! Monetary math helpers
//!
//! Money crosses the crate boundary as `Decimal` rounded to cents. Inside the
//! growth engines it is carried as `f64` and only rounded when a result record
//! is built; debt amortization stays in `Decimal` end to end.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

/// Decimal places for currency amounts
pub const CURRENCY_DP: u32 = 2;

/// Decimal places for rates
pub const RATE_DP: u32 = 4;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Round a money amount to cents (half away from zero)
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a rate to 4 decimal places
pub fn round_rate(rate: f64) -> f64 {
    (rate * 10_000.0).round() / 10_000.0
}

/// Convert an internal `f64` amount to a cent-rounded `Decimal`
///
/// Non-finite or out-of-range values map to zero.
pub fn to_money(amount: f64) -> Decimal {
    Decimal::from_f64(amount)
        .map(round_currency)
        .unwrap_or(Decimal::ZERO)
}

/// Convert a `Decimal` to `f64` for the floating-point engines
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

/// 18.0 -> 0.18
pub fn percent_to_rate(percent: f64) -> f64 {
    percent / 100.0
}

/// Nominal monthly rate for an annual percentage rate (18 -> 0.015)
pub fn monthly_rate_from_apr(annual_percent: Decimal) -> Decimal {
    annual_percent / dec!(1200)
}

/// Monthly effective rate equivalent to an annual effective rate
///
/// `(1 + annual)^(1/12) - 1`, so twelve monthly steps reproduce the annual rate.
pub fn monthly_effective_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR) - 1.0
}

/// Annual effective rate from a monthly effective rate
pub fn annualize_monthly_rate(monthly_rate: f64) -> f64 {
    (1.0 + monthly_rate).powf(MONTHS_PER_YEAR) - 1.0
}

/// Growth factor `(1 + rate)^periods`
pub fn compound_factor(rate: f64, periods: u32) -> f64 {
    (1.0 + rate).powi(periods as i32)
}

/// Percent change from `base` to `new` (5.0 = +5%); zero when the base is zero
pub fn percent_change(base: f64, new: f64) -> f64 {
    if base.abs() < 1e-12 {
        0.0
    } else {
        (new - base) / base * 100.0
    }
}

/// Level monthly payment that retires `principal` in `months` at `annual_percent` APR
///
/// Rounded up to the next cent so the loan closes within the term.
pub fn amortizing_payment(principal: Decimal, annual_percent: Decimal, months: u32) -> Decimal {
    if months == 0 || principal <= Decimal::ZERO {
        return round_currency(principal.max(Decimal::ZERO));
    }

    let r = monthly_rate_from_apr(annual_percent);
    let payment = if r <= Decimal::ZERO {
        principal / Decimal::from(months)
    } else {
        // (1 + r)^-n; a factor beyond Decimal range leaves interest only
        let discount = (Decimal::ONE + r)
            .checked_powi(i64::from(months))
            .map(|factor| Decimal::ONE / factor)
            .unwrap_or(Decimal::ZERO);
        principal * r / (Decimal::ONE - discount)
    };

    payment.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::ToPositiveInfinity)
}

/// Monthly deposit that grows to `target` after `months` at `monthly_rate`
pub fn sinking_fund_payment(target: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return target;
    }
    if monthly_rate.abs() < 1e-12 {
        return target / months as f64;
    }
    target * monthly_rate / (compound_factor(monthly_rate, months) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(dec!(10.005)), dec!(10.01));
        assert_eq!(round_currency(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_currency(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn test_round_rate() {
        assert_abs_diff_eq!(round_rate(0.071_249), 0.0712, epsilon = 1e-12);
        assert_abs_diff_eq!(round_rate(0.071_26), 0.0713, epsilon = 1e-12);
    }

    #[test]
    fn test_to_money_handles_non_finite() {
        assert_eq!(to_money(f64::NAN), Decimal::ZERO);
        assert_eq!(to_money(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_money(1234.5678), dec!(1234.57));
    }

    #[test]
    fn test_monthly_effective_rate_round_trips() {
        let monthly = monthly_effective_rate(0.07);
        assert_abs_diff_eq!(annualize_monthly_rate(monthly), 0.07, epsilon = 1e-12);
        assert!(monthly < 0.07 / 12.0);
    }

    #[test]
    fn test_monthly_rate_from_apr() {
        assert_eq!(monthly_rate_from_apr(dec!(18)), dec!(0.015));
        assert_abs_diff_eq!(percent_to_rate(18.0), 0.18, epsilon = 1e-12);
    }

    #[test]
    fn test_percent_change_zero_base() {
        assert_eq!(percent_change(0.0, 100.0), 0.0);
        assert_abs_diff_eq!(percent_change(200.0, 250.0), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_amortizing_payment_matches_annuity_formula() {
        // $10,000 over 36 months at 6% APR is about $304.22
        let payment = amortizing_payment(dec!(10000), dec!(6), 36);
        assert_eq!(payment, dec!(304.22));

        // Zero rate splits the principal evenly
        assert_eq!(amortizing_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
    }

    #[test]
    fn test_amortizing_payment_is_exact_to_the_cent() {
        // One month at 12% APR is principal plus one month of interest
        assert_eq!(amortizing_payment(dec!(1000), dec!(12), 1), dec!(1010.00));
        // An uneven split rounds up so the loan still closes in term
        assert_eq!(amortizing_payment(dec!(1000), Decimal::ZERO, 3), dec!(333.34));
        // Large principals keep their cents: 1,000,000,000 at 6% over 360 months
        assert_eq!(
            amortizing_payment(dec!(1000000000), dec!(6), 360),
            dec!(5995505.26)
        );
    }

    #[test]
    fn test_amortizing_payment_over_huge_term_is_interest_only() {
        // (1 + r)^n leaves Decimal range; the payment tends to principal * r
        assert_eq!(amortizing_payment(dec!(10000), dec!(100), 5000), dec!(833.34));
    }

    #[test]
    fn test_sinking_fund_payment() {
        // Zero rate is a straight division
        assert_abs_diff_eq!(sinking_fund_payment(12_000.0, 0.0, 12), 1_000.0, epsilon = 1e-9);

        // Depositing the payment for n months reproduces the target
        let r = 0.005;
        let pmt = sinking_fund_payment(50_000.0, r, 120);
        let mut balance = 0.0;
        for _ in 0..120 {
            balance = balance * (1.0 + r) + pmt;
        }
        assert_abs_diff_eq!(balance, 50_000.0, epsilon = 1e-6);
    }
}
