use tracing::warn;

use super::domain::{EligibilityOutcome, PricingSummary};

pub const DEFAULT_RESIDUAL_FLOOR: f64 = 1.0;

/// Merge outcomes into the confirmed/potential price breakdown.
pub fn summarize(price_initial: f64, outcomes: &[EligibilityOutcome]) -> PricingSummary {
    summarize_with_floor(price_initial, outcomes, DEFAULT_RESIDUAL_FLOOR)
}

/// Like [`summarize`] with an explicit residual floor.
///
/// Confirmed aid never exceeds the price, potential aid only closes the
/// remaining gap, and combined aid on a paid activity never exceeds
/// `price - residual_floor`. Free activities (price 0) stay at 0. Amounts are
/// settled in whole cents.
pub fn summarize_with_floor(
    price_initial: f64,
    outcomes: &[EligibilityOutcome],
    residual_floor: f64,
) -> PricingSummary {
    let price = if price_initial.is_finite() && price_initial > 0.0 {
        price_initial
    } else {
        if price_initial != 0.0 {
            warn!(price_initial, "invalid activity price treated as free");
        }
        0.0
    };
    let residual_floor = if residual_floor.is_finite() && residual_floor > 0.0 {
        residual_floor
    } else {
        0.0
    };

    let raw_confirmed_total = total_where(outcomes, |outcome| outcome.confidence.is_confirmed());
    let raw_potential_total = total_where(outcomes, |outcome| outcome.confidence.is_potential());

    // Caps are decided on whole cents so rounding can never reopen them.
    let price_cents = to_cents(price);
    let mut confirmed_cents = to_cents(raw_confirmed_total).min(price_cents);
    let mut potential_cents = to_cents(raw_potential_total).min(price_cents - confirmed_cents);

    if price_cents > 0 {
        let max_deduction = (price_cents - to_cents(residual_floor)).max(0);
        if confirmed_cents + potential_cents > max_deduction {
            confirmed_cents = confirmed_cents.min(max_deduction);
            potential_cents = potential_cents.min(max_deduction - confirmed_cents);
        }
    }

    let reste_actuel_cents = price_cents - confirmed_cents;
    let reste_estime_cents = reste_actuel_cents - potential_cents;

    PricingSummary {
        price_initial: price,
        confirmed_aid_total: from_cents(confirmed_cents),
        reste_actuel: from_cents(reste_actuel_cents),
        potential_aid_total: from_cents(potential_cents),
        reste_estime: from_cents(reste_estime_cents),
        has_confirmed_aids: confirmed_cents > 0,
        has_potential_aids: potential_cents > 0,
        savings_percent: percent_of(confirmed_cents, price_cents),
        potential_savings_percent: percent_of(confirmed_cents + potential_cents, price_cents),
    }
}

fn total_where<F>(outcomes: &[EligibilityOutcome], include: F) -> f64
where
    F: Fn(&EligibilityOutcome) -> bool,
{
    outcomes
        .iter()
        .filter(|outcome| outcome.eligible && include(outcome))
        .map(|outcome| outcome.estimated_amount_max)
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .sum()
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn percent_of(part: i64, whole: i64) -> u32 {
    if whole <= 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round().clamp(0.0, 100.0) as u32
}
