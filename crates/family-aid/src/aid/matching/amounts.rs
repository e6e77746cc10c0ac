use super::super::domain::{round_cents, AmountRule, RequestContext};

/// `(min, max)` contribution of a rule for the context.
pub(crate) fn estimate_range(rule: &AmountRule, context: &RequestContext) -> (f64, f64) {
    let (min, max) = match rule {
        AmountRule::Fixed(value) => (*value, *value),
        AmountRule::PerDay(value) => {
            let amount = value * f64::from(context.duration_days.max(0));
            (amount, amount)
        }
        AmountRule::Percentage(value) => {
            let amount = context.activity_price * value / 100.0;
            (amount, amount)
        }
        AmountRule::Bracket(table) => match context.income_proxy {
            Some(income) => {
                let amount = table
                    .lookup(Some(income))
                    .map_or(0.0, |bracket| table.amount_for(bracket, context.activity_price));
                (amount, amount)
            }
            // Unknown income: worst case no reduction, best case the most generous bracket.
            None => {
                let best = table
                    .most_generous()
                    .map_or(0.0, |bracket| table.amount_for(bracket, context.activity_price));
                (0.0, best)
            }
        },
    };

    (round_cents(min.max(0.0)), round_cents(max.max(0.0)))
}
