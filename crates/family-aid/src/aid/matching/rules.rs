use super::super::domain::{
    AidProgram, Confidence, EligibilityOutcome, FactId, RequestContext, TerritoryLevel,
    TerritoryNode,
};
use super::amounts::estimate_range;

pub(crate) fn is_candidate(
    program: &AidProgram,
    context: &RequestContext,
    chain: &[TerritoryNode],
) -> bool {
    program.active
        && within_validity(program, context)
        && (program.age_min..=program.age_max).contains(&context.child_age)
        && !program.categories.is_disjoint(&context.activity_categories)
        && (program.periods.is_empty() || program.periods.contains(&context.period_type))
        && territory_in_scope(program, chain, &context.territory_code)
}

fn within_validity(program: &AidProgram, context: &RequestContext) -> bool {
    let Some(as_of) = context.as_of else {
        return true;
    };
    program.valid_from.map_or(true, |from| from <= as_of)
        && program.valid_until.map_or(true, |until| as_of <= until)
}

fn territory_in_scope(program: &AidProgram, chain: &[TerritoryNode], code: &str) -> bool {
    if program.territory_level == TerritoryLevel::National {
        return true;
    }

    chain.iter().any(|node| {
        node.level == program.territory_level
            && (program.territory_codes.contains(&node.id)
                || (node.level == TerritoryLevel::Commune
                    && program.territory_codes.contains(code.trim())))
    })
}

/// Known facts that rule the program out, if any.
fn disqualifier(program: &AidProgram, context: &RequestContext) -> Option<String> {
    if let (Some(income), Some(ceiling)) = (context.income_proxy, program.income_ceiling) {
        if income > ceiling {
            return Some(format!("income proxy {income} above ceiling {ceiling}"));
        }
    }
    if program.requires_social_flag && context.social_flag == Some(false) {
        return Some("social assistance flag not set".to_string());
    }
    if program.requires_benefit_recipient && context.benefit_recipient_flag == Some(false) {
        return Some("benefit recipient status not held".to_string());
    }
    None
}

pub(crate) fn assess(program: &AidProgram, context: &RequestContext) -> EligibilityOutcome {
    let needed = program.required_facts();
    let missing_info: Vec<FactId> = needed
        .iter()
        .copied()
        .filter(|fact| !context.knows(*fact))
        .collect();
    let match_score = completeness_score(needed.len(), needed.len() - missing_info.len());

    let mut outcome = EligibilityOutcome {
        program_id: program.id.clone(),
        program_name: program.name.clone(),
        eligible: true,
        confidence: Confidence::High,
        match_score,
        missing_info,
        estimated_amount_min: 0.0,
        estimated_amount_max: 0.0,
        exclusion_reason: None,
    };

    if let Some(reason) = disqualifier(program, context) {
        outcome.exclude(reason);
        return outcome;
    }

    let (min, max) = estimate_range(&program.amount, context);
    outcome.estimated_amount_min = min;
    outcome.estimated_amount_max = max;
    outcome.confidence = if outcome.missing_info.is_empty() {
        Confidence::High
    } else if max > min {
        Confidence::Low
    } else {
        Confidence::Medium
    };

    outcome
}

fn completeness_score(needed: usize, known: usize) -> u8 {
    if needed == 0 {
        return 100;
    }
    let score = (100 * known) / needed;
    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_score_counts_known_facts() {
        assert_eq!(completeness_score(0, 0), 100);
        assert_eq!(completeness_score(2, 1), 50);
        assert_eq!(completeness_score(3, 1), 33);
        assert_eq!(completeness_score(1, 1), 100);
    }
}
