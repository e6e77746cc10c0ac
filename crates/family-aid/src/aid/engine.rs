use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::brackets::{not_applicable, resolve_bracket_reduction};
use super::config::EngineConfig;
use super::domain::{
    round_cents, AidProgram, AmountRule, BracketReduction, Confidence, EligibilityOutcome,
    FactId, PeriodType, PricingSummary, ProgramId, RequestContext, TerritoryNode,
};
use super::matching::match_against_chain;
use super::questions::QuestionGate;
use super::snapshot::CatalogSnapshot;
use super::summary::summarize_with_floor;

/// Everything presentation needs for one activity and family context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidEstimate {
    pub territory_chain: Vec<TerritoryNode>,
    pub required_facts: BTreeSet<FactId>,
    pub bracket: BracketReduction,
    pub outcomes: Vec<EligibilityOutcome>,
    pub summary: PricingSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Stateless pipeline: territory chain, question gate, bracket and program
/// matching, then normalization.
#[derive(Debug, Clone)]
pub struct AidEngine {
    config: EngineConfig,
    gate: QuestionGate,
}

impl AidEngine {
    pub fn new(config: EngineConfig) -> Self {
        let gate = QuestionGate::new(&config);
        Self { config, gate }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gate(&self) -> &QuestionGate {
        &self.gate
    }

    pub fn estimate(&self, context: &RequestContext, catalog: &CatalogSnapshot) -> AidEstimate {
        if let Err(err) = context.validate() {
            warn!(field = err.field, "estimation request rejected: {err}");
            return self.neutral_estimate(context, err.to_string());
        }

        let territory_chain = catalog.territories().resolve(&context.territory_code);
        let required_facts = self.gate.for_context(context);
        let bracket = resolve_bracket_reduction(context.income_proxy, context.period_type);

        let mut outcomes = match_against_chain(context, catalog.programs(), &territory_chain);
        if !bracket_program_applies(&outcomes, catalog.programs()) {
            if let Some(outcome) = bracket_outcome(&bracket, context) {
                outcomes.push(outcome);
            }
        }

        let summary = summarize_with_floor(
            context.activity_price,
            &outcomes,
            self.config.residual_floor,
        );

        debug!(
            territory = %context.territory_code,
            outcomes = outcomes.len(),
            reste_estime = summary.reste_estime,
            "aid estimate computed"
        );

        AidEstimate {
            territory_chain,
            required_facts,
            bracket,
            outcomes,
            summary,
            message: None,
        }
    }

    fn neutral_estimate(&self, context: &RequestContext, message: String) -> AidEstimate {
        let price = if context.activity_price.is_finite() {
            context.activity_price.max(0.0)
        } else {
            0.0
        };

        AidEstimate {
            territory_chain: vec![TerritoryNode::national()],
            required_facts: BTreeSet::new(),
            bracket: not_applicable(),
            outcomes: Vec::new(),
            summary: summarize_with_floor(price, &[], self.config.residual_floor),
            message: Some(message),
        }
    }
}

/// True when an eligible bracket-priced program already carries the reduction.
fn bracket_program_applies(outcomes: &[EligibilityOutcome], programs: &[AidProgram]) -> bool {
    outcomes
        .iter()
        .filter(|outcome| outcome.eligible)
        .any(|outcome| {
            programs.iter().any(|program| {
                program.id == outcome.program_id
                    && matches!(program.amount, AmountRule::Bracket(_))
            })
        })
}

/// A known vacation bracket reduction is a confirmed contribution.
fn bracket_outcome(
    bracket: &BracketReduction,
    context: &RequestContext,
) -> Option<EligibilityOutcome> {
    if context.period_type != PeriodType::Vacation
        || context.income_proxy.is_none()
        || bracket.reduction_percent <= 0.0
    {
        return None;
    }

    let amount = round_cents(context.activity_price * bracket.reduction_percent / 100.0);
    Some(EligibilityOutcome {
        program_id: ProgramId(format!("bracket:{}", bracket.bracket_label)),
        program_name: format!("Vacation pricing ({})", bracket.bracket_label),
        eligible: true,
        confidence: Confidence::High,
        match_score: 100,
        missing_info: Vec::new(),
        estimated_amount_min: amount,
        estimated_amount_max: amount,
        exclusion_reason: None,
    })
}
