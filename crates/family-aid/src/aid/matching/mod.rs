mod amounts;
mod rules;
mod stacking;

use tracing::{debug, warn};

use super::domain::{AidProgram, EligibilityOutcome, RequestContext, TerritoryNode};
use super::snapshot::CatalogSnapshot;
use stacking::Candidate;

/// Match every catalog program against the context.
///
/// Invalid contexts yield no outcomes; malformed programs are skipped.
pub fn match_programs(context: &RequestContext, catalog: &CatalogSnapshot) -> Vec<EligibilityOutcome> {
    if let Err(err) = context.validate() {
        warn!(field = err.field, "aid matching skipped: {err}");
        return Vec::new();
    }

    let chain = catalog.territories().resolve(&context.territory_code);
    match_against_chain(context, catalog.programs(), &chain)
}

pub(crate) fn match_against_chain(
    context: &RequestContext,
    programs: &[AidProgram],
    chain: &[TerritoryNode],
) -> Vec<EligibilityOutcome> {
    let mut candidates = Vec::new();

    for program in programs {
        if let Err(defect) = program.validate() {
            warn!(program_id = %program.id, %defect, "skipping malformed aid program");
            continue;
        }
        if !rules::is_candidate(program, context, chain) {
            continue;
        }

        candidates.push(Candidate {
            level: program.territory_level,
            cumulative: program.cumulative,
            outcome: rules::assess(program, context),
        });
    }

    stacking::apply_stacking(&mut candidates);

    let mut outcomes: Vec<EligibilityOutcome> = candidates
        .into_iter()
        .map(|candidate| candidate.outcome)
        .collect();
    outcomes.sort_by(|a, b| a.program_id.cmp(&b.program_id));

    debug!(
        candidates = outcomes.len(),
        eligible = outcomes.iter().filter(|outcome| outcome.eligible).count(),
        "aid programs matched"
    );

    outcomes
}
