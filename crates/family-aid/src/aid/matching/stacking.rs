use std::collections::BTreeMap;

use tracing::debug;

use super::super::domain::{EligibilityOutcome, ProgramId, TerritoryLevel};

pub(crate) struct Candidate {
    pub(crate) level: TerritoryLevel,
    pub(crate) cumulative: bool,
    pub(crate) outcome: EligibilityOutcome,
}

impl Candidate {
    fn competes(&self) -> bool {
        !self.cumulative && self.outcome.eligible
    }
}

/// Keep one non-cumulative program per territory level: the largest
/// `estimatedAmountMax`, ties going to the smallest program id.
pub(crate) fn apply_stacking(candidates: &mut [Candidate]) {
    let mut winners: BTreeMap<TerritoryLevel, (usize, ProgramId)> = BTreeMap::new();

    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.competes() {
            continue;
        }
        let replace = match winners.get(&candidate.level) {
            Some((best, _)) => prefers(&candidate.outcome, &candidates[*best].outcome),
            None => true,
        };
        if replace {
            winners.insert(
                candidate.level,
                (index, candidate.outcome.program_id.clone()),
            );
        }
    }

    for (index, candidate) in candidates.iter_mut().enumerate() {
        if !candidate.competes() {
            continue;
        }
        if let Some((winner, winner_id)) = winners.get(&candidate.level) {
            if *winner != index {
                debug!(
                    program_id = %candidate.outcome.program_id,
                    winner = %winner_id,
                    level = candidate.level.label(),
                    "non-cumulative aid superseded"
                );
                candidate
                    .outcome
                    .exclude(format!("not cumulative with {winner_id}"));
            }
        }
    }
}

fn prefers(challenger: &EligibilityOutcome, incumbent: &EligibilityOutcome) -> bool {
    match challenger
        .estimated_amount_max
        .total_cmp(&incumbent.estimated_amount_max)
    {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => challenger.program_id < incumbent.program_id,
    }
}
