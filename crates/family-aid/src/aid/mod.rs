//! Financial aid resolution: territory scopes, question gating, bracket
//! pricing, program matching and price normalization.

pub mod brackets;
mod config;
pub mod domain;
mod engine;
pub mod matching;
mod questions;
pub mod router;
pub mod service;
mod snapshot;
mod summary;
pub mod territory;

#[cfg(test)]
mod tests;

pub use brackets::{resolve_bracket_reduction, Bracket, BracketKind, BracketTable, BracketTableError};
pub use config::EngineConfig;
pub use domain::{
    ActivityCategory, AidProgram, AmountRule, BracketReduction, Confidence, EligibilityOutcome,
    FactId, InvalidParameters, PeriodType, PricingSummary, ProgramDefect, ProgramId,
    RequestContext, TerritoryLevel, TerritoryNode,
};
pub use engine::{AidEngine, AidEstimate};
pub use matching::match_programs;
pub use questions::QuestionGate;
pub use router::aid_router;
pub use service::{AidEstimationService, AidServiceError, CatalogError, CatalogSource, StaticCatalog};
pub use snapshot::CatalogSnapshot;
pub use summary::{summarize, summarize_with_floor, DEFAULT_RESIDUAL_FLOOR};
pub use territory::TerritoryHierarchy;

/// Facts to collect for an activity under the default engine configuration.
pub fn required_facts(
    categories: &std::collections::BTreeSet<ActivityCategory>,
    period: PeriodType,
    child_age: i32,
    territory_code: &str,
) -> std::collections::BTreeSet<FactId> {
    QuestionGate::new(&EngineConfig::default()).required_facts(
        categories,
        period,
        child_age,
        territory_code,
    )
}

/// Scopes applicable to a postal or commune code, most specific first.
pub fn resolve_territory_chain(hierarchy: &TerritoryHierarchy, code: &str) -> Vec<TerritoryNode> {
    hierarchy.resolve(code)
}
