use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::aid::brackets::BracketTable;
use crate::aid::domain::{
    ActivityCategory, AidProgram, AmountRule, Confidence, EligibilityOutcome, PeriodType,
    ProgramId, RequestContext, TerritoryLevel, TerritoryNode,
};
use crate::aid::service::{AidEstimationService, CatalogError, CatalogSource, StaticCatalog};
use crate::aid::snapshot::CatalogSnapshot;
use crate::aid::EngineConfig;

pub(super) fn node(id: &str, level: TerritoryLevel, parent: Option<&str>, codes: &[&str]) -> TerritoryNode {
    TerritoryNode {
        id: id.to_string(),
        level,
        parent_id: parent.map(str::to_string),
        codes: codes.iter().map(|code| code.to_string()).collect(),
    }
}

pub(super) fn territories() -> Vec<TerritoryNode> {
    vec![
        node("france", TerritoryLevel::National, None, &[]),
        node(
            "auvergne-rhone-alpes",
            TerritoryLevel::Region,
            Some("france"),
            &[],
        ),
        node(
            "saint-etienne-metropole",
            TerritoryLevel::Metropole,
            Some("auvergne-rhone-alpes"),
            &[],
        ),
        node(
            "saint-etienne",
            TerritoryLevel::Commune,
            Some("saint-etienne-metropole"),
            &["42000", "42100"],
        ),
        node(
            "firminy",
            TerritoryLevel::Commune,
            Some("saint-etienne-metropole"),
            &["42700"],
        ),
        node("lyon-metropole", TerritoryLevel::Metropole, Some("auvergne-rhone-alpes"), &[]),
        node(
            "lyon",
            TerritoryLevel::Commune,
            Some("lyon-metropole"),
            &["69001", "69002"],
        ),
    ]
}

pub(super) fn program(
    id: &str,
    level: TerritoryLevel,
    codes: &[&str],
    amount: AmountRule,
    categories: &[ActivityCategory],
) -> AidProgram {
    AidProgram {
        id: ProgramId(id.to_string()),
        name: format!("Program {id}"),
        territory_level: level,
        territory_codes: codes.iter().map(|code| code.to_string()).collect(),
        age_min: 3,
        age_max: 17,
        income_ceiling: None,
        amount,
        categories: categories.iter().copied().collect(),
        periods: BTreeSet::new(),
        requires_social_flag: false,
        requires_benefit_recipient: false,
        cumulative: true,
        active: true,
        valid_from: None,
        valid_until: None,
    }
}

pub(super) fn pass_sport() -> AidProgram {
    let mut program = program(
        "pass-sport",
        TerritoryLevel::National,
        &[],
        AmountRule::Fixed(50.0),
        &[ActivityCategory::Sport],
    );
    program.age_min = 6;
    program.periods = BTreeSet::from([PeriodType::School]);
    program.requires_social_flag = true;
    program
}

pub(super) fn metropole_sport() -> AidProgram {
    let mut program = program(
        "sem-sport",
        TerritoryLevel::Metropole,
        &["saint-etienne-metropole"],
        AmountRule::Percentage(20.0),
        &[ActivityCategory::Sport],
    );
    program.income_ceiling = Some(900.0);
    program.cumulative = false;
    program
}

pub(super) fn metropole_culture() -> AidProgram {
    let mut program = program(
        "sem-culture",
        TerritoryLevel::Metropole,
        &["saint-etienne-metropole"],
        AmountRule::Fixed(30.0),
        &[ActivityCategory::Culture],
    );
    program.cumulative = false;
    program
}

pub(super) fn vacation_bracket_aid() -> AidProgram {
    let mut program = program(
        "caf-vacances",
        TerritoryLevel::National,
        &[],
        AmountRule::Bracket(BracketTable::vacation_default()),
        &[ActivityCategory::Vacation, ActivityCategory::Leisure],
    );
    program.periods = BTreeSet::from([PeriodType::Vacation]);
    program.requires_benefit_recipient = true;
    program
}

pub(super) fn commune_stay_aid() -> AidProgram {
    let mut program = program(
        "saint-etienne-sejour",
        TerritoryLevel::Commune,
        &["saint-etienne"],
        AmountRule::PerDay(10.0),
        &[ActivityCategory::Vacation],
    );
    program.periods = BTreeSet::from([PeriodType::Vacation]);
    program
}

pub(super) fn inactive_aid() -> AidProgram {
    let mut program = program(
        "retired",
        TerritoryLevel::National,
        &[],
        AmountRule::Fixed(500.0),
        &[ActivityCategory::Sport, ActivityCategory::Vacation],
    );
    program.active = false;
    program
}

pub(super) fn programs() -> Vec<AidProgram> {
    vec![
        pass_sport(),
        metropole_sport(),
        metropole_culture(),
        vacation_bracket_aid(),
        commune_stay_aid(),
        inactive_aid(),
    ]
}

pub(super) fn snapshot() -> CatalogSnapshot {
    CatalogSnapshot::new(programs(), territories())
}

pub(super) fn school_sport_context() -> RequestContext {
    RequestContext {
        child_age: 10,
        income_proxy: None,
        territory_code: "42100".to_string(),
        social_flag: None,
        benefit_recipient_flag: None,
        activity_price: 120.0,
        activity_categories: BTreeSet::from([ActivityCategory::Sport]),
        period_type: PeriodType::School,
        duration_days: 1,
        as_of: None,
    }
}

pub(super) fn vacation_stay_context() -> RequestContext {
    RequestContext {
        child_age: 9,
        income_proxy: None,
        territory_code: "42000".to_string(),
        social_flag: None,
        benefit_recipient_flag: None,
        activity_price: 400.0,
        activity_categories: BTreeSet::from([ActivityCategory::Vacation]),
        period_type: PeriodType::Vacation,
        duration_days: 5,
        as_of: None,
    }
}

pub(super) fn outcome(id: &str, confidence: Confidence, amount: f64) -> EligibilityOutcome {
    EligibilityOutcome {
        program_id: ProgramId(id.to_string()),
        program_name: id.to_string(),
        eligible: confidence != Confidence::Excluded,
        confidence,
        match_score: 100,
        missing_info: Vec::new(),
        estimated_amount_min: amount,
        estimated_amount_max: amount,
        exclusion_reason: None,
    }
}

pub(super) fn find<'a>(outcomes: &'a [EligibilityOutcome], id: &str) -> &'a EligibilityOutcome {
    outcomes
        .iter()
        .find(|outcome| outcome.program_id.as_str() == id)
        .unwrap_or_else(|| panic!("outcome {id} present"))
}

pub(super) fn build_service() -> AidEstimationService<StaticCatalog> {
    AidEstimationService::new(
        Arc::new(StaticCatalog::new(programs(), territories())),
        EngineConfig::default(),
    )
}

pub(super) struct UnavailableCatalog;

impl CatalogSource for UnavailableCatalog {
    fn programs(&self) -> Result<Vec<AidProgram>, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }

    fn territories(&self) -> Result<Vec<TerritoryNode>, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
