use chrono::NaiveDate;
use family_aid::aid::{
    ActivityCategory, AidProgram, AmountRule, BracketTable, PeriodType, ProgramId,
    StaticCatalog, TerritoryLevel, TerritoryNode,
};
use family_aid::catalog::CatalogImporter;
use family_aid::config::CatalogConfig;
use family_aid::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog from the configured CSV exports, falling back to the built-in
/// demo data for whichever export is not configured.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<StaticCatalog, AppError> {
    let programs = match &config.programs_csv {
        Some(path) => {
            info!(path = %path.display(), "loading aid programs from CSV");
            CatalogImporter::programs_from_path(path)?.records
        }
        None => demo_programs(),
    };
    let territories = match &config.territories_csv {
        Some(path) => {
            info!(path = %path.display(), "loading territories from CSV");
            CatalogImporter::territories_from_path(path)?.records
        }
        None => demo_territories(),
    };

    Ok(StaticCatalog::new(programs, territories))
}

pub(crate) fn demo_catalog() -> StaticCatalog {
    StaticCatalog::new(demo_programs(), demo_territories())
}

fn territory(id: &str, level: TerritoryLevel, parent: Option<&str>, codes: &[&str]) -> TerritoryNode {
    TerritoryNode {
        id: id.to_string(),
        level,
        parent_id: parent.map(str::to_string),
        codes: codes.iter().map(|code| code.to_string()).collect(),
    }
}

pub(crate) fn demo_territories() -> Vec<TerritoryNode> {
    vec![
        territory("france", TerritoryLevel::National, None, &[]),
        territory(
            "auvergne-rhone-alpes",
            TerritoryLevel::Region,
            Some("france"),
            &[],
        ),
        territory(
            "saint-etienne-metropole",
            TerritoryLevel::Metropole,
            Some("auvergne-rhone-alpes"),
            &[],
        ),
        territory(
            "saint-etienne",
            TerritoryLevel::Commune,
            Some("saint-etienne-metropole"),
            &["42000", "42100"],
        ),
        territory(
            "saint-chamond",
            TerritoryLevel::Commune,
            Some("saint-etienne-metropole"),
            &["42400"],
        ),
        territory(
            "lyon-metropole",
            TerritoryLevel::Metropole,
            Some("auvergne-rhone-alpes"),
            &[],
        ),
        territory(
            "lyon",
            TerritoryLevel::Commune,
            Some("lyon-metropole"),
            &["69001", "69002", "69003", "69007"],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn program(
    id: &str,
    name: &str,
    level: TerritoryLevel,
    codes: &[&str],
    ages: (i32, i32),
    amount: AmountRule,
    categories: &[ActivityCategory],
    periods: &[PeriodType],
) -> AidProgram {
    AidProgram {
        id: ProgramId(id.to_string()),
        name: name.to_string(),
        territory_level: level,
        territory_codes: codes.iter().map(|code| code.to_string()).collect(),
        age_min: ages.0,
        age_max: ages.1,
        income_ceiling: None,
        amount,
        categories: categories.iter().copied().collect(),
        periods: periods.iter().copied().collect::<BTreeSet<_>>(),
        requires_social_flag: false,
        requires_benefit_recipient: false,
        cumulative: true,
        active: true,
        valid_from: None,
        valid_until: None,
    }
}

pub(crate) fn demo_programs() -> Vec<AidProgram> {
    let mut pass_sport = program(
        "pass-sport",
        "Pass'Sport",
        TerritoryLevel::National,
        &[],
        (6, 17),
        AmountRule::Fixed(50.0),
        &[ActivityCategory::Sport],
        &[PeriodType::School],
    );
    pass_sport.requires_social_flag = true;

    let mut vacation_aid = program(
        "caf-vacances",
        "Aide aux vacances enfants",
        TerritoryLevel::National,
        &[],
        (3, 17),
        AmountRule::Bracket(BracketTable::vacation_default()),
        &[ActivityCategory::Vacation, ActivityCategory::Leisure],
        &[PeriodType::Vacation],
    );
    vacation_aid.requires_benefit_recipient = true;

    let region_culture = program(
        "region-culture",
        "Pass Culture Région",
        TerritoryLevel::Region,
        &["auvergne-rhone-alpes"],
        (11, 17),
        AmountRule::Fixed(30.0),
        &[ActivityCategory::Culture],
        &[PeriodType::School],
    );

    let mut metropole_sport = program(
        "sem-sport",
        "Coup de pouce sport",
        TerritoryLevel::Metropole,
        &["saint-etienne-metropole"],
        (3, 17),
        AmountRule::Percentage(20.0),
        &[ActivityCategory::Sport],
        &[],
    );
    metropole_sport.income_ceiling = Some(900.0);
    metropole_sport.cumulative = false;

    let mut metropole_leisure = program(
        "sem-loisirs",
        "Coup de pouce loisirs",
        TerritoryLevel::Metropole,
        &["saint-etienne-metropole"],
        (3, 17),
        AmountRule::Fixed(25.0),
        &[ActivityCategory::Leisure, ActivityCategory::Culture],
        &[],
    );
    metropole_leisure.cumulative = false;

    let commune_stay = program(
        "saint-etienne-sejour",
        "Séjours Saint-Étienne",
        TerritoryLevel::Commune,
        &["saint-etienne"],
        (4, 16),
        AmountRule::PerDay(8.0),
        &[ActivityCategory::Vacation],
        &[PeriodType::Vacation],
    );

    let mut lyon_leisure = program(
        "lyon-loisirs",
        "Lyon loisirs",
        TerritoryLevel::Commune,
        &["lyon"],
        (3, 11),
        AmountRule::Fixed(40.0),
        &[ActivityCategory::Leisure],
        &[],
    );
    lyon_leisure.income_ceiling = Some(700.0);

    vec![
        pass_sport,
        vacation_aid,
        region_culture,
        metropole_sport,
        metropole_leisure,
        commune_stay,
        lyon_leisure,
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_category(raw: &str) -> Result<ActivityCategory, String> {
    ActivityCategory::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = ActivityCategory::ordered()
            .iter()
            .map(|category| category.label())
            .collect();
        format!("unknown category '{raw}' (expected one of {})", known.join(", "))
    })
}

pub(crate) fn parse_period(raw: &str) -> Result<PeriodType, String> {
    PeriodType::parse(raw).ok_or_else(|| format!("unknown period '{raw}' (expected school or vacation)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use family_aid::aid::CatalogSource;
    use std::path::PathBuf;

    #[test]
    fn demo_programs_are_well_formed() {
        for program in demo_programs() {
            assert!(program.validate().is_ok(), "{}", program.id);
        }
    }

    #[test]
    fn load_catalog_defaults_to_demo_data() {
        let catalog = load_catalog(&CatalogConfig::default()).expect("demo catalog");

        assert_eq!(
            catalog.programs().expect("programs").len(),
            demo_programs().len()
        );
        assert_eq!(
            catalog.territories().expect("territories").len(),
            demo_territories().len()
        );
        assert_eq!(
            demo_catalog().programs().expect("programs").len(),
            demo_programs().len()
        );
    }

    #[test]
    fn load_catalog_reports_missing_exports() {
        let config = CatalogConfig {
            programs_csv: Some(PathBuf::from("./missing-programs.csv")),
            territories_csv: None,
        };

        assert!(matches!(load_catalog(&config), Err(AppError::Catalog(_))));
    }

    #[test]
    fn value_parsers_accept_known_labels() {
        assert_eq!(parse_category("Sport"), Ok(ActivityCategory::Sport));
        assert!(parse_category("parking").is_err());
        assert_eq!(parse_period("vacances"), Ok(PeriodType::Vacation));
        assert!(parse_period("weekend").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }
}
