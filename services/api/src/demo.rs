use crate::infra::{demo_catalog, load_catalog, parse_category, parse_date, parse_period};
use chrono::NaiveDate;
use clap::Args;
use family_aid::aid::{
    ActivityCategory, AidEstimate, AidEstimationService, CatalogSource, Confidence,
    EngineConfig, PeriodType, RequestContext,
};
use family_aid::aid::territory::is_covered;
use family_aid::config::AppConfig;
use family_aid::error::AppError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Child age in whole years
    #[arg(long)]
    pub(crate) age: i32,
    /// Postal or commune code of the family's residence
    #[arg(long)]
    pub(crate) territory: String,
    /// Activity price in euros
    #[arg(long)]
    pub(crate) price: f64,
    /// Activity category (repeat for several: sport, culture, leisure, vacation, education)
    #[arg(long = "category", required = true, value_parser = parse_category)]
    pub(crate) categories: Vec<ActivityCategory>,
    /// Period of the activity (school or vacation)
    #[arg(long, value_parser = parse_period, default_value = "school")]
    pub(crate) period: PeriodType,
    /// Household family quotient, when known
    #[arg(long)]
    pub(crate) income_proxy: Option<f64>,
    /// Whether the family receives the back-to-school allowance
    #[arg(long)]
    pub(crate) social_flag: Option<bool>,
    /// Whether the family is a confirmed family-benefit recipient
    #[arg(long)]
    pub(crate) benefit_recipient: Option<bool>,
    /// Number of activity days
    #[arg(long, default_value_t = 1)]
    pub(crate) duration_days: i32,
    /// Reference date for program validity windows (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Aid program CSV export (overrides AID_PROGRAMS_CSV)
    #[arg(long)]
    pub(crate) programs_csv: Option<PathBuf>,
    /// Territory CSV export (overrides AID_TERRITORIES_CSV)
    #[arg(long)]
    pub(crate) territories_csv: Option<PathBuf>,
    /// Print the estimate as JSON instead of a breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Household family quotient used for the "known facts" pass
    #[arg(long, default_value_t = 520.0)]
    pub(crate) income: f64,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.programs_csv.clone() {
        config.catalog.programs_csv = Some(path);
    }
    if let Some(path) = args.territories_csv.clone() {
        config.catalog.territories_csv = Some(path);
    }

    let service = AidEstimationService::new(
        Arc::new(load_catalog(&config.catalog)?),
        config.engine,
    );
    let context = RequestContext {
        child_age: args.age,
        income_proxy: args.income_proxy,
        territory_code: args.territory,
        social_flag: args.social_flag,
        benefit_recipient_flag: args.benefit_recipient,
        activity_price: args.price,
        activity_categories: args.categories.into_iter().collect(),
        period_type: args.period,
        duration_days: args.duration_days,
        as_of: args.as_of,
    };

    let estimate = service.estimate(&context)?;
    if args.json {
        match serde_json::to_string_pretty(&estimate) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Estimate could not be serialized: {err}"),
        }
    } else {
        render_estimate(&context, &estimate);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = AidEstimationService::new(Arc::new(demo_catalog()), EngineConfig::default());

    println!("Family aid demo");
    render_catalog(&service)?;

    for (title, context) in demo_families(args.income) {
        println!("\n== {title} ==");
        let estimate = service.estimate(&context)?;
        render_estimate(&context, &estimate);
    }

    Ok(())
}

fn demo_families(income: f64) -> Vec<(&'static str, RequestContext)> {
    let football = RequestContext {
        child_age: 10,
        income_proxy: None,
        territory_code: "42100".to_string(),
        social_flag: None,
        benefit_recipient_flag: None,
        activity_price: 180.0,
        activity_categories: BTreeSet::from([ActivityCategory::Sport]),
        period_type: PeriodType::School,
        duration_days: 1,
        as_of: None,
    };
    let football_known = RequestContext {
        income_proxy: Some(income),
        social_flag: Some(true),
        ..football.clone()
    };
    let summer_camp = RequestContext {
        child_age: 9,
        income_proxy: Some(income),
        territory_code: "42000".to_string(),
        social_flag: None,
        benefit_recipient_flag: Some(true),
        activity_price: 420.0,
        activity_categories: BTreeSet::from([ActivityCategory::Vacation]),
        period_type: PeriodType::Vacation,
        duration_days: 6,
        as_of: None,
    };
    let uncovered = RequestContext {
        child_age: 12,
        income_proxy: None,
        territory_code: "13001".to_string(),
        social_flag: None,
        benefit_recipient_flag: None,
        activity_price: 95.0,
        activity_categories: BTreeSet::from([ActivityCategory::Sport]),
        period_type: PeriodType::School,
        duration_days: 1,
        as_of: None,
    };

    vec![
        ("Football club, nothing declared yet", football),
        ("Football club, household facts declared", football_known),
        ("Summer camp with known family quotient", summer_camp),
        ("Sport outside the covered territories", uncovered),
    ]
}

fn render_catalog<C>(service: &AidEstimationService<C>) -> Result<(), AppError>
where
    C: CatalogSource + 'static,
{
    let snapshot = service.snapshot()?;
    println!(
        "Catalog: {} programs across {} territory nodes",
        snapshot.programs().len(),
        snapshot.territories().len()
    );
    for program in snapshot.programs() {
        let stacking = if program.cumulative {
            "cumulative"
        } else {
            "exclusive"
        };
        println!(
            "  - {} [{} | {} | {}]",
            program.name,
            program.territory_level.label(),
            program.amount.label(),
            stacking
        );
    }
    Ok(())
}

pub(crate) fn render_estimate(context: &RequestContext, estimate: &AidEstimate) {
    let categories: Vec<&str> = context
        .activity_categories
        .iter()
        .map(|category| category.label())
        .collect();
    println!(
        "Activity: {} | {} period | {:.2} EUR | child aged {}",
        categories.join(", "),
        context.period_type.label(),
        context.activity_price,
        context.child_age
    );

    if let Some(message) = &estimate.message {
        println!("Estimate unavailable: {message}");
        return;
    }

    let chain: Vec<&str> = estimate
        .territory_chain
        .iter()
        .map(|node| node.id.as_str())
        .collect();
    let covered = is_covered(&estimate.territory_chain);
    println!(
        "Territory {}: {}{}",
        context.territory_code,
        chain.join(" > "),
        if covered { "" } else { " (not covered locally)" }
    );

    if estimate.required_facts.is_empty() {
        println!("Questions to ask: none");
    } else {
        println!("Questions to ask:");
        for fact in &estimate.required_facts {
            let state = if context.knows(*fact) {
                "answered"
            } else {
                "missing"
            };
            println!("  - {} ({state})", fact.prompt());
        }
    }

    println!(
        "Vacation pricing: {} ({:.0}% reduction)",
        estimate.bracket.bracket_label, estimate.bracket.reduction_percent
    );

    if estimate.outcomes.is_empty() {
        println!("Aid programs: none apply");
    } else {
        println!("Aid programs:");
        for outcome in &estimate.outcomes {
            let amount = if outcome.estimated_amount_min == outcome.estimated_amount_max {
                format!("{:.2} EUR", outcome.estimated_amount_max)
            } else {
                format!(
                    "{:.2}-{:.2} EUR",
                    outcome.estimated_amount_min, outcome.estimated_amount_max
                )
            };
            match outcome.confidence {
                Confidence::Excluded => println!(
                    "  - {}: excluded ({})",
                    outcome.program_name,
                    outcome.exclusion_reason.as_deref().unwrap_or("not eligible")
                ),
                confidence => println!(
                    "  - {}: {} [{} confidence, {}% of facts known]",
                    outcome.program_name,
                    amount,
                    confidence.label(),
                    outcome.match_score
                ),
            }
        }
    }

    let summary = &estimate.summary;
    println!(
        "Price {:.2} EUR | confirmed aid {:.2} EUR ({}%) | you pay {:.2} EUR",
        summary.price_initial,
        summary.confirmed_aid_total,
        summary.savings_percent,
        summary.reste_actuel
    );
    if summary.has_potential_aids {
        println!(
            "Potential aid {:.2} EUR | could drop to {:.2} EUR ({}% total savings)",
            summary.potential_aid_total, summary.reste_estime, summary.potential_savings_percent
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_families_produce_estimates() {
        let service =
            AidEstimationService::new(Arc::new(demo_catalog()), EngineConfig::default());

        for (title, context) in demo_families(520.0) {
            let estimate = service.estimate(&context).expect("estimate");
            assert!(estimate.message.is_none(), "{title}");
            assert!(estimate.summary.reste_estime >= 0.0, "{title}");
        }
    }

    #[test]
    fn declared_facts_confirm_the_football_aids() {
        let service =
            AidEstimationService::new(Arc::new(demo_catalog()), EngineConfig::default());
        let families = demo_families(520.0);

        let unknown = service.estimate(&families[0].1).expect("estimate");
        let known = service.estimate(&families[1].1).expect("estimate");

        assert!(!unknown.summary.has_confirmed_aids);
        assert!(unknown.summary.has_potential_aids);
        assert_eq!(known.summary.confirmed_aid_total, 86.0);
        assert_eq!(known.summary.reste_actuel, 94.0);
    }

    #[test]
    fn demo_families_cover_local_and_national_only_territories() {
        let service =
            AidEstimationService::new(Arc::new(demo_catalog()), EngineConfig::default());
        let families = demo_families(520.0);

        let local = service.estimate(&families[0].1).expect("estimate");
        let elsewhere = service.estimate(&families[3].1).expect("estimate");

        assert!(is_covered(&local.territory_chain));
        assert!(!is_covered(&elsewhere.territory_chain));
    }

    #[test]
    fn demo_runs_against_builtin_catalog() {
        assert!(run_demo(DemoArgs { income: 520.0 }).is_ok());
    }
}
