use std::collections::BTreeSet;

use super::common::*;
use crate::aid::domain::{ActivityCategory, FactId, PeriodType};
use crate::aid::{EngineConfig, QuestionGate};

fn gate() -> QuestionGate {
    QuestionGate::new(&EngineConfig::default())
}

fn categories(items: &[ActivityCategory]) -> BTreeSet<ActivityCategory> {
    items.iter().copied().collect()
}

#[test]
fn vacation_period_always_needs_income_proxy() {
    let facts = gate().required_facts(
        &categories(&[ActivityCategory::Culture]),
        PeriodType::Vacation,
        25,
        "75001",
    );

    assert_eq!(facts, BTreeSet::from([FactId::IncomeProxy]));
}

#[test]
fn school_period_needs_income_only_in_sensitive_territories_and_ages() {
    let culture = categories(&[ActivityCategory::Culture]);

    assert!(gate()
        .required_facts(&culture, PeriodType::School, 10, "42100")
        .contains(&FactId::IncomeProxy));
    assert!(gate()
        .required_facts(&culture, PeriodType::School, 3, "42100")
        .contains(&FactId::IncomeProxy));
    assert!(gate()
        .required_facts(&culture, PeriodType::School, 2, "42100")
        .is_empty());
    assert!(gate()
        .required_facts(&culture, PeriodType::School, 18, "42100")
        .is_empty());
    assert!(gate()
        .required_facts(&culture, PeriodType::School, 10, "69001")
        .is_empty());
}

#[test]
fn social_flag_only_for_school_sport_between_six_and_seventeen() {
    let sport = categories(&[ActivityCategory::Sport]);

    assert!(gate()
        .required_facts(&sport, PeriodType::School, 6, "69001")
        .contains(&FactId::SocialFlag));
    assert!(!gate()
        .required_facts(&sport, PeriodType::School, 5, "69001")
        .contains(&FactId::SocialFlag));
    assert!(!gate()
        .required_facts(&sport, PeriodType::Vacation, 10, "69001")
        .contains(&FactId::SocialFlag));
    assert!(!gate()
        .required_facts(
            &categories(&[ActivityCategory::Culture]),
            PeriodType::School,
            10,
            "69001"
        )
        .contains(&FactId::SocialFlag));
}

#[test]
fn benefit_flag_only_for_vacation_stays() {
    let stay = categories(&[ActivityCategory::Vacation]);

    assert_eq!(
        gate().required_facts(&stay, PeriodType::Vacation, 9, "42000"),
        BTreeSet::from([FactId::IncomeProxy, FactId::BenefitRecipientFlag])
    );
    assert!(!gate()
        .required_facts(&stay, PeriodType::School, 9, "42000")
        .contains(&FactId::BenefitRecipientFlag));
    assert!(!gate()
        .required_facts(
            &categories(&[ActivityCategory::Leisure]),
            PeriodType::Vacation,
            9,
            "42000"
        )
        .contains(&FactId::BenefitRecipientFlag));
}

#[test]
fn configured_territory_group_is_honoured() {
    let mut config = EngineConfig::default();
    config.income_sensitive_territories = BTreeSet::from(["690".to_string()]);
    let gate = QuestionGate::new(&config);
    let culture = categories(&[ActivityCategory::Culture]);

    assert!(gate
        .required_facts(&culture, PeriodType::School, 10, "69001")
        .contains(&FactId::IncomeProxy));
    assert!(gate
        .required_facts(&culture, PeriodType::School, 10, "42100")
        .is_empty());
}

#[test]
fn missing_facts_drop_what_the_context_supplies() {
    let mut context = school_sport_context();
    assert_eq!(
        gate().missing_facts(&context),
        BTreeSet::from([FactId::IncomeProxy, FactId::SocialFlag])
    );

    context.income_proxy = Some(600.0);
    context.social_flag = Some(false);
    assert!(gate().missing_facts(&context).is_empty());
    assert_eq!(gate().for_context(&context), gate().for_context(&context));
}

#[test]
fn free_function_uses_the_default_territory_group() {
    let facts = crate::aid::required_facts(
        &categories(&[ActivityCategory::Culture]),
        PeriodType::School,
        8,
        "42400",
    );

    assert_eq!(facts, BTreeSet::from([FactId::IncomeProxy]));
}
