use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::config::EngineConfig;
use super::domain::{ActivityCategory, FactId, PeriodType, RequestContext};

const SCHOOL_INCOME_AGES: RangeInclusive<i32> = 3..=17;
const SPORT_SOCIAL_AGES: RangeInclusive<i32> = 6..=17;

/// Decides which household facts must be asked before amounts can be confirmed.
///
/// Income data is only requested when some program could use it.
#[derive(Debug, Clone, Default)]
pub struct QuestionGate {
    income_sensitive_territories: BTreeSet<String>,
}

impl QuestionGate {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            income_sensitive_territories: config.income_sensitive_territories.clone(),
        }
    }

    pub fn required_facts(
        &self,
        categories: &BTreeSet<ActivityCategory>,
        period: PeriodType,
        child_age: i32,
        territory_code: &str,
    ) -> BTreeSet<FactId> {
        let mut facts = BTreeSet::new();

        let income_sensitive_school = period == PeriodType::School
            && self.is_income_sensitive(territory_code)
            && SCHOOL_INCOME_AGES.contains(&child_age);
        if period == PeriodType::Vacation || income_sensitive_school {
            facts.insert(FactId::IncomeProxy);
        }

        if period == PeriodType::School
            && categories.contains(&ActivityCategory::Sport)
            && SPORT_SOCIAL_AGES.contains(&child_age)
        {
            facts.insert(FactId::SocialFlag);
        }

        if period == PeriodType::Vacation && categories.contains(&ActivityCategory::Vacation) {
            facts.insert(FactId::BenefitRecipientFlag);
        }

        facts
    }

    pub fn for_context(&self, context: &RequestContext) -> BTreeSet<FactId> {
        self.required_facts(
            &context.activity_categories,
            context.period_type,
            context.child_age,
            &context.territory_code,
        )
    }

    /// Required facts the context has not supplied yet.
    pub fn missing_facts(&self, context: &RequestContext) -> BTreeSet<FactId> {
        self.for_context(context)
            .into_iter()
            .filter(|fact| !context.knows(*fact))
            .collect()
    }

    fn is_income_sensitive(&self, territory_code: &str) -> bool {
        let code = territory_code.trim();
        !code.is_empty()
            && self
                .income_sensitive_territories
                .iter()
                .any(|prefix| code.starts_with(prefix.as_str()))
    }
}
