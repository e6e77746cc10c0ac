use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::brackets::{BracketTable, BracketTableError};

/// Identifier wrapper for catalog aid programs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

impl ProgramId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Administrative scope an aid program or territory node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryLevel {
    Commune,
    Metropole,
    Region,
    National,
}

impl TerritoryLevel {
    pub const fn label(self) -> &'static str {
        match self {
            TerritoryLevel::Commune => "commune",
            TerritoryLevel::Metropole => "metropole",
            TerritoryLevel::Region => "region",
            TerritoryLevel::National => "national",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "commune" | "city" | "ville" => Some(Self::Commune),
            "metropole" | "métropole" | "epci" => Some(Self::Metropole),
            "region" | "région" | "department" | "departement" => Some(Self::Region),
            "national" | "nation" | "france" => Some(Self::National),
            _ => None,
        }
    }
}

pub const NATIONAL_TERRITORY_ID: &str = "national";

/// One administrative scope of the territory catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryNode {
    pub id: String,
    pub level: TerritoryLevel,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Postal codes registered for the node; communes usually register several.
    #[serde(default)]
    pub codes: BTreeSet<String>,
}

impl TerritoryNode {
    /// Node appended when the catalog has no national scope of its own.
    pub fn national() -> Self {
        Self {
            id: NATIONAL_TERRITORY_ID.to_string(),
            level: TerritoryLevel::National,
            parent_id: None,
            codes: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    School,
    Vacation,
}

impl PeriodType {
    pub const fn label(self) -> &'static str {
        match self {
            PeriodType::School => "school",
            PeriodType::Vacation => "vacation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "school" | "scolaire" | "school_year" => Some(Self::School),
            "vacation" | "vacances" | "holidays" => Some(Self::Vacation),
            _ => None,
        }
    }
}

/// Category tag attached to activities and programs at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sport,
    Culture,
    Leisure,
    /// Residential or away stay.
    Vacation,
    Education,
}

impl ActivityCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ActivityCategory::Sport => "sport",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Leisure => "leisure",
            ActivityCategory::Vacation => "vacation",
            ActivityCategory::Education => "education",
        }
    }

    pub fn ordered() -> [Self; 5] {
        [
            ActivityCategory::Sport,
            ActivityCategory::Culture,
            ActivityCategory::Leisure,
            ActivityCategory::Vacation,
            ActivityCategory::Education,
        ]
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == normalized)
    }
}

/// Household facts that may have to be collected before an amount is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactId {
    IncomeProxy,
    SocialFlag,
    BenefitRecipientFlag,
}

impl FactId {
    pub const fn label(self) -> &'static str {
        match self {
            FactId::IncomeProxy => "incomeProxy",
            FactId::SocialFlag => "socialFlag",
            FactId::BenefitRecipientFlag => "benefitRecipientFlag",
        }
    }

    pub const fn prompt(self) -> &'static str {
        match self {
            FactId::IncomeProxy => "What is the household family quotient (QF)?",
            FactId::SocialFlag => "Does the family receive the back-to-school allowance (ARS)?",
            FactId::BenefitRecipientFlag => {
                "Is the family a confirmed family-benefit recipient (CAF/MSA)?"
            }
        }
    }
}

/// How a program's contribution is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AmountRule {
    Fixed(f64),
    PerDay(f64),
    Percentage(f64),
    Bracket(BracketTable),
}

impl AmountRule {
    pub fn label(&self) -> &'static str {
        match self {
            AmountRule::Fixed(_) => "fixed",
            AmountRule::PerDay(_) => "perDay",
            AmountRule::Percentage(_) => "percentage",
            AmountRule::Bracket(_) => "bracket",
        }
    }
}

/// Read-only catalog entry describing a subsidy program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidProgram {
    pub id: ProgramId,
    pub name: String,
    pub territory_level: TerritoryLevel,
    #[serde(default)]
    pub territory_codes: BTreeSet<String>,
    pub age_min: i32,
    pub age_max: i32,
    #[serde(default)]
    pub income_ceiling: Option<f64>,
    pub amount: AmountRule,
    pub categories: BTreeSet<ActivityCategory>,
    /// Empty means the program applies to every period.
    #[serde(default)]
    pub periods: BTreeSet<PeriodType>,
    #[serde(default)]
    pub requires_social_flag: bool,
    #[serde(default)]
    pub requires_benefit_recipient: bool,
    pub cumulative: bool,
    pub active: bool,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

impl AidProgram {
    /// Facts the program's eligibility predicate or amount depends on.
    pub fn required_facts(&self) -> BTreeSet<FactId> {
        let mut facts = BTreeSet::new();
        if self.income_ceiling.is_some() || matches!(self.amount, AmountRule::Bracket(_)) {
            facts.insert(FactId::IncomeProxy);
        }
        if self.requires_social_flag {
            facts.insert(FactId::SocialFlag);
        }
        if self.requires_benefit_recipient {
            facts.insert(FactId::BenefitRecipientFlag);
        }
        facts
    }

    pub fn validate(&self) -> Result<(), ProgramDefect> {
        if self.id.0.trim().is_empty() {
            return Err(ProgramDefect::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(ProgramDefect::MissingName);
        }
        if self.age_min < 0 || self.age_min > self.age_max {
            return Err(ProgramDefect::InvalidAgeRange {
                min: self.age_min,
                max: self.age_max,
            });
        }
        if self.categories.is_empty() {
            return Err(ProgramDefect::NoCategories);
        }
        if self.territory_level != TerritoryLevel::National && self.territory_codes.is_empty() {
            return Err(ProgramDefect::MissingTerritoryCodes);
        }
        if let Some(ceiling) = self.income_ceiling {
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(ProgramDefect::InvalidIncomeCeiling(ceiling));
            }
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                return Err(ProgramDefect::InvertedValidity { from, until });
            }
        }
        match &self.amount {
            AmountRule::Fixed(value) | AmountRule::PerDay(value) | AmountRule::Percentage(value) => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ProgramDefect::InvalidAmount(*value));
                }
                if matches!(self.amount, AmountRule::Percentage(_)) && *value > 100.0 {
                    return Err(ProgramDefect::InvalidAmount(*value));
                }
            }
            AmountRule::Bracket(table) => table.check()?,
        }
        Ok(())
    }
}

/// Reasons a catalog entry is skipped as malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgramDefect {
    #[error("program id is empty")]
    MissingId,
    #[error("program name is empty")]
    MissingName,
    #[error("age range {min}..={max} is invalid")]
    InvalidAgeRange { min: i32, max: i32 },
    #[error("program lists no activity categories")]
    NoCategories,
    #[error("non-national program lists no territory codes")]
    MissingTerritoryCodes,
    #[error("income ceiling {0} is invalid")]
    InvalidIncomeCeiling(f64),
    #[error("amount value {0} is invalid")]
    InvalidAmount(f64),
    #[error("validity window {from} -> {until} is inverted")]
    InvertedValidity { from: NaiveDate, until: NaiveDate },
    #[error("bracket table is malformed: {0}")]
    Brackets(#[from] BracketTableError),
}

fn default_duration_days() -> i32 {
    1
}

/// Per-evaluation family and activity context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub child_age: i32,
    #[serde(default)]
    pub income_proxy: Option<f64>,
    pub territory_code: String,
    #[serde(default)]
    pub social_flag: Option<bool>,
    #[serde(default)]
    pub benefit_recipient_flag: Option<bool>,
    pub activity_price: f64,
    pub activity_categories: BTreeSet<ActivityCategory>,
    pub period_type: PeriodType,
    #[serde(default = "default_duration_days")]
    pub duration_days: i32,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl RequestContext {
    pub fn knows(&self, fact: FactId) -> bool {
        match fact {
            FactId::IncomeProxy => self.income_proxy.is_some(),
            FactId::SocialFlag => self.social_flag.is_some(),
            FactId::BenefitRecipientFlag => self.benefit_recipient_flag.is_some(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidParameters> {
        if self.child_age < 0 {
            return Err(InvalidParameters { field: "childAge" });
        }
        if !self.activity_price.is_finite() || self.activity_price < 0.0 {
            return Err(InvalidParameters {
                field: "activityPrice",
            });
        }
        if self
            .income_proxy
            .is_some_and(|income| !income.is_finite() || income < 0.0)
        {
            return Err(InvalidParameters {
                field: "incomeProxy",
            });
        }
        if self.duration_days < 0 {
            return Err(InvalidParameters {
                field: "durationDays",
            });
        }
        Ok(())
    }
}

/// Out-of-range request input. Estimation degrades to a neutral result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameters")]
pub struct InvalidParameters {
    pub field: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Excluded,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::Excluded => "excluded",
        }
    }

    pub const fn is_confirmed(self) -> bool {
        matches!(self, Confidence::High)
    }

    pub const fn is_potential(self) -> bool {
        matches!(self, Confidence::Medium | Confidence::Low)
    }
}

/// Matcher verdict for one candidate program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityOutcome {
    pub program_id: ProgramId,
    #[serde(default)]
    pub program_name: String,
    pub eligible: bool,
    pub confidence: Confidence,
    pub match_score: u8,
    #[serde(default)]
    pub missing_info: Vec<FactId>,
    pub estimated_amount_min: f64,
    pub estimated_amount_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_reason: Option<String>,
}

impl EligibilityOutcome {
    pub(crate) fn exclude(&mut self, reason: String) {
        self.eligible = false;
        self.confidence = Confidence::Excluded;
        self.estimated_amount_min = 0.0;
        self.estimated_amount_max = 0.0;
        self.exclusion_reason = Some(reason);
    }
}

/// Price breakdown shown next to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub price_initial: f64,
    pub confirmed_aid_total: f64,
    pub reste_actuel: f64,
    pub potential_aid_total: f64,
    pub reste_estime: f64,
    pub has_confirmed_aids: bool,
    pub has_potential_aids: bool,
    pub savings_percent: u32,
    pub potential_savings_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketReduction {
    pub reduction_percent: f64,
    pub bracket_label: String,
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
