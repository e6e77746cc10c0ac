//! Income-proxy bracket tables.
//!
//! One table type serves both outcome kinds: percentage reductions on the
//! activity price and fixed euro contributions. Brackets are half-open
//! `[min, max)` ranges, ascending and contiguous from zero, with an open-ended
//! last entry.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::domain::{BracketReduction, PeriodType};

pub const NOT_APPLICABLE_LABEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub label: String,
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    pub value: f64,
}

impl Bracket {
    pub fn new(label: impl Into<String>, min: f64, max: Option<f64>, value: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            value,
        }
    }

    fn contains(&self, income_proxy: f64) -> bool {
        income_proxy >= self.min && self.max.map_or(true, |max| income_proxy < max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTable {
    kind: BracketKind,
    brackets: Vec<Bracket>,
}

impl BracketTable {
    pub fn new(kind: BracketKind, brackets: Vec<Bracket>) -> Result<Self, BracketTableError> {
        let table = Self { kind, brackets };
        table.check()?;
        Ok(table)
    }

    /// Canonical vacation-period reduction table.
    pub fn vacation_default() -> Self {
        Self {
            kind: BracketKind::Percentage,
            brackets: vec![
                Bracket::new("QF 0-449", 0.0, Some(450.0), 50.0),
                Bracket::new("QF 450-699", 450.0, Some(700.0), 30.0),
                Bracket::new("QF 700-999", 700.0, Some(1000.0), 15.0),
                Bracket::new("QF 1000+", 1000.0, None, 0.0),
            ],
        }
    }

    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Verify ordering, coverage of `[0, +inf)` and non-increasing values.
    pub fn check(&self) -> Result<(), BracketTableError> {
        let last_index = match self.brackets.len() {
            0 => return Err(BracketTableError::Empty),
            len => len - 1,
        };

        let first = &self.brackets[0];
        if first.min != 0.0 {
            return Err(BracketTableError::FirstBracketNotAtZero { min: first.min });
        }

        for (index, bracket) in self.brackets.iter().enumerate() {
            if !bracket.min.is_finite() || !bracket.value.is_finite() || bracket.value < 0.0 {
                return Err(BracketTableError::InvalidValue {
                    label: bracket.label.clone(),
                });
            }
            if self.kind == BracketKind::Percentage && bracket.value > 100.0 {
                return Err(BracketTableError::InvalidValue {
                    label: bracket.label.clone(),
                });
            }
            match bracket.max {
                Some(max) if !max.is_finite() || max <= bracket.min => {
                    return Err(BracketTableError::InvalidRange {
                        label: bracket.label.clone(),
                    });
                }
                Some(_) if index == last_index => return Err(BracketTableError::NotOpenEnded),
                None if index != last_index => {
                    return Err(BracketTableError::OpenEndedBeforeLast {
                        label: bracket.label.clone(),
                    });
                }
                _ => {}
            }
        }

        for pair in self.brackets.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            let previous_max = previous.max.unwrap_or(f64::INFINITY);
            if next.min < previous_max {
                return Err(BracketTableError::Overlap {
                    label: next.label.clone(),
                });
            }
            if next.min > previous_max {
                return Err(BracketTableError::Gap {
                    label: next.label.clone(),
                });
            }
            if next.value > previous.value {
                return Err(BracketTableError::IncreasingValue {
                    label: next.label.clone(),
                });
            }
        }

        Ok(())
    }

    /// First bracket containing the income proxy. Unknown or invalid values
    /// fall into the last, least generous bracket.
    pub fn lookup(&self, income_proxy: Option<f64>) -> Option<&Bracket> {
        match income_proxy {
            Some(value) if value.is_finite() && value >= 0.0 => self
                .brackets
                .iter()
                .find(|bracket| bracket.contains(value))
                .or_else(|| self.brackets.last()),
            _ => self.brackets.last(),
        }
    }

    pub fn most_generous(&self) -> Option<&Bracket> {
        self.brackets
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }

    /// Contribution granted by a bracket for an activity price.
    pub fn amount_for(&self, bracket: &Bracket, price: f64) -> f64 {
        match self.kind {
            BracketKind::Percentage => price * bracket.value / 100.0,
            BracketKind::Fixed => bracket.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,
    #[error("first bracket starts at {min} instead of 0")]
    FirstBracketNotAtZero { min: f64 },
    #[error("bracket '{label}' has an invalid value")]
    InvalidValue { label: String },
    #[error("bracket '{label}' has an empty or invalid range")]
    InvalidRange { label: String },
    #[error("bracket '{label}' is open-ended but not last")]
    OpenEndedBeforeLast { label: String },
    #[error("last bracket must be open-ended")]
    NotOpenEnded,
    #[error("bracket '{label}' overlaps the previous bracket")]
    Overlap { label: String },
    #[error("bracket '{label}' leaves a gap after the previous bracket")]
    Gap { label: String },
    #[error("bracket '{label}' grants more than a lower-income bracket")]
    IncreasingValue { label: String },
}

fn vacation_table() -> &'static BracketTable {
    static TABLE: OnceLock<BracketTable> = OnceLock::new();
    TABLE.get_or_init(BracketTable::vacation_default)
}

/// Vacation-period price reduction for an income proxy.
pub fn resolve_bracket_reduction(income_proxy: Option<f64>, period: PeriodType) -> BracketReduction {
    resolve_with_table(vacation_table(), income_proxy, period)
}

pub fn resolve_with_table(
    table: &BracketTable,
    income_proxy: Option<f64>,
    period: PeriodType,
) -> BracketReduction {
    if period == PeriodType::School || table.kind() != BracketKind::Percentage {
        return not_applicable();
    }

    match table.lookup(income_proxy) {
        Some(bracket) => BracketReduction {
            reduction_percent: bracket.value,
            bracket_label: bracket.label.clone(),
        },
        None => not_applicable(),
    }
}

pub fn not_applicable() -> BracketReduction {
    BracketReduction {
        reduction_percent: 0.0,
        bracket_label: NOT_APPLICABLE_LABEL.to_string(),
    }
}
