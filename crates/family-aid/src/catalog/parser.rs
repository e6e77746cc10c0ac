use std::collections::BTreeSet;
use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::mapping::infer_category_list;
use crate::aid::{
    AidProgram, AmountRule, BracketTable, PeriodType, ProgramId, TerritoryLevel, TerritoryNode,
};

/// One CSV row that could not be turned into a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub id: Option<String>,
    pub reason: String,
}

pub(crate) struct ParsedRows<T> {
    pub(crate) records: Vec<T>,
    pub(crate) skipped: Vec<SkippedRow>,
}

pub(crate) fn parse_programs<R: Read>(reader: R) -> Result<ParsedRows<AidProgram>, csv::Error> {
    parse_rows::<R, ProgramRow, AidProgram>(reader, ProgramRow::into_program)
}

pub(crate) fn parse_territories<R: Read>(
    reader: R,
) -> Result<ParsedRows<TerritoryNode>, csv::Error> {
    parse_rows::<R, TerritoryRow, TerritoryNode>(reader, TerritoryRow::into_node)
}

fn parse_rows<R, Row, T>(
    reader: R,
    convert: fn(Row) -> Result<T, RowError>,
) -> Result<ParsedRows<T>, csv::Error>
where
    R: Read,
    Row: for<'de> Deserialize<'de> + RowId,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut parsed = ParsedRows {
        records: Vec::new(),
        skipped: Vec::new(),
    };

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |position| position.line());

        let row: Row = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(err) => {
                parsed.skipped.push(SkippedRow {
                    line,
                    id: None,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let id = row.row_id();
        match convert(row) {
            Ok(entry) => parsed.records.push(entry),
            Err(err) => parsed.skipped.push(SkippedRow {
                line,
                id,
                reason: err.0,
            }),
        }
    }

    Ok(parsed)
}

pub(crate) struct RowError(pub(crate) String);

impl RowError {
    fn missing(field: &str) -> Self {
        Self(format!("missing required field '{field}'"))
    }

    fn invalid(field: &str, value: &str) -> Self {
        Self(format!("invalid value '{value}' for '{field}'"))
    }
}

pub(crate) trait RowId {
    fn row_id(&self) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct ProgramRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    territory_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    territory_codes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age_max: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    income_ceiling: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amount_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amount_value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    categories: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    periods: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cumulative: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requires_social_flag: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requires_benefit_recipient: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    valid_from: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    valid_until: Option<String>,
}

impl RowId for ProgramRow {
    fn row_id(&self) -> Option<String> {
        self.id.clone()
    }
}

impl ProgramRow {
    fn into_program(self) -> Result<AidProgram, RowError> {
        let id = self.id.ok_or_else(|| RowError::missing("id"))?;
        let name = self.name.ok_or_else(|| RowError::missing("name"))?;

        let level_raw = self
            .territory_level
            .ok_or_else(|| RowError::missing("territory_level"))?;
        let territory_level = TerritoryLevel::parse(&level_raw)
            .ok_or_else(|| RowError::invalid("territory_level", &level_raw))?;

        let age_min = parse_required::<i32>("age_min", self.age_min)?;
        let age_max = parse_required::<i32>("age_max", self.age_max)?;
        let income_ceiling = parse_optional::<f64>("income_ceiling", self.income_ceiling)?;

        let amount = parse_amount(self.amount_type, self.amount_value)?;

        let categories_raw = self
            .categories
            .ok_or_else(|| RowError::missing("categories"))?;
        let categories = infer_category_list(&categories_raw);
        if categories.is_empty() {
            return Err(RowError(format!(
                "no known activity category in '{categories_raw}'"
            )));
        }

        let periods = match self.periods {
            Some(raw) => split_list(&raw)
                .map(|value| {
                    PeriodType::parse(value).ok_or_else(|| RowError::invalid("periods", value))
                })
                .collect::<Result<BTreeSet<_>, _>>()?,
            None => BTreeSet::new(),
        };

        let program = AidProgram {
            id: ProgramId(id),
            name,
            territory_level,
            territory_codes: self
                .territory_codes
                .as_deref()
                .map(|raw| split_list(raw).map(str::to_string).collect())
                .unwrap_or_default(),
            age_min,
            age_max,
            income_ceiling,
            amount,
            categories,
            periods,
            requires_social_flag: parse_flag("requires_social_flag", self.requires_social_flag)?
                .unwrap_or(false),
            requires_benefit_recipient: parse_flag(
                "requires_benefit_recipient",
                self.requires_benefit_recipient,
            )?
            .unwrap_or(false),
            cumulative: parse_flag("cumulative", self.cumulative)?.unwrap_or(true),
            active: parse_flag("active", self.active)?.unwrap_or(true),
            valid_from: parse_date("valid_from", self.valid_from)?,
            valid_until: parse_date("valid_until", self.valid_until)?,
        };

        program.validate().map_err(|defect| RowError(defect.to_string()))?;
        Ok(program)
    }
}

fn parse_amount(kind: Option<String>, value: Option<String>) -> Result<AmountRule, RowError> {
    let kind = kind.ok_or_else(|| RowError::missing("amount_type"))?;
    let normalized = kind.trim().to_ascii_lowercase().replace(['-', '_'], "");

    if normalized == "bracket" {
        return Ok(AmountRule::Bracket(BracketTable::vacation_default()));
    }

    let amount = parse_required::<f64>("amount_value", value)?;
    match normalized.as_str() {
        "fixed" | "forfait" => Ok(AmountRule::Fixed(amount)),
        "perday" | "daily" | "parjour" => Ok(AmountRule::PerDay(amount)),
        "percentage" | "percent" | "pourcentage" => Ok(AmountRule::Percentage(amount)),
        _ => Err(RowError::invalid("amount_type", &kind)),
    }
}

#[derive(Debug, Deserialize)]
struct TerritoryRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    parent_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    codes: Option<String>,
}

impl RowId for TerritoryRow {
    fn row_id(&self) -> Option<String> {
        self.id.clone()
    }
}

impl TerritoryRow {
    fn into_node(self) -> Result<TerritoryNode, RowError> {
        let id = self.id.ok_or_else(|| RowError::missing("id"))?;
        let level_raw = self.level.ok_or_else(|| RowError::missing("level"))?;
        let level =
            TerritoryLevel::parse(&level_raw).ok_or_else(|| RowError::invalid("level", &level_raw))?;

        if level != TerritoryLevel::National && self.parent_id.is_none() {
            return Err(RowError::missing("parent_id"));
        }

        Ok(TerritoryNode {
            id,
            level,
            parent_id: self.parent_id,
            codes: self
                .codes
                .as_deref()
                .map(|raw| split_list(raw).map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_required<T: std::str::FromStr>(field: &str, raw: Option<String>) -> Result<T, RowError> {
    let raw = raw.ok_or_else(|| RowError::missing(field))?;
    raw.trim()
        .replace(',', ".")
        .parse::<T>()
        .map_err(|_| RowError::invalid(field, &raw))
}

fn parse_optional<T: std::str::FromStr>(
    field: &str,
    raw: Option<String>,
) -> Result<Option<T>, RowError> {
    raw.map(|value| parse_required(field, Some(value))).transpose()
}

fn parse_flag(field: &str, raw: Option<String>) -> Result<Option<bool>, RowError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "oui" | "1" | "y" => Ok(Some(true)),
        "false" | "no" | "non" | "0" | "n" => Ok(Some(false)),
        _ => Err(RowError::invalid(field, &raw)),
    }
}

fn parse_date(field: &str, raw: Option<String>) -> Result<Option<NaiveDate>, RowError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| RowError::invalid(field, &value))
    })
    .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
