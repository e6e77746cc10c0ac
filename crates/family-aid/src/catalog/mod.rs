//! CSV import of aid programs and territory nodes.
//!
//! Free-text category labels from the exports are mapped to
//! [`ActivityCategory`](crate::aid::ActivityCategory) tags here, once, so the
//! engine never matches on keywords at runtime.

mod mapping;
mod normalizer;
mod parser;

use crate::aid::{AidProgram, StaticCatalog, TerritoryNode};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub use parser::SkippedRow;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Entries imported from one export plus the rows that were rejected.
#[derive(Debug, Clone)]
pub struct Imported<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> Imported<T> {
    fn from_parsed(parsed: parser::ParsedRows<T>, source: &'static str) -> Self {
        for row in &parsed.skipped {
            warn!(
                source,
                line = row.line,
                id = row.id.as_deref().unwrap_or("-"),
                reason = %row.reason,
                "catalog row skipped"
            );
        }
        info!(
            source,
            imported = parsed.records.len(),
            skipped = parsed.skipped.len(),
            "catalog export imported"
        );

        Self {
            records: parsed.records,
            skipped: parsed.skipped,
        }
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn programs_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Imported<AidProgram>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::programs_from_reader(file)
    }

    pub fn programs_from_reader<R: Read>(
        reader: R,
    ) -> Result<Imported<AidProgram>, CatalogImportError> {
        let parsed = parser::parse_programs(reader)?;
        Ok(Imported::from_parsed(parsed, "programs"))
    }

    pub fn territories_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Imported<TerritoryNode>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::territories_from_reader(file)
    }

    pub fn territories_from_reader<R: Read>(
        reader: R,
    ) -> Result<Imported<TerritoryNode>, CatalogImportError> {
        let parsed = parser::parse_territories(reader)?;
        Ok(Imported::from_parsed(parsed, "territories"))
    }

    /// Build an in-memory catalog from both exports.
    pub fn static_catalog<P, Q>(programs: P, territories: Q) -> Result<StaticCatalog, CatalogImportError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let programs = Self::programs_from_path(programs)?;
        let territories = Self::territories_from_path(territories)?;
        Ok(StaticCatalog::new(programs.records, territories.records))
    }
}
