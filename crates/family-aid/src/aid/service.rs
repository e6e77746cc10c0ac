use std::collections::BTreeSet;
use std::sync::Arc;

use super::domain::{ActivityCategory, AidProgram, FactId, PeriodType, RequestContext, TerritoryNode};
use super::engine::{AidEngine, AidEstimate};
use super::snapshot::CatalogSnapshot;
use super::EngineConfig;

/// Read-only catalog collaborator. Implementations may cache.
pub trait CatalogSource: Send + Sync {
    fn programs(&self) -> Result<Vec<AidProgram>, CatalogError>;
    fn territories(&self) -> Result<Vec<TerritoryNode>, CatalogError>;
}

/// Error enumeration for catalog fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// In-memory catalog loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    programs: Vec<AidProgram>,
    territories: Vec<TerritoryNode>,
}

impl StaticCatalog {
    pub fn new(programs: Vec<AidProgram>, territories: Vec<TerritoryNode>) -> Self {
        Self {
            programs,
            territories,
        }
    }
}

impl CatalogSource for StaticCatalog {
    fn programs(&self) -> Result<Vec<AidProgram>, CatalogError> {
        Ok(self.programs.clone())
    }

    fn territories(&self) -> Result<Vec<TerritoryNode>, CatalogError> {
        Ok(self.territories.clone())
    }
}

/// Service composing the catalog source with the aid engine.
pub struct AidEstimationService<C> {
    source: Arc<C>,
    engine: Arc<AidEngine>,
}

impl<C> AidEstimationService<C>
where
    C: CatalogSource + 'static,
{
    pub fn new(source: Arc<C>, config: EngineConfig) -> Self {
        Self {
            source,
            engine: Arc::new(AidEngine::new(config)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Fetch both catalogs before any engine call.
    pub fn snapshot(&self) -> Result<CatalogSnapshot, AidServiceError> {
        let programs = self.source.programs()?;
        let territories = self.source.territories()?;
        Ok(CatalogSnapshot::new(programs, territories))
    }

    pub fn estimate(&self, context: &RequestContext) -> Result<AidEstimate, AidServiceError> {
        let snapshot = self.snapshot()?;
        Ok(self.engine.estimate(context, &snapshot))
    }

    pub fn territory_chain(&self, code: &str) -> Result<Vec<TerritoryNode>, AidServiceError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.territories().resolve(code))
    }

    pub fn required_facts(
        &self,
        categories: &BTreeSet<ActivityCategory>,
        period: PeriodType,
        child_age: i32,
        territory_code: &str,
    ) -> BTreeSet<FactId> {
        self.engine
            .gate()
            .required_facts(categories, period, child_age, territory_code)
    }
}

/// Error raised by the estimation service.
#[derive(Debug, thiserror::Error)]
pub enum AidServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
