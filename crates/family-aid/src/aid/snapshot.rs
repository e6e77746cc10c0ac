use super::domain::{AidProgram, TerritoryNode};
use super::territory::TerritoryHierarchy;

/// Point-in-time copy of the aid and territory catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    programs: Vec<AidProgram>,
    territories: TerritoryHierarchy,
}

impl CatalogSnapshot {
    pub fn new(programs: Vec<AidProgram>, territories: Vec<TerritoryNode>) -> Self {
        Self {
            programs,
            territories: TerritoryHierarchy::new(territories),
        }
    }

    pub fn programs(&self) -> &[AidProgram] {
        &self.programs
    }

    pub fn territories(&self) -> &TerritoryHierarchy {
        &self.territories
    }
}
