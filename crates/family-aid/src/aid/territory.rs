use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::domain::{TerritoryLevel, TerritoryNode};

/// Depth of commune -> metropole -> region -> national.
const MAX_CHAIN_DEPTH: usize = 4;

/// Read-only view over the territory catalog.
#[derive(Debug, Clone, Default)]
pub struct TerritoryHierarchy {
    nodes: HashMap<String, TerritoryNode>,
    communes: Vec<String>,
    national: Option<String>,
}

impl TerritoryHierarchy {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = TerritoryNode>,
    {
        let mut hierarchy = Self::default();

        for node in nodes {
            if hierarchy.nodes.contains_key(&node.id) {
                warn!(territory_id = %node.id, "duplicate territory node ignored");
                continue;
            }
            match node.level {
                TerritoryLevel::Commune => hierarchy.communes.push(node.id.clone()),
                TerritoryLevel::National if hierarchy.national.is_none() => {
                    hierarchy.national = Some(node.id.clone());
                }
                _ => {}
            }
            hierarchy.nodes.insert(node.id.clone(), node);
        }

        hierarchy.communes.sort();
        hierarchy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TerritoryNode> {
        self.nodes.get(id)
    }

    /// Scopes applicable to a postal or commune code, most specific first.
    ///
    /// The chain always ends with a national node. An unknown code resolves to
    /// `[national]`, which callers read as "territory not covered".
    pub fn resolve(&self, code: &str) -> Vec<TerritoryNode> {
        let code = code.trim();
        let mut chain = Vec::with_capacity(MAX_CHAIN_DEPTH);

        if let Some(commune) = self.find_commune(code) {
            self.walk_up(commune, &mut chain);
        }

        if chain
            .last()
            .map_or(true, |node| node.level != TerritoryLevel::National)
        {
            chain.push(self.national_node());
        }

        chain
    }

    fn find_commune(&self, code: &str) -> Option<&TerritoryNode> {
        if code.is_empty() {
            return None;
        }

        self.communes
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .find(|node| node.id == code || node.codes.contains(code))
    }

    fn walk_up(&self, start: &TerritoryNode, chain: &mut Vec<TerritoryNode>) {
        let mut visited = HashSet::new();
        let mut current = Some(start);

        while let Some(node) = current {
            if !visited.insert(node.id.as_str()) || chain.len() == MAX_CHAIN_DEPTH {
                warn!(territory_id = %node.id, "territory chain loops or exceeds maximum depth");
                break;
            }
            chain.push(node.clone());

            if node.level == TerritoryLevel::National {
                break;
            }

            current = match node.parent_id.as_deref() {
                Some(parent_id) => {
                    let parent = self.nodes.get(parent_id);
                    if parent.is_none() {
                        warn!(territory_id = %node.id, parent_id, "dangling territory parent");
                    }
                    parent
                }
                None => None,
            };
        }
    }

    fn national_node(&self) -> TerritoryNode {
        self.national
            .as_deref()
            .and_then(|id| self.nodes.get(id))
            .cloned()
            .unwrap_or_else(TerritoryNode::national)
    }
}

/// True when the chain holds at least one local scope.
pub fn is_covered(chain: &[TerritoryNode]) -> bool {
    chain
        .iter()
        .any(|node| node.level != TerritoryLevel::National)
}
