use super::common::*;
use crate::aid::domain::{TerritoryLevel, NATIONAL_TERRITORY_ID};
use crate::aid::territory::{is_covered, TerritoryHierarchy};

fn ids(chain: &[crate::aid::TerritoryNode]) -> Vec<&str> {
    chain.iter().map(|node| node.id.as_str()).collect()
}

#[test]
fn resolves_full_chain_from_postal_code() {
    let hierarchy = TerritoryHierarchy::new(territories());

    let chain = hierarchy.resolve("42100");

    assert_eq!(
        ids(&chain),
        vec![
            "saint-etienne",
            "saint-etienne-metropole",
            "auvergne-rhone-alpes",
            "france"
        ]
    );
    assert_eq!(chain[0].level, TerritoryLevel::Commune);
    assert_eq!(chain[3].level, TerritoryLevel::National);
    assert!(is_covered(&chain));
}

#[test]
fn matches_codes_by_containment_and_commune_id() {
    let hierarchy = TerritoryHierarchy::new(territories());

    assert_eq!(hierarchy.resolve(" 42000 ")[0].id, "saint-etienne");
    assert_eq!(hierarchy.resolve("firminy")[0].id, "firminy");
    assert_eq!(hierarchy.resolve("69002")[1].id, "lyon-metropole");
}

#[test]
fn unknown_code_degrades_to_national_only() {
    let hierarchy = TerritoryHierarchy::new(territories());

    let chain = hierarchy.resolve("75001");

    assert_eq!(ids(&chain), vec!["france"]);
    assert!(!is_covered(&chain));
    assert_eq!(ids(&hierarchy.resolve("")), vec!["france"]);
}

#[test]
fn synthesizes_national_node_when_catalog_has_none() {
    let hierarchy = TerritoryHierarchy::new(vec![node(
        "saint-etienne",
        TerritoryLevel::Commune,
        None,
        &["42000"],
    )]);

    let chain = hierarchy.resolve("42000");
    assert_eq!(ids(&chain), vec!["saint-etienne", NATIONAL_TERRITORY_ID]);

    let empty = TerritoryHierarchy::default();
    assert_eq!(ids(&empty.resolve("42000")), vec![NATIONAL_TERRITORY_ID]);
}

#[test]
fn dangling_parent_stops_the_walk() {
    let hierarchy = TerritoryHierarchy::new(vec![node(
        "orphan",
        TerritoryLevel::Commune,
        Some("missing-metropole"),
        &["12345"],
    )]);

    let chain = hierarchy.resolve("12345");

    assert_eq!(ids(&chain), vec!["orphan", NATIONAL_TERRITORY_ID]);
}

#[test]
fn cyclic_parents_do_not_loop() {
    let hierarchy = TerritoryHierarchy::new(vec![
        node("a", TerritoryLevel::Commune, Some("b"), &["11111"]),
        node("b", TerritoryLevel::Metropole, Some("c"), &[]),
        node("c", TerritoryLevel::Region, Some("b"), &[]),
    ]);

    let chain = hierarchy.resolve("11111");

    assert_eq!(ids(&chain), vec!["a", "b", "c", NATIONAL_TERRITORY_ID]);
}

#[test]
fn duplicate_nodes_keep_the_first_definition() {
    let mut nodes = territories();
    nodes.push(node("saint-etienne", TerritoryLevel::Commune, None, &["99999"]));

    let hierarchy = TerritoryHierarchy::new(nodes);

    assert_eq!(hierarchy.len(), territories().len());
    assert_eq!(ids(&hierarchy.resolve("99999")), vec!["france"]);
}
