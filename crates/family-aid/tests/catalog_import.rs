//! Catalog exports feed the engine through the CSV importer; malformed rows are
//! reported and skipped without aborting the import.

use std::collections::BTreeSet;
use std::io::Cursor;

use family_aid::aid::{ActivityCategory, AmountRule, PeriodType, TerritoryLevel};
use family_aid::catalog::{CatalogImportError, CatalogImporter};

const PROGRAMS_CSV: &str = include_str!("../fixtures/programs.csv");
const TERRITORIES_CSV: &str = include_str!("../fixtures/territories.csv");

#[test]
fn fixture_programs_import_with_inferred_categories() {
    let imported =
        CatalogImporter::programs_from_reader(Cursor::new(PROGRAMS_CSV)).expect("import programs");

    assert_eq!(imported.records.len(), 8);
    assert_eq!(imported.skipped.len(), 1);
    assert_eq!(imported.skipped[0].id.as_deref(), Some("broken-ages"));

    let caf = imported
        .records
        .iter()
        .find(|program| program.id.as_str() == "caf-vacances")
        .expect("caf program");
    assert_eq!(
        caf.categories,
        BTreeSet::from([ActivityCategory::Leisure, ActivityCategory::Vacation])
    );
    assert!(matches!(caf.amount, AmountRule::Bracket(_)));
    assert_eq!(caf.periods, BTreeSet::from([PeriodType::Vacation]));

    let stay = imported
        .records
        .iter()
        .find(|program| program.id.as_str() == "saint-etienne-sejour")
        .expect("stay program");
    assert_eq!(stay.amount, AmountRule::PerDay(10.0));
    assert!(stay.valid_from.is_some());

    let retired = imported
        .records
        .iter()
        .find(|program| program.id.as_str() == "retired-aid")
        .expect("inactive programs are still imported");
    assert!(!retired.active);
}

#[test]
fn fixture_territories_import_as_a_hierarchy() {
    let imported = CatalogImporter::territories_from_reader(Cursor::new(TERRITORIES_CSV))
        .expect("import territories");

    assert!(imported.skipped.is_empty());
    assert_eq!(imported.records.len(), 7);
    let lyon = imported
        .records
        .iter()
        .find(|node| node.id == "lyon")
        .expect("lyon node");
    assert_eq!(lyon.level, TerritoryLevel::Commune);
    assert_eq!(lyon.codes.len(), 3);
}

#[test]
fn missing_headers_are_reported_per_row() {
    let csv = "identifier,label\npass-sport,Pass'Sport\n";

    let imported = CatalogImporter::programs_from_reader(Cursor::new(csv)).expect("import");

    assert!(imported.records.is_empty());
    assert_eq!(imported.skipped.len(), 1);
}

#[test]
fn missing_files_surface_io_errors() {
    let result = CatalogImporter::static_catalog("missing-programs.csv", "missing-territories.csv");

    assert!(matches!(result, Err(CatalogImportError::Io(_))));
}
