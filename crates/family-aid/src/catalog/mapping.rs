use super::normalizer::{normalize_label, words};
use crate::aid::ActivityCategory;
use std::collections::BTreeSet;

/// Keyword stems matched against the words of a normalized label. Entries
/// containing a space are matched as phrases.
const KEYWORDS: &[(&str, ActivityCategory)] = &[
    // Sport
    ("sport", ActivityCategory::Sport),
    ("foot", ActivityCategory::Sport),
    ("natation", ActivityCategory::Sport),
    ("judo", ActivityCategory::Sport),
    ("tennis", ActivityCategory::Sport),
    ("basket", ActivityCategory::Sport),
    ("gymnastique", ActivityCategory::Sport),
    ("escalade", ActivityCategory::Sport),
    ("athletisme", ActivityCategory::Sport),
    // Culture
    ("culture", ActivityCategory::Culture),
    ("culturel", ActivityCategory::Culture),
    ("musique", ActivityCategory::Culture),
    ("theatre", ActivityCategory::Culture),
    ("danse", ActivityCategory::Culture),
    ("dessin", ActivityCategory::Culture),
    ("cinema", ActivityCategory::Culture),
    ("artistique", ActivityCategory::Culture),
    ("arts", ActivityCategory::Culture),
    // Leisure
    ("loisir", ActivityCategory::Leisure),
    ("leisure", ActivityCategory::Leisure),
    ("atelier", ActivityCategory::Leisure),
    ("centre aere", ActivityCategory::Leisure),
    // Residential and away stays
    ("vacances", ActivityCategory::Vacation),
    ("vacation", ActivityCategory::Vacation),
    ("sejour", ActivityCategory::Vacation),
    ("colonie", ActivityCategory::Vacation),
    ("holiday", ActivityCategory::Vacation),
    ("mini camp", ActivityCategory::Vacation),
    // Education
    ("scolaire", ActivityCategory::Education),
    ("periscolaire", ActivityCategory::Education),
    ("education", ActivityCategory::Education),
    ("aide aux devoirs", ActivityCategory::Education),
    ("soutien", ActivityCategory::Education),
];

/// Category tags for a free-text catalog label.
pub(crate) fn infer_categories(label: &str) -> BTreeSet<ActivityCategory> {
    let normalized = normalize_label(label);
    let mut categories = BTreeSet::new();

    if let Some(category) = ActivityCategory::parse(&normalized) {
        categories.insert(category);
        return categories;
    }

    for (keyword, category) in KEYWORDS {
        let matched = if keyword.contains(' ') {
            normalized.contains(keyword)
        } else {
            words(&normalized).any(|word| word.starts_with(keyword))
        };
        if matched {
            categories.insert(*category);
        }
    }

    categories
}

/// Union of the tags inferred from a `;`-separated list of labels.
pub(crate) fn infer_category_list(raw: &str) -> BTreeSet<ActivityCategory> {
    raw.split(';')
        .filter(|label| !label.trim().is_empty())
        .flat_map(infer_categories)
        .collect()
}
