use crate::model::CandidateRecord;

/// Name fragments that mark a record as junk data rather than a real food.
const SUSPECT_NAME_FRAGMENTS: [&str; 4] = ["unknown", "undefined", "product", "test"];

/// Heaviest plausible single serving, in grams.
const MAX_PORTION_GRAMS: f64 = 1000.0;

/// Flag candidates unlikely to be usable. Applied only to candidates from
/// low-trust (community-maintained) sources; high-trust sources bypass this
/// filter entirely.
pub fn is_low_quality(candidate: &CandidateRecord) -> bool {
    has_suspect_name(&candidate.name)
        || has_no_nutrition_signal(candidate)
        || has_implausible_portion(candidate)
        || has_weak_identity(candidate)
}

fn has_suspect_name(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    normalized.chars().count() < 3
        || SUSPECT_NAME_FRAGMENTS
            .iter()
            .any(|fragment| normalized.contains(fragment))
}

fn has_no_nutrition_signal(candidate: &CandidateRecord) -> bool {
    candidate.carbs_g + candidate.protein_g + candidate.fat_g <= 0.0 || candidate.kcal <= 0
}

fn has_implausible_portion(candidate: &CandidateRecord) -> bool {
    match candidate.portion_grams {
        Some(grams) => grams <= 0.0 || grams > MAX_PORTION_GRAMS,
        None => false,
    }
}

// A defaulted serving with no barcode leaves nothing strong to identify
// the record by.
fn has_weak_identity(candidate: &CandidateRecord) -> bool {
    !candidate.serving_provided && candidate.barcode.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use std::collections::HashMap;

    fn candidate(name: &str) -> CandidateRecord {
        CandidateRecord {
            name: name.to_string(),
            brand: None,
            barcode: Some("123456789".to_string()),
            source: Source::OpenFoodFacts,
            portion_label: "1 pot (170 g)".to_string(),
            portion_grams: Some(170.0),
            kcal: 120,
            carbs_g: 6.0,
            protein_g: 15.0,
            fat_g: 3.0,
            micronutrients: HashMap::new(),
            serving_provided: true,
        }
    }

    #[test]
    fn test_usable_candidate_passes() {
        assert!(!is_low_quality(&candidate("Greek Yogurt")));
    }

    #[test]
    fn test_usable_candidate_passes_regardless_of_serving_flag() {
        let mut c = candidate("Greek Yogurt");
        c.serving_provided = false;
        c.portion_grams = None;
        assert!(!is_low_quality(&c));
    }

    #[test]
    fn test_suspect_names_flagged() {
        assert!(is_low_quality(&candidate("Unknown product")));
        assert!(is_low_quality(&candidate("undefined")));
        assert!(is_low_quality(&candidate("TEST ITEM")));
        assert!(is_low_quality(&candidate("ab")));
        assert!(is_low_quality(&candidate("   x  ")));
    }

    #[test]
    fn test_zero_macros_flagged() {
        let mut c = candidate("Diet Soda");
        c.carbs_g = 0.0;
        c.protein_g = 0.0;
        c.fat_g = 0.0;
        assert!(is_low_quality(&c));
    }

    #[test]
    fn test_zero_kcal_flagged() {
        let mut c = candidate("Sparkling Water");
        c.kcal = 0;
        assert!(is_low_quality(&c));
    }

    #[test]
    fn test_implausible_portion_flagged() {
        let mut c = candidate("Bulk Oats");
        c.portion_grams = Some(1500.0);
        assert!(is_low_quality(&c));

        c.portion_grams = Some(-5.0);
        assert!(is_low_quality(&c));

        c.portion_grams = Some(1000.0);
        assert!(!is_low_quality(&c));
    }

    #[test]
    fn test_defaulted_serving_without_barcode_flagged() {
        let mut c = candidate("Greek Yogurt");
        c.serving_provided = false;
        c.barcode = None;
        assert!(is_low_quality(&c));

        // Serving explicitly stated compensates for the missing barcode
        c.serving_provided = true;
        assert!(!is_low_quality(&c));
    }
}
