use serde_json::{Map, Value};

/// Suffix used by keyed nutrient maps for per-100g variants
/// (e.g. `energy-kcal` vs `energy-kcal_100g`).
pub const PER_100G_SUFFIX: &str = "_100g";

/// The four macros every candidate must carry. Values are always finite
/// and non-negative; anything missing or malformed resolves to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacroNutrients {
    pub kcal: i32,
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
}

/// Resolve macros from a keyed nutrient map (Open Food Facts style
/// `nutriments` object). Each lookup tries the exact key first, then the
/// per-100g variant; energy tries the kcal-specific key before the generic
/// energy key.
pub fn resolve_keyed_map(nutriments: &Map<String, Value>) -> MacroNutrients {
    let kcal = lookup_keyed(nutriments, "energy-kcal")
        .or_else(|| lookup_keyed(nutriments, "energy"))
        .unwrap_or(0.0);
    let carbs = lookup_keyed(nutriments, "carbohydrates").unwrap_or(0.0);
    let protein = lookup_keyed(nutriments, "proteins").unwrap_or(0.0);
    let fat = lookup_keyed(nutriments, "fat").unwrap_or(0.0);

    MacroNutrients {
        kcal: round_kcal(kcal),
        carbs_g: round_macro(carbs),
        protein_g: round_macro(protein),
        fat_g: round_macro(fat),
    }
}

/// Resolve macros from a flat list of named nutrients (USDA style). The
/// first entry whose name case-insensitively contains the target substring
/// wins; units are taken at face value.
pub fn resolve_named_list(entries: &[(&str, f64)]) -> MacroNutrients {
    MacroNutrients {
        kcal: round_kcal(find_named(entries, "energy").unwrap_or(0.0)),
        carbs_g: round_macro(find_named(entries, "carbohydrate").unwrap_or(0.0)),
        protein_g: round_macro(find_named(entries, "protein").unwrap_or(0.0)),
        fat_g: round_macro(find_named(entries, "fat").unwrap_or(0.0)),
    }
}

/// Look up a nutrient by exact key, then by the per-100g variant, returning
/// the first finite numeric hit.
pub fn lookup_keyed(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key)
        .and_then(numeric)
        .or_else(|| map.get(&format!("{key}{PER_100G_SUFFIX}")).and_then(numeric))
}

fn find_named(entries: &[(&str, f64)], target: &str) -> Option<f64> {
    entries
        .iter()
        .find(|(name, _)| name.to_lowercase().contains(target))
        .map(|(_, value)| *value)
        .filter(|v| v.is_finite())
}

/// Keyed maps carry numbers both as JSON numbers and as numeric strings.
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn round_kcal(value: f64) -> i32 {
    value.max(0.0).round() as i32
}

fn round_macro(value: f64) -> f64 {
    (value.max(0.0) * 10.0).round() / 10.0
}
