use crate::model::CandidateRecord;
use std::collections::HashSet;

/// Derived identity used to collapse one search's in-memory candidate list.
/// Not a persisted uniqueness constraint; catalog-level identity is handled
/// by the merge step.
pub fn dedupe_key(candidate: &CandidateRecord) -> String {
    match candidate.barcode.as_deref() {
        Some(barcode) if !barcode.is_empty() => format!("barcode:{barcode}"),
        _ => format!(
            "name:{}|brand:{}",
            candidate.name.to_lowercase(),
            candidate
                .brand
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
        ),
    }
}

/// Keep the first candidate seen per dedupe key, preserving input order.
/// Callers place high-trust source candidates first, so a key collision is
/// always resolved in favor of the more trusted source.
pub fn dedupe(candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(dedupe_key(candidate)))
        .collect()
}
