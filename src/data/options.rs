// ---------------------------------------------------------------------------
// Category option lists for the multiselect widgets
// ---------------------------------------------------------------------------

/// Drop exact duplicates, then sort by a lowercase key.
///
/// Distinct literals that differ only in case (`"Alpha"`, `"alpha"`) both
/// survive. The sort is stable, so such pairs keep their first-seen order.
pub fn sorted_unique_case_insensitive<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<String> = values
        .into_iter()
        .filter_map(|v| {
            let v = v.as_ref();
            seen.insert(v.to_string()).then(|| v.to_string())
        })
        .collect();
    unique.sort_by_cached_key(|v| v.to_lowercase());
    unique
}
