//! Frequency counting with first-seen tie order.

use indexmap::IndexMap;

/// Counts occurrences, remembering the order values were first seen.
pub fn tally<'a>(values: impl IntoIterator<Item = &'a str>) -> IndexMap<&'a str, u64> {
    let mut counts = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// The most frequent value. Ties go to whichever was seen first.
pub fn most_common<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    for (value, count) in tally(values) {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Counts sorted most frequent first. Ties keep first-seen order.
pub fn ranked<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, u64)> {
    let mut counts = tally(values).into_iter().collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_most_frequent() {
        assert_eq!(most_common(["a", "b", "b", "c"]), Some("b"));
    }

    #[test]
    fn tie_goes_to_first_seen() {
        assert_eq!(most_common(["Warning", "Citation", "Citation", "Warning"]), Some("Warning"));
        assert_eq!(most_common(["z", "a"]), Some("z"));
    }

    #[test]
    fn empty_has_no_mode() {
        assert_eq!(most_common(std::iter::empty()), None);
    }

    #[test]
    fn ranked_is_stable_for_ties() {
        let ranked = ranked(["x", "y", "z", "y", "z", "w"]);
        assert_eq!(ranked, vec![("y", 2), ("z", 2), ("x", 1), ("w", 1)]);
    }
}
