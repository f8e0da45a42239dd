//! Category filtering over loaded tables
//!
//! Every consumer filters the same way: a row belongs to the selection when
//! its trimmed, lowercased category equals the trimmed, lowercased
//! selection label. Scale domains always come from the filtered subset,
//! never the full table.

use itertools::Itertools;
use std::cmp::Ordering;

/// Row match used by every consuming view
pub fn matches_category(raw: &str, selection: &str) -> bool {
    raw.trim().to_lowercase() == selection.trim().to_lowercase()
}

/// Indices of rows whose category matches the selection
pub fn filter_rows(categories: &[String], selection: &str) -> Vec<usize> {
    let wanted = selection.trim().to_lowercase();
    categories
        .iter()
        .enumerate()
        .filter(|(_, category)| category.trim().to_lowercase() == wanted)
        .map(|(idx, _)| idx)
        .collect()
}

/// Min/max of the finite values; None when nothing finite remains
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    use itertools::MinMaxResult::*;
    match values
        .into_iter()
        .filter(|v| v.is_finite())
        .minmax_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    {
        NoElements => None,
        OneElement(v) => Some((v, v)),
        MinMax(lo, hi) => Some((lo, hi)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_ignores_case_and_padding() {
        assert!(matches_category("United States", "united states"));
        assert!(matches_category("  france ", "France"));
        assert!(!matches_category("Congo", "Congo, DR"));
    }

    #[test]
    fn test_filter_rows_picks_matching_indices() {
        let categories = vec![
            "United States".to_string(),
            "Canada".to_string(),
            "united states ".to_string(),
        ];
        assert_eq!(filter_rows(&categories, "united states"), vec![0, 2]);
        assert_eq!(filter_rows(&categories, "canada"), vec![1]);
        // Absent category: empty subset, not an error.
        assert!(filter_rows(&categories, "france").is_empty());
    }

    #[test]
    fn test_extent_comes_from_given_values_only() {
        // The caller passes the filtered subset; the extent must be exactly
        // its min/max, not the full table's.
        let subset = [1971.0, 1970.0, 1972.0];
        assert_eq!(extent(subset), Some((1970.0, 1972.0)));
    }

    #[test]
    fn test_extent_skips_non_finite_values() {
        assert_eq!(
            extent([f64::NAN, 3.0, f64::INFINITY, -1.0]),
            Some((-1.0, 3.0))
        );
        assert_eq!(extent([5.0]), Some((5.0, 5.0)));
        assert_eq!(extent([f64::NAN]), None);
        assert_eq!(extent(std::iter::empty()), None);
    }
}
