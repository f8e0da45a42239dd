//! Country name normalization
//!
//! The boundary document and the measurement tables come from different
//! publishers and disagree on a handful of country spellings. The alias
//! map resolves a boundary-side label to the measurement-side canonical
//! form; every label not in the map is already canonical.

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Raw -> canonical pairs the bundled datasets need
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("England", "United Kingdom"),
    ("United Republic of Tanzania", "Tanzania"),
    ("Democratic Republic of the Congo", "Congo"),
    ("Russian Federation", "Russia"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Viet Nam", "Vietnam"),
    ("Republic of Korea", "South Korea"),
    ("Korea, Republic of", "South Korea"),
];

static BUILTIN: Lazy<CountryAliases> = Lazy::new(|| {
    let mut aliases = CountryAliases::empty();
    for (raw, canonical) in BUILTIN_ALIASES {
        aliases.insert(*raw, *canonical);
    }
    aliases
});

/// Total mapping from raw category labels to canonical ones
#[derive(Debug, Clone)]
pub struct CountryAliases {
    map: AHashMap<String, String>,
}

impl CountryAliases {
    /// An alias map with no entries; normalize is the identity
    pub fn empty() -> Self {
        Self {
            map: AHashMap::new(),
        }
    }

    /// The alias table for the bundled datasets
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.map.insert(raw.into(), canonical.into());
    }

    /// Resolve a label to canonical form; identity for unmapped labels
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for CountryAliases {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_labels_pass_through() {
        let aliases = CountryAliases::builtin();
        assert_eq!(aliases.normalize("France"), "France");
        assert_eq!(aliases.normalize(""), "");
        assert_eq!(aliases.normalize("Atlantis"), "Atlantis");
    }

    #[test]
    fn test_mapped_labels_resolve_and_stay_stable() {
        let aliases = CountryAliases::builtin();
        assert_eq!(aliases.normalize("USA"), "United States");
        assert_eq!(aliases.normalize("Viet Nam"), "Vietnam");
        assert_eq!(aliases.normalize("Korea, Republic of"), "South Korea");
        // Pure: repeated calls agree.
        assert_eq!(aliases.normalize("USA"), aliases.normalize("USA"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        // No canonical form is itself an alias key, so a second pass
        // changes nothing.
        let aliases = CountryAliases::builtin();
        for (raw, canonical) in BUILTIN_ALIASES {
            assert_eq!(aliases.normalize(raw), *canonical);
            assert_eq!(aliases.normalize(canonical), *canonical);
        }
    }

    #[test]
    fn test_custom_entries() {
        let mut aliases = CountryAliases::empty();
        assert!(aliases.is_empty());
        aliases.insert("Holland", "Netherlands");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.normalize("Holland"), "Netherlands");
        assert_eq!(aliases.normalize("Netherlands"), "Netherlands");
    }
}
