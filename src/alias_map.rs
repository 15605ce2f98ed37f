use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};

/// Associates commit type aliases (e.g. `ft`, `fix`) with the changelog
/// section they are displayed under (e.g. `"Features"`).
///
/// Section names are stored title-cased. An alias that no section claims
/// always resolves to `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAliasMap {
    sections: IndexMap<String, Vec<String>>,
}

impl Default for SectionAliasMap {
    fn default() -> Self {
        let mut sections = IndexMap::new();
        sections.insert(
            "Features".to_owned(),
            vec!["ft".to_owned(), "feat".to_owned()],
        );
        sections.insert(
            "Bug Fixes".to_owned(),
            vec!["fx".to_owned(), "fix".to_owned()],
        );
        sections.insert("Performance".to_owned(), vec!["perf".to_owned()]);
        sections.insert("Breaking Changes".to_owned(), vec!["breaks".to_owned()]);
        sections.insert("Unknown".to_owned(), vec!["unk".to_owned()]);
        SectionAliasMap { sections }
    }
}

impl SectionAliasMap {
    /// Builds the repository's effective alias map: the default sections
    /// merged with whatever the config declares.
    pub fn from_config(cfg: &crate::config::RawCfg) -> Result<SectionAliasMap> {
        SectionAliasMap::default().merged(&SectionAliasMap {
            sections: cfg.sections.clone(),
        })
    }

    /// Retrieves the section title for a given alias
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::SectionAliasMap;
    /// let map = SectionAliasMap::default();
    /// assert_eq!("Features", map.section_for("feat"));
    /// assert_eq!("Unknown", map.section_for("anything-else"));
    /// ```
    pub fn section_for(&self, alias: &str) -> String {
        self.sections
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a == alias))
            .map(|(title, _)| title_case(title))
            .unwrap_or_else(|| "Unknown".to_owned())
    }

    /// Returns a new map holding the union of `self` and `other`.
    ///
    /// Section names from `other` are title-cased before merging, and merged
    /// tag lists come back deduplicated and sorted. Sections untouched by
    /// `other` keep their original alias order. Registering the same alias
    /// under two different sections is an error, since `section_for` would
    /// otherwise have no deterministic winner.
    pub fn merged(&self, other: &SectionAliasMap) -> Result<SectionAliasMap> {
        let mut merged = self.clone();
        for (title, aliases) in &other.sections {
            let title = title_case(title);
            debug!("merging {} aliases into section {title:?}", aliases.len());
            let entry = merged.sections.entry(title).or_insert_with(Vec::new);
            entry.extend(aliases.iter().cloned());
            entry.sort();
            entry.dedup();
        }

        for (title, aliases) in &merged.sections {
            for alias in aliases {
                if let Some((claimed, _)) = merged
                    .sections
                    .iter()
                    .find(|(t, a)| *t != title && a.iter().any(|x| x == alias))
                {
                    return Err(Error::AliasConflict {
                        alias: alias.clone(),
                        first: title.clone(),
                        second: (*claimed).clone(),
                    });
                }
            }
        }

        Ok(merged)
    }

    /// Produces the filter expression matching every registered alias at the
    /// start of a raw commit type, plus a literal `BREAKING` alternative.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::SectionAliasMap;
    /// let map = SectionAliasMap::default();
    /// assert_eq!("BREAKING|^breaks|^feat|^fix|^ft|^fx|^perf|^unk", map.grep());
    /// ```
    pub fn grep(&self) -> String {
        let mut prefixes = vec!["BREAKING".to_owned()];
        for aliases in self.sections.values() {
            for alias in aliases {
                if alias.is_empty() {
                    continue;
                }
                prefixes.push(format!("^{alias}"));
            }
        }
        prefixes.sort();
        prefixes.join("|")
    }
}

impl<const N: usize> From<[(&str, &[&str]); N]> for SectionAliasMap {
    fn from(arr: [(&str, &[&str]); N]) -> Self {
        let sections = arr
            .iter()
            .map(|(title, aliases)| {
                (
                    (*title).to_owned(),
                    aliases.iter().map(|a| (*a).to_owned()).collect(),
                )
            })
            .collect();
        SectionAliasMap { sections }
    }
}

/// Uppercases the first letter of every whitespace-separated word
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_for_known_and_unknown_aliases() {
        let cases = [
            ("ft", "Features"),
            ("feat", "Features"),
            ("fx", "Bug Fixes"),
            ("fix", "Bug Fixes"),
            ("perf", "Performance"),
            ("unk", "Unknown"),
            ("breaks", "Breaking Changes"),
            ("anything", "Unknown"),
            ("", "Unknown"),
        ];

        let map = SectionAliasMap::default();
        for (alias, want) in cases {
            assert_eq!(map.section_for(alias), want, "alias {alias:?}");
        }
    }

    #[test]
    fn merged_unions_matching_sections() {
        let base = SectionAliasMap::from([("Features", &["new"][..])]);
        let addition = SectionAliasMap::from([("features", &["feat"][..])]);
        let want = SectionAliasMap::from([("Features", &["feat", "new"][..])]);
        assert_eq!(base.merged(&addition).unwrap(), want);
    }

    #[test]
    fn merged_inserts_new_sections_title_cased() {
        let base = SectionAliasMap::from([("Features", &["feat"][..])]);
        let addition = SectionAliasMap::from([("bug fixes", &["fix"][..])]);
        let want =
            SectionAliasMap::from([("Features", &["feat"][..]), ("Bug Fixes", &["fix"][..])]);
        assert_eq!(base.merged(&addition).unwrap(), want);
    }

    #[test]
    fn merged_is_idempotent() {
        let map = SectionAliasMap::default();
        let merged = map.merged(&map).unwrap();
        assert_eq!(map.section_for("feat"), merged.section_for("feat"));
        assert_eq!(map.grep(), merged.grep());
        assert_eq!(merged.merged(&map).unwrap(), merged);
    }

    #[test]
    fn merged_membership_is_commutative() {
        let a = SectionAliasMap::from([("Features", &["new"][..])]);
        let b = SectionAliasMap::from([("Features", &["feat"][..]), ("Docs", &["doc"][..])]);
        let ab = a.merged(&b).unwrap();
        let ba = b.merged(&a).unwrap();
        assert_eq!(ab.grep(), ba.grep());
        assert_eq!(ab.section_for("doc"), ba.section_for("doc"));
        assert_eq!(ab.section_for("new"), ba.section_for("new"));
    }

    #[test]
    fn merged_does_not_mutate_base() {
        let base = SectionAliasMap::default();
        let addition = SectionAliasMap::from([("Docs", &["doc"][..])]);
        let _ = base.merged(&addition).unwrap();
        assert_eq!(base.section_for("doc"), "Unknown");
    }

    #[test]
    fn merged_rejects_alias_claimed_by_two_sections() {
        let base = SectionAliasMap::default();
        let addition = SectionAliasMap::from([("Docs", &["feat"][..])]);
        assert!(matches!(
            base.merged(&addition),
            Err(Error::AliasConflict { alias, .. }) if alias == "feat"
        ));
    }

    #[test]
    fn grep_skips_empty_aliases() {
        let map = SectionAliasMap::from([("Features", &["feat", "new", ""][..])]);
        assert_eq!(map.grep(), "BREAKING|^feat|^new");
    }

    #[test]
    fn grep_is_sorted_and_contains_breaking() {
        let map = SectionAliasMap::from([("Features", &["feat"][..]), ("Bug Fixes", &["fix"][..])]);
        assert_eq!(map.grep(), "BREAKING|^feat|^fix");
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("bug fixes"), "Bug Fixes");
        assert_eq!(title_case("docs"), "Docs");
        assert_eq!(title_case(""), "");
    }
}
