use std::collections::{BTreeMap, HashMap};

use crate::git::{Commit, Commits};

/// The second level of the changelog, i.e. the components -> commit information
pub type ComponentMap = BTreeMap<String, Commits>;

/// The default order sections appear in the changelog
pub const DEFAULT_ORDER: [&str; 5] = [
    "Features",
    "Bug Fixes",
    "Performance",
    "Breaking Changes",
    "Unknown",
];

/// A struct which holds the sections -> components -> commits structure of a
/// changelog, along with the order the sections are written in
#[derive(Debug, Clone)]
pub struct SectionMap {
    /// The top level map of the changelog, i.e. sections -> components
    pub sections: HashMap<String, ComponentMap>,
    order: Vec<String>,
}

impl SectionMap {
    /// Creates a section map from a vector of classified commits, which we can
    /// then iterate through and write.
    ///
    /// A commit with a non-empty `breaks` list is inserted under
    /// `"Breaking Changes"` in addition to its own section. The order starts
    /// out as `DEFAULT_ORDER` restricted to the sections actually present.
    pub fn from_commits(commits: Commits) -> SectionMap {
        let mut sm = SectionMap {
            sections: HashMap::new(),
            order: vec![],
        };

        for entry in commits {
            if !entry.breaks.is_empty() {
                sm.insert("Breaking Changes", entry.clone());
            }
            sm.insert(&entry.commit_type.clone(), entry);
        }

        let default: Vec<String> = DEFAULT_ORDER.iter().map(|s| (*s).to_owned()).collect();
        sm.set_order(&default);
        sm
    }

    fn insert(&mut self, section: &str, entry: Commit) {
        self.sections
            .entry(section.to_owned())
            .or_insert_with(BTreeMap::new)
            .entry(entry.component.clone())
            .or_insert_with(Vec::new)
            .push(entry);
    }

    /// Returns the order the sections will appear in the changelog
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Sets the order of the sections in the changelog. Entries naming a
    /// section that isn't present are discarded, any present sections not
    /// listed are appended alphabetically, and `"Unknown"` always comes last.
    pub fn set_order(&mut self, order: &[String]) {
        let mut new_order = vec![];

        for section in order {
            if section == "Unknown" || !self.sections.contains_key(section) {
                continue;
            }
            if !new_order.contains(section) {
                new_order.push(section.clone());
            }
        }

        let mut additional: Vec<String> = self
            .sections
            .keys()
            .filter(|s| *s != "Unknown" && !new_order.contains(s))
            .cloned()
            .collect();
        additional.sort();
        new_order.append(&mut additional);

        if self.sections.contains_key("Unknown") {
            new_order.push("Unknown".to_owned());
        }

        self.order = new_order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(section: &str, component: &str, breaks: Vec<String>) -> Commit {
        Commit {
            hash: "029aafdc7579af19b3ce6acf0ce245a230633953".into(),
            subject: "Initial Commit".into(),
            component: component.into(),
            breaks,
            commit_type: section.into(),
            ..Commit::default()
        }
    }

    #[test]
    fn from_commits_groups_by_section_and_component() {
        let entry = commit("Features", "README", vec![]);
        let sm = SectionMap::from_commits(vec![entry.clone()]);

        assert_eq!(sm.sections.len(), 1);
        let components = &sm.sections["Features"];
        assert_eq!(components["README"], vec![entry]);
        assert_eq!(sm.order(), ["Features"]);
    }

    #[test]
    fn breaking_commit_lands_in_two_sections() {
        let entry = commit("Features", "api", vec!["1".into()]);
        let sm = SectionMap::from_commits(vec![entry]);

        assert!(sm.sections.contains_key("Features"));
        assert!(sm.sections.contains_key("Breaking Changes"));
        assert_eq!(sm.sections["Breaking Changes"]["api"].len(), 1);
    }

    #[test]
    fn commits_keep_insertion_order_within_a_component() {
        let mut first = commit("Features", "core", vec![]);
        first.subject = "first".into();
        let mut second = commit("Features", "core", vec![]);
        second.subject = "second".into();

        let sm = SectionMap::from_commits(vec![first, second]);
        let subjects: Vec<_> = sm.sections["Features"]["core"]
            .iter()
            .map(|c| c.subject.as_str())
            .collect();
        assert_eq!(subjects, ["first", "second"]);
    }

    #[test]
    fn default_order_puts_known_sections_first() {
        let sm = SectionMap::from_commits(vec![
            commit("Docs", "readme", vec![]),
            commit("Unknown", "misc", vec![]),
            commit("Bug Fixes", "core", vec![]),
            commit("Features", "core", vec![]),
        ]);
        assert_eq!(sm.order(), ["Features", "Bug Fixes", "Docs", "Unknown"]);
    }

    #[test]
    fn set_order_drops_absent_sections_and_forces_unknown_last() {
        let mut sm = SectionMap::from_commits(vec![
            commit("Features", "core", vec![]),
            commit("Bug Fixes", "core", vec![]),
            commit("Unknown", "misc", vec![]),
        ]);

        sm.set_order(&["Performance".to_owned(), "Features".to_owned()]);
        assert_eq!(sm.order(), ["Features", "Bug Fixes", "Unknown"]);
    }

    #[test]
    fn set_order_ignores_explicit_unknown() {
        let mut sm = SectionMap::from_commits(vec![
            commit("Unknown", "misc", vec![]),
            commit("Features", "core", vec![]),
        ]);

        sm.set_order(&["Unknown".to_owned(), "Features".to_owned()]);
        assert_eq!(sm.order(), ["Features", "Unknown"]);
    }
}
