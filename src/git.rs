use std::sync::LazyLock;

use regex::Regex;

use crate::{alias_map::SectionAliasMap, error::Result, link_style::LinkStyle};

/// Parses the `type(component): subject` prefix of a commit's first line
static COMMIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| regex!(r"^([^:\(]+?)(?:\(([^\)]*)?\))?:(.*)"));
/// Finds `Closes #N[, #N...]` style issue references
static CLOSES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| regex!(r"(?:Closes|Fixes|Resolves)\s((?:#(?:\d+)(?:,\s)?)+)"));
/// Finds `Breaks #N[, #N...]` style issue references
static BREAKS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| regex!(r"(?:Breaks|Broke)\s((?:#(?:\d+)(?:,\s)?)+)"));
/// Finds a bare breaking-change marker
static BREAKING_REGEX: LazyLock<Regex> = LazyLock::new(|| regex!(r"(?i:breaking)"));
/// Pulls the individual ids out of a matched reference group
static ISSUE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| regex!(r"#(\d+)"));

/// The struct representation of a `Commit`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// The 40 char hash
    pub hash: String,
    /// The commit subject
    pub subject: String,
    /// The component (if any); `"Unknown"` when the prefix didn't parse
    pub component: String,
    /// Any issues this commit closes
    pub closes: Vec<String>,
    /// Any issues this commit breaks. A bare breaking-change marker with no
    /// issue reference contributes one empty entry.
    pub breaks: Vec<String>,
    /// The raw type alias from the commit prefix (e.g. `ft`, `fix`)
    pub raw_type: String,
    /// The display section this commit was classified under. Empty until
    /// `classify_commits` (or `classify_all_commits`) has run.
    pub commit_type: String,
}

/// A convienience type for multiple commits
pub type Commits = Vec<Commit>;

impl Commit {
    /// Parses a raw `(hash, message)` pair into a `Commit`. Returns `None`
    /// only when the message has no lines at all; a malformed prefix is a
    /// normal case and falls back to `"Unknown"` for type and component.
    pub fn parse(hash: &str, message: &str) -> Option<Commit> {
        let mut lines = message.lines();

        let first = lines.next()?;

        let (raw_type, component, subject) = match COMMIT_REGEX.captures(first) {
            Some(caps) => (
                caps.get(1).map_or("", |m| m.as_str()).to_owned(),
                caps.get(2)
                    .map_or_else(|| "Unknown".to_owned(), |m| m.as_str().to_owned()),
                caps.get(3).map_or("", |m| m.as_str()).to_owned(),
            ),
            None => ("Unknown".to_owned(), "Unknown".to_owned(), first.to_owned()),
        };

        let mut closes = vec![];
        let mut breaks = vec![];
        for line in message.lines() {
            if let Some(caps) = CLOSES_REGEX.captures(line) {
                if let Some(refs) = caps.get(1) {
                    closes.extend(issue_ids(refs.as_str()));
                }
            } else if let Some(caps) = BREAKS_REGEX.captures(line) {
                if let Some(refs) = caps.get(1) {
                    breaks.extend(issue_ids(refs.as_str()));
                }
            } else if BREAKING_REGEX.is_match(line) {
                breaks.push(String::new());
            }
        }

        Some(Commit {
            hash: hash.to_owned(),
            subject: subject.trim().to_owned(),
            component,
            closes,
            breaks,
            raw_type,
            commit_type: String::new(),
        })
    }

    /// Generates the summary line used for this commit in the changelog, e.g.
    /// `Initial Commit ([029aafdc](https://github.com/foo/bar/commit/029aafdc...))`
    pub fn summary(&self, repo: &str, style: LinkStyle) -> String {
        let short_hash = self.hash.get(..8).unwrap_or(&self.hash);
        let commit_link = style.commit_link(&self.hash, repo);

        let mut response = format!("{} ([{short_hash}]({commit_link}))", self.subject);

        if !self.closes.is_empty() {
            let closes_links = self
                .closes
                .iter()
                .map(|issue| format!("[#{issue}]({})", style.issue_link(issue, repo)))
                .collect::<Vec<_>>()
                .join(" ");
            response.push_str(&format!(", closes {closes_links}"));
        }

        if !self.breaks.is_empty() {
            let breaks_links = self
                .breaks
                .iter()
                .map(|issue| format!("[#{issue}]({})", style.issue_link(issue, repo)))
                .collect::<Vec<_>>()
                .join(" ");
            response.push_str(&format!(", breaks {breaks_links}"));
        }

        response
    }
}

fn issue_ids(refs: &str) -> Vec<String> {
    ISSUE_ID_REGEX
        .captures_iter(refs)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_owned()))
        .collect()
}

/// Keeps only the commits whose raw type matches `pattern` (the expression
/// produced by `SectionAliasMap::grep`). When `include_all` is set every
/// commit is kept unchanged.
pub fn filter_commits(commits: Commits, pattern: &str, include_all: bool) -> Result<Commits> {
    if include_all {
        return Ok(commits);
    }
    let regex = Regex::new(pattern)?;
    Ok(commits
        .into_iter()
        .filter(|commit| regex.is_match(&commit.raw_type))
        .collect())
}

/// Sets the display section on each commit from the given alias map
pub fn classify_commits(mut commits: Commits, alias_map: &SectionAliasMap) -> Commits {
    for commit in commits.iter_mut() {
        commit.commit_type = alias_map.section_for(&commit.raw_type);
    }
    commits
}

/// Like `classify_commits`, except commits that would land in `"Unknown"`
/// keep their raw type (title-cased) as their own section. Used with
/// `include_all` so unrecognized aliases aren't collapsed together.
pub fn classify_all_commits(mut commits: Commits, alias_map: &SectionAliasMap) -> Commits {
    for commit in commits.iter_mut() {
        let section = alias_map.section_for(&commit.raw_type);
        commit.commit_type = if section == "Unknown" {
            crate::alias_map::title_case(&commit.raw_type)
        } else {
            section
        };
    }
    commits
}
