use log::debug;
use serde::Deserialize;

use crate::{
    alias_map::SectionAliasMap,
    error::Result,
    fmt::{FormatWriter, MarkdownWriter},
    git::{classify_all_commits, classify_commits, filter_commits, Commits},
    link_style::LinkStyle,
    sectionmap::SectionMap,
};

/// The header information for one rendered release
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChangeLog {
    /// The repository URL used as the base of commit and issue hyperlinks
    pub repo: String,
    /// The version label for the release
    pub version: String,
    /// An optional subtitle shown after the version
    pub subtitle: Option<String>,
    /// Patch versions use a lower markdown header (`###` instead of `##`)
    pub patch_version: bool,
}

/// Runs the full pipeline over a set of raw-parsed commits: filter by the
/// alias map's grep expression, classify into display sections, aggregate
/// into a `SectionMap`, and render the Markdown document.
///
/// With `include_all` set no commits are dropped, and unrecognized types keep
/// their own (title-cased) sections. A custom section `order` may be supplied,
/// e.g. from a repository's `.clog.toml`.
///
/// The document is rendered into memory, so nothing is emitted when any stage
/// fails.
pub fn build_changelog(
    header: &ChangeLog,
    style: LinkStyle,
    commits: Commits,
    alias_map: &SectionAliasMap,
    order: Option<&[String]>,
    include_all: bool,
) -> Result<String> {
    debug!(
        "building changelog for {} from {} commits",
        header.version,
        commits.len()
    );

    let commits = if include_all {
        classify_all_commits(commits, alias_map)
    } else {
        let kept = filter_commits(commits, &alias_map.grep(), false)?;
        classify_commits(kept, alias_map)
    };

    let mut section_map = SectionMap::from_commits(commits);
    if let Some(order) = order {
        section_map.set_order(order);
    }

    let mut buf = vec![];
    MarkdownWriter::new(&mut buf).write_changelog(header, style, &section_map)?;

    // MarkdownWriter only ever emits valid UTF-8
    Ok(String::from_utf8(buf).expect("changelog output is UTF-8"))
}
