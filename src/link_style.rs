use std::{result::Result as StdResult, str::FromStr};

use serde::de::{Deserialize, Deserializer};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// Determines the hyperlink style used in commit and issue links. Defaults to
/// `LinkStyle::Github`
///
/// # Example
///
/// ```
/// # use chlog::LinkStyle;
/// let style: LinkStyle = "stash".parse().unwrap();
/// assert_eq!(style, LinkStyle::Stash);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum LinkStyle {
    #[default]
    Github,
    Gitlab,
    Stash,
    Bitbucket,
    Cgit,
}

impl<'de> Deserialize<'de> for LinkStyle {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LinkStyle::from_config(&s).map_err(serde::de::Error::custom)
    }
}

impl LinkStyle {
    /// Parses a configured style name. Unlike `FromStr`, an unrecognized name
    /// comes back as a crate error so config handling stays in one taxonomy.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// assert_eq!(LinkStyle::from_config("Stash").unwrap(), LinkStyle::Stash);
    /// assert!(LinkStyle::from_config("sourcehut").is_err());
    /// ```
    pub fn from_config(name: &str) -> Result<LinkStyle> {
        FromStr::from_str(name).map_err(|_| Error::LinkStyle)
    }

    /// Guesses the style to use from a repository URL, falling back to Github
    pub fn infer(repo_url: &str) -> LinkStyle {
        if repo_url.contains("github.com") {
            LinkStyle::Github
        } else if repo_url.contains("gitlab.com") {
            LinkStyle::Gitlab
        } else if repo_url.contains("bitbucket.org") {
            LinkStyle::Stash
        } else {
            LinkStyle::Github
        }
    }

    /// Gets a hyperlink url to an issue in the specified style. Styles whose
    /// host has no issue tracker return the repository URL unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let issue = LinkStyle::Github.issue_link("141", "https://github.com/chlog-tool/chlog");
    /// assert_eq!("https://github.com/chlog-tool/chlog/issues/141", issue);
    /// ```
    pub fn issue_link(&self, issue: &str, repo: &str) -> String {
        match self {
            LinkStyle::Github | LinkStyle::Gitlab | LinkStyle::Bitbucket => {
                format!("{repo}/issues/{issue}")
            }
            LinkStyle::Stash | LinkStyle::Cgit => repo.to_owned(),
        }
    }

    /// Gets a hyperlink url to a commit in the specified style.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let commit = LinkStyle::Github.commit_link("123abc89", "https://github.com/chlog-tool/chlog");
    /// assert_eq!("https://github.com/chlog-tool/chlog/commit/123abc89", commit);
    /// ```
    pub fn commit_link(&self, hash: &str, repo: &str) -> String {
        match self {
            LinkStyle::Github | LinkStyle::Gitlab => format!("{repo}/commit/{hash}"),
            LinkStyle::Stash | LinkStyle::Bitbucket => format!("{repo}/commits/{hash}"),
            LinkStyle::Cgit => format!("{repo}/commit/?id={hash}"),
        }
    }
}
