pub(crate) mod github;
mod local;

use strum::{Display, EnumString};
use time::OffsetDateTime;

pub use self::{github::GithubQuerier, local::LocalQuerier};
use crate::{
    error::{Error, Result},
    git::Commits,
};

/// The commit-data backends a changelog can be generated from. Selected
/// explicitly at the boundary; there is no runtime discovery.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Provider {
    #[default]
    Local,
    Github,
}

impl Provider {
    /// Selects a backend by its configured name. An unrecognized name is a
    /// crate error carrying the offending input.
    pub fn from_name(name: &str) -> Result<Provider> {
        name.parse()
            .map_err(|_| Error::Provider(name.to_owned()))
    }
}

/// The capabilities the changelog pipeline needs from a version-control
/// backend: raw `(hash, message)` commit data plus a little repository
/// metadata. `LocalQuerier` shells out to `git`; `GithubQuerier` talks to the
/// GitHub REST API.
pub trait Querier {
    /// Returns the commits reachable from `to` and not from `from`; a `None`
    /// `from` means the whole history up to `to`
    fn commits(&self, from: Option<&str>, to: &str) -> Result<Commits>;

    /// Returns the commits authored inside a time window
    fn commit_range(&self, since: OffsetDateTime, until: OffsetDateTime) -> Result<Commits>;

    /// Returns the repository URL used as the base of hyperlinks
    fn origin(&self) -> Result<String>;

    /// Returns the hash of the most recent commit
    fn latest_commit(&self) -> Result<String>;

    /// Returns the revision of the most recent tag
    fn latest_tag(&self) -> Result<String>;

    /// Returns the most recent tag's name
    fn latest_tag_version(&self) -> Result<String>;

    /// Returns the repository's raw `.clog.toml` bytes, or `None` when the
    /// repository doesn't carry one
    fn config(&self) -> Result<Option<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("GitHub".parse::<Provider>().unwrap(), Provider::Github);
        assert_eq!("local".parse::<Provider>().unwrap(), Provider::Local);
        assert!("svn".parse::<Provider>().is_err());
    }

    #[test]
    fn from_name_carries_the_unrecognized_input() {
        assert_eq!(Provider::from_name("github").unwrap(), Provider::Github);
        assert!(matches!(
            Provider::from_name("svn"),
            Err(Error::Provider(name)) if name == "svn"
        ));
    }
}
