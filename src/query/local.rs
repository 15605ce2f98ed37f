use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    error::{Error, Result},
    git::{Commit, Commits},
    query::Querier,
    DEFAULT_CONFIG_FILE,
};

/// One record per commit: hash, subject, body, terminator
const LOG_FORMAT: &str = "%H%n%s%n%b%n==END==";
const END_MARKER: &str = "\n==END==\n";

/// A `Querier` backed by a local repository, shelling out to `git`
#[derive(Debug, Clone, Default)]
pub struct LocalQuerier {
    /// The git meta-data directory (typically the `.git` sub-directory of the
    /// project)
    git_dir: Option<PathBuf>,
    /// The working directory of the git project
    work_tree: Option<PathBuf>,
}

impl LocalQuerier {
    pub fn new(git_dir: Option<PathBuf>, work_tree: Option<PathBuf>) -> LocalQuerier {
        LocalQuerier { git_dir, work_tree }
    }

    /// Creates a querier from a single directory, which may be either the
    /// project directory or its `.git` child; the other is derived.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> LocalQuerier {
        let dir = dir.as_ref();
        if dir.ends_with(".git") {
            let mut work_tree = dir.to_path_buf();
            work_tree.pop();
            LocalQuerier::new(Some(dir.to_path_buf()), Some(work_tree))
        } else {
            LocalQuerier::new(Some(dir.join(".git")), Some(dir.to_path_buf()))
        }
    }

    fn git_dir_arg(&self) -> Option<String> {
        let dir = self
            .git_dir
            .clone()
            .or_else(|| self.work_tree.as_ref().map(|wt| wt.join(".git")))?;
        Some(format!("--git-dir={}", dir.display()))
    }

    fn work_tree_arg(&self) -> Option<String> {
        let dir = self.work_tree.clone().or_else(|| {
            self.git_dir
                .as_ref()
                .and_then(|gd| gd.parent().map(Path::to_path_buf))
        })?;
        Some(format!("--work-tree={}", dir.display()))
    }

    fn work_dir(&self) -> PathBuf {
        if let Some(git_dir) = &self.git_dir {
            if let Some(parent) = git_dir.parent() {
                return parent.to_path_buf();
            }
        }
        self.work_tree.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new("git");
        if let Some(arg) = self.git_dir_arg() {
            command.arg(arg);
        }
        if let Some(arg) = self.work_tree_arg() {
            command.arg(arg);
        }
        command.args(args);

        debug!("running {command:?}");
        let output = command.output()?;
        if !output.status.success() {
            return Err(Error::Retrieval(format!(
                "git {} exited with {}: {}",
                args.first().unwrap_or(&""),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Splits `git log --format=%H%n%s%n%b%n==END==` output into commit records.
/// Records whose message fails to parse are dropped.
fn parse_raw_log(raw: &str) -> Commits {
    raw.split(END_MARKER)
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let (hash, message) = record.trim_start_matches('\n').split_once('\n')?;
            Commit::parse(hash, message)
        })
        .collect()
}

/// Rewrites an ssh-style origin (`git@host:owner/repo.git`) as an https URL
fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim();
    match origin.strip_prefix("git@") {
        Some(rest) => format!(
            "https://{}",
            rest.trim_end_matches(".git").replacen(':', "/", 1)
        ),
        None => origin.to_owned(),
    }
}

impl Querier for LocalQuerier {
    fn commits(&self, from: Option<&str>, to: &str) -> Result<Commits> {
        let range = match from {
            Some(from) if !from.is_empty() => format!("{from}..{to}"),
            _ => to.to_owned(),
        };
        let format = format!("--format={LOG_FORMAT}");
        let out = self.git(&["log", format.as_str(), range.as_str()])?;
        Ok(parse_raw_log(&out))
    }

    fn commit_range(&self, since: OffsetDateTime, until: OffsetDateTime) -> Result<Commits> {
        let format = format!("--format={LOG_FORMAT}");
        let since = format!("--since={}", since.format(&Rfc3339)?);
        let until = format!("--until={}", until.format(&Rfc3339)?);
        let out = self.git(&[
            "log",
            format.as_str(),
            since.as_str(),
            until.as_str(),
        ])?;
        Ok(parse_raw_log(&out))
    }

    fn origin(&self) -> Result<String> {
        let out = self.git(&["remote", "get-url", "origin"])?;
        Ok(normalize_origin(&out))
    }

    fn latest_commit(&self) -> Result<String> {
        let out = self.git(&["rev-parse", "HEAD"])?;
        Ok(out.trim().to_owned())
    }

    fn latest_tag(&self) -> Result<String> {
        let out = self.git(&["rev-list", "--tags", "--max-count=1"])?;
        Ok(out.trim().to_owned())
    }

    fn latest_tag_version(&self) -> Result<String> {
        let out = self.git(&["describe", "--tags", "--abbrev=0"])?;
        Ok(out.trim().to_owned())
    }

    fn config(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(self.work_dir().join(DEFAULT_CONFIG_FILE)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
