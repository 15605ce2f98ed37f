//! Pull request validation: checks that every commit on a pull request
//! conforms to the commit-message convention, and reports the result through
//! a commit-status sink.
//!
//! Each validation is self-contained: it owns its alias map and its sink
//! calls, so any number of validations may run concurrently and re-running
//! one re-evaluates from scratch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use log::{error, info};
use reqwest::{blocking::Client, header};
use serde_json::json;
use strum::{Display, EnumString};

use crate::{
    alias_map::SectionAliasMap,
    error::{Error, Result},
    git::{classify_commits, filter_commits, Commit, Commits},
    query::github::parse_owner_repo,
};

/// The status context validations are reported under
pub const STATUS_CONTEXT: &str = "changelog/pull-request";

/// The commit-status states a validation moves through
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Status {
    Pending,
    Success,
    Failure,
    Error,
}

impl Status {
    /// The human-readable description attached to the commit status
    pub fn description(&self) -> &'static str {
        match self {
            Status::Pending => "beginning commit format validation",
            Status::Success => "commit looks good",
            Status::Failure => "commit was improperly formatted",
            Status::Error => "there was a problem validating commit format",
        }
    }
}

/// The outcome of evaluating a pull request's commits
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Validation {
    Valid,
    Invalid,
}

impl Validation {
    fn status(self) -> Status {
        match self {
            Validation::Valid => Status::Success,
            Validation::Invalid => Status::Failure,
        }
    }
}

/// Receives the status signals a validation emits, keyed by commit hash
pub trait StatusSink {
    fn set_status(&self, sha: &str, status: Status) -> Result<()>;
}

/// Validates the raw `(hash, message)` commits of a pull request against
/// `alias_map`'s convention.
///
/// Emits `Pending` before evaluation and `Success`/`Failure` after, keyed by
/// the last commit's hash. The pull request is invalid when fewer commits
/// survive parsing and filtering than `reported_count`, the number of commits
/// the hosting service reports for the pull request.
pub fn validate_pull_request<S: StatusSink>(
    raw_commits: &[(String, String)],
    reported_count: usize,
    alias_map: &SectionAliasMap,
    sink: &S,
) -> Result<Validation> {
    let (sha, _) = raw_commits
        .last()
        .ok_or_else(|| Error::Validation("pull request has no commits".to_owned()))?;

    if let Err(pending_err) = sink.set_status(sha, Status::Pending) {
        if let Err(sink_err) = sink.set_status(sha, Status::Error) {
            error!("failed to report validation error status: {sink_err}");
        }
        return Err(pending_err);
    }

    match evaluate(raw_commits, reported_count, alias_map) {
        Ok(validation) => {
            sink.set_status(sha, validation.status())?;
            Ok(validation)
        }
        Err(e) => {
            if let Err(sink_err) = sink.set_status(sha, Status::Error) {
                error!("failed to report validation error status: {sink_err}");
            }
            Err(e)
        }
    }
}

fn evaluate(
    raw_commits: &[(String, String)],
    reported_count: usize,
    alias_map: &SectionAliasMap,
) -> Result<Validation> {
    let parsed: Commits = raw_commits
        .iter()
        .filter_map(|(hash, message)| Commit::parse(hash, message))
        .collect();

    let kept = filter_commits(parsed, &alias_map.grep(), false)?;
    let kept = classify_commits(kept, alias_map);

    if kept.len() < reported_count {
        Ok(Validation::Invalid)
    } else {
        Ok(Validation::Valid)
    }
}

/// Hands one validation to its own worker thread and returns immediately.
/// Panics stay inside the worker; the outcome is reported through the log.
pub fn spawn_validation<F>(pr_number: u64, work: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<Validation> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("validate-pr-{pr_number}"))
        .spawn(move || match catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(validation)) => {
                info!("validated commit format for pull request {pr_number}: {validation:?}");
            }
            Ok(Err(e)) => {
                error!("failed to validate pull request {pr_number}: {e}");
            }
            Err(_) => {
                error!("validation of pull request {pr_number} panicked");
            }
        })?;
    Ok(handle)
}

/// A `StatusSink` that creates commit statuses through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubStatusSink {
    owner: String,
    repo: String,
    token: String,
    api_base: String,
    client: Client,
}

impl GithubStatusSink {
    pub fn new<S: Into<String>>(repo_url: &str, token: S) -> Result<GithubStatusSink> {
        let (owner, repo) = parse_owner_repo(repo_url)?;
        Ok(GithubStatusSink {
            owner,
            repo,
            token: token.into(),
            api_base: "https://api.github.com".to_owned(),
            client: Client::new(),
        })
    }

    /// Points the sink at a different API host
    pub fn api_base<S: Into<String>>(mut self, base: S) -> GithubStatusSink {
        self.api_base = base.into();
        self
    }
}

impl StatusSink for GithubStatusSink {
    fn set_status(&self, sha: &str, status: Status) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/statuses/{sha}",
            self.api_base, self.owner, self.repo
        );
        self.client
            .post(url)
            .header(header::USER_AGENT, "chlog")
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .json(&json!({
                "state": status.to_string(),
                "description": status.description(),
                "context": STATUS_CONTEXT,
            }))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
