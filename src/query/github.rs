use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use reqwest::{blocking::Client, header, StatusCode};
use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    error::{Error, Result},
    git::{Commit, Commits},
    query::Querier,
    DEFAULT_CONFIG_FILE,
};

const API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
/// GitHub truncates commit comparisons beyond this many commits
const COMPARE_LIMIT: u64 = 250;

static OWNER_REPO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| regex!(r"github\.com[/:]([\w-]+)/([\w-]+)"));

/// Extracts the `(owner, repo)` pair out of a GitHub repository URL, in
/// either https or ssh-remote form
pub(crate) fn parse_owner_repo(url: &str) -> Result<(String, String)> {
    OWNER_REPO_REGEX
        .captures(url)
        .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
        .ok_or_else(|| Error::Retrieval(format!("not a github repository URL: {url}")))
}

#[derive(Debug, Deserialize)]
struct RepoCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Comparison {
    total_commits: u64,
    commits: Vec<RepoCommit>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    commit: TagRef,
}

#[derive(Debug, Deserialize)]
struct TagRef {
    sha: String,
}

/// A `Querier` backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubQuerier {
    repo: String,
    token: String,
    api_base: String,
    client: Client,
}

impl GithubQuerier {
    pub fn new<S: Into<String>>(repo: S, token: S) -> GithubQuerier {
        GithubQuerier {
            repo: repo.into(),
            token: token.into(),
            api_base: API_BASE.to_owned(),
            client: Client::new(),
        }
    }

    /// Points the querier at a different API host, e.g. a GitHub Enterprise
    /// installation
    pub fn api_base<S: Into<String>>(mut self, base: S) -> GithubQuerier {
        self.api_base = base.into();
        self
    }

    fn owner_repo(&self) -> Result<(String, String)> {
        parse_owner_repo(&self.repo)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::blocking::Response> {
        let url = format!("{}{path}", self.api_base);
        debug!("GET {url}");
        let mut request = self
            .client
            .get(url)
            .header(header::USER_AGENT, "chlog")
            .query(query);
        if !self.token.is_empty() {
            request = request.header(header::AUTHORIZATION, format!("token {}", self.token));
        }
        Ok(request.send()?)
    }

    fn list_commits(&self, query: &[(&str, String)]) -> Result<Vec<RepoCommit>> {
        let (owner, repo) = self.owner_repo()?;
        let path = format!("/repos/{owner}/{repo}/commits");

        let mut all = vec![];
        let mut page = 1usize;
        loop {
            let mut query = query.to_vec();
            query.push(("per_page", PER_PAGE.to_string()));
            query.push(("page", page.to_string()));

            let batch: Vec<RepoCommit> =
                self.get(&path, &query)?.error_for_status()?.json()?;
            let batch_len = batch.len();
            all.extend(batch);
            if batch_len < PER_PAGE {
                return Ok(all);
            }
            page += 1;
        }
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let (owner, repo) = self.owner_repo()?;
        let path = format!("/repos/{owner}/{repo}/tags");
        Ok(self.get(&path, &[])?.error_for_status()?.json()?)
    }
}

fn into_commits(raw: Vec<RepoCommit>) -> Commits {
    raw.iter()
        .filter_map(|c| Commit::parse(&c.sha, &c.commit.message))
        .collect()
}

impl Querier for GithubQuerier {
    fn commits(&self, from: Option<&str>, to: &str) -> Result<Commits> {
        if to != "HEAD" {
            let (owner, repo) = self.owner_repo()?;
            let from = from.unwrap_or("");
            let path = format!("/repos/{owner}/{repo}/compare/{from}...{to}");
            let comparison: Comparison = self.get(&path, &[])?.error_for_status()?.json()?;
            if comparison.total_commits >= COMPARE_LIMIT {
                warn!("github limits commit comparison to {COMPARE_LIMIT} commits, result may be truncated");
            }
            return Ok(into_commits(comparison.commits));
        }

        let mut query = vec![];
        if let Some(from) = from {
            query.push(("sha", from.to_owned()));
        }
        Ok(into_commits(self.list_commits(&query)?))
    }

    fn commit_range(&self, since: OffsetDateTime, until: OffsetDateTime) -> Result<Commits> {
        let query = vec![
            ("since", since.format(&Rfc3339)?),
            ("until", until.format(&Rfc3339)?),
        ];
        Ok(into_commits(self.list_commits(&query)?))
    }

    fn origin(&self) -> Result<String> {
        Ok(self.repo.clone())
    }

    fn latest_commit(&self) -> Result<String> {
        let commits = self.list_commits(&[])?;
        commits
            .first()
            .map(|c| c.sha.clone())
            .ok_or_else(|| Error::Retrieval("no commits in response".to_owned()))
    }

    fn latest_tag(&self) -> Result<String> {
        let tags = self.list_tags()?;
        tags.first()
            .map(|t| t.commit.sha.clone())
            .ok_or_else(|| Error::Retrieval("no tags in response".to_owned()))
    }

    fn latest_tag_version(&self) -> Result<String> {
        let tags = self.list_tags()?;
        tags.first()
            .map(|t| t.name.clone())
            .ok_or_else(|| Error::Retrieval("no tags in response".to_owned()))
    }

    fn config(&self) -> Result<Option<Vec<u8>>> {
        let (owner, repo) = self.owner_repo()?;
        let path = format!("/repos/{owner}/{repo}/contents/{DEFAULT_CONFIG_FILE}");
        let url = format!("{}{path}", self.api_base);

        let mut request = self
            .client
            .get(url)
            .header(header::USER_AGENT, "chlog")
            // The raw media type skips the base64 detour of the contents API
            .header(header::ACCEPT, "application/vnd.github.raw");
        if !self.token.is_empty() {
            request = request.header(header::AUTHORIZATION, format!("token {}", self.token));
        }

        let response = request.send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.bytes()?.to_vec()))
    }
}
