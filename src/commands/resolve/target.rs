//! Turn CLI arguments into a [`PullRequestRef`].

use std::process::Command;

use super::models::PullRequestRef;
use super::{ResolveError, Result};

/// Resolve the target PR from the positional argument and repository flags.
///
/// `pr` is either a PR number or a full `https://github.com/o/r/pull/N` URL.
/// A URL must live on the host that `api_url` serves (`api.github.com` for
/// github.com, the same host for GitHub Enterprise). Without a URL, the repository comes from `--owner`/`--repo`, where
/// `--repo` may also carry `owner/repo`. When neither is given the current
/// directory's repository is asked from `gh repo view`.
pub fn resolve_target(
    pr: &str,
    owner: Option<&str>,
    repo: Option<&str>,
    api_url: &str,
) -> Result<PullRequestRef> {
    if let Some((host, from_url)) = parse_pr_url(pr) {
        if owner.is_some() || repo.is_some() {
            return Err(ResolveError::InvalidTarget(
                "--owner/--repo cannot be combined with a pull request URL".to_string(),
            ));
        }
        if web_host(api_url).as_deref() != Some(host.as_str()) {
            return Err(ResolveError::InvalidTarget(format!(
                "{pr} is on {host}, but the API endpoint is {api_url}. \
                 Pass --api-url with the GraphQL endpoint of {host}"
            )));
        }
        return Ok(from_url);
    }

    let number = parse_pr_number(pr)?;
    let (owner, repo) = match (owner, repo) {
        (owner, Some(repo)) => split_repo(owner, repo)?,
        (Some(_), None) => {
            return Err(ResolveError::InvalidTarget(
                "--owner requires --repo".to_string(),
            ));
        }
        (None, None) => current_repo()?,
    };

    Ok(PullRequestRef::new(owner, repo, number))
}

fn parse_pr_number(pr: &str) -> Result<u64> {
    pr.trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            ResolveError::InvalidTarget(format!(
                "Invalid pull request: {pr}. Expected a number or a pull request URL"
            ))
        })
}

/// Parse `https://<host>/<owner>/<repo>/pull/<number>[/...]` into the
/// lowercased host and the pull request.
fn parse_pr_url(input: &str) -> Option<(String, PullRequestRef)> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))?;
    let mut segments = rest.split(['/', '?', '#']);
    let host = authority_host(segments.next()?)?;
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    if segments.next()? != "pull" {
        return None;
    }
    let number = segments.next()?.parse::<u64>().ok().filter(|n| *n > 0)?;
    Some((host, PullRequestRef::new(owner, repo, number)))
}

/// Host of the web UI that pairs with a GraphQL endpoint.
fn web_host(api_url: &str) -> Option<String> {
    let rest = api_url
        .strip_prefix("https://")
        .or_else(|| api_url.strip_prefix("http://"))?;
    let host = authority_host(rest.split(['/', '?', '#']).next()?)?;
    if host == "api.github.com" {
        Some("github.com".to_string())
    } else {
        Some(host)
    }
}

/// `user@host:port` -> `host`, lowercased.
fn authority_host(authority: &str) -> Option<String> {
    let host = authority.rsplit('@').next()?.split(':').next()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

fn split_repo(owner: Option<&str>, repo: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = repo.split('/').collect();
    match (owner, parts.as_slice()) {
        (None, [owner, name]) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        (Some(owner), [name]) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        (Some(_), [_, _]) => Err(ResolveError::InvalidTarget(format!(
            "--repo {repo} already names an owner; drop --owner"
        ))),
        _ => Err(ResolveError::InvalidTarget(format!(
            "Invalid repository format: {repo}. Expected owner/repo"
        ))),
    }
}

/// Get the current directory's repository using gh CLI.
fn current_repo() -> Result<(String, String)> {
    let output = Command::new("gh")
        .args([
            "repo",
            "view",
            "--json",
            "nameWithOwner",
            "-q",
            ".nameWithOwner",
        ])
        .output()
        .map_err(|e| ResolveError::InvalidTarget(format!("failed to run gh repo view: {e}")))?;

    if !output.status.success() {
        return Err(ResolveError::InvalidTarget(format!(
            "could not detect repository (pass -R owner/repo): {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let name_with_owner = String::from_utf8_lossy(&output.stdout).trim().to_string();
    split_repo(None, &name_with_owner)
}
