//! Credential lookup for the GitHub API.
//!
//! Tokens come from `GH_TOKEN`, then `GITHUB_TOKEN`, then `gh auth token`,
//! reusing whatever session the GitHub CLI already has.

use std::process::Command;

use super::error::{GitHubError, Result};

const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Resolve a GitHub token from the environment or the GitHub CLI.
pub fn resolve_token() -> Result<String> {
    if let Some(token) = token_from_env() {
        return Ok(token);
    }
    get_gh_token()
}

/// Returns the first non-empty token environment variable.
fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Get GitHub token from `gh auth token` command.
fn get_gh_token() -> Result<String> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|e| GitHubError::TokenError(format!("failed to run gh auth token: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitHubError::TokenError(format!(
            "gh auth token failed: {}",
            stderr.trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(GitHubError::TokenError(
            "gh auth token returned empty token".to_string(),
        ));
    }

    Ok(token)
}
