//! OAuth access token for the Compute Engine API.
//!
//! `VMLC_ACCESS_TOKEN` wins when set; otherwise the token of the active
//! `gcloud` account is used.

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;

/// Environment variable carrying a pre-minted access token.
pub const ACCESS_TOKEN_ENV: &str = "VMLC_ACCESS_TOKEN";

/// Resolve a bearer token for API calls.
///
/// # Errors
///
/// Returns an error if `gcloud` is missing, fails, or prints no token.
pub async fn access_token(runner: &impl CommandRunner) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
        && !token.trim().is_empty()
    {
        tracing::debug!("using access token from {ACCESS_TOKEN_ENV}");
        return Ok(token.trim().to_owned());
    }

    let output = runner
        .run("gcloud", &["auth", "print-access-token"])
        .await
        .context("gcloud CLI not found. Install the Google Cloud SDK and run 'gcloud auth login'")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "cannot obtain an access token: {}. Run 'gcloud auth login'",
            stderr.trim()
        );
    }
    parse_token(&output.stdout)
}

fn parse_token(stdout: &[u8]) -> Result<String> {
    let token = String::from_utf8_lossy(stdout).trim().to_owned();
    if token.is_empty() {
        anyhow::bail!("gcloud printed an empty access token. Run 'gcloud auth login'");
    }
    Ok(token)
}
