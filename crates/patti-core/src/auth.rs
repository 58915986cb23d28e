//! Bearer token for the Sheets and Drive APIs.
//!
//! Obtaining credentials is left to external tooling (gcloud, a token broker,
//! ...). The token is resolved once at startup and shared by reference; any
//! failure here is fatal for the run.

use crate::config::AuthConfig;
use std::fmt;
use std::process::Command;
use thiserror::Error;

/// Environment variable holding a ready-to-use access token.
pub const ACCESS_TOKEN_ENV: &str = "PATTI_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no access token: set PATTI_ACCESS_TOKEN, [auth].access_token or [auth].token_command")]
    Missing,
    #[error("token command `{command}` could not be started: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("token command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("token command `{command}` printed an empty token")]
    EmptyToken { command: String },
}

/// OAuth2 access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Authorization: Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Resolves the token: env var, then configured literal, then token command.
pub fn resolve_token(cfg: &AuthConfig) -> Result<AccessToken, AuthError> {
    resolve_token_with(cfg, std::env::var(ACCESS_TOKEN_ENV).ok())
}

fn resolve_token_with(cfg: &AuthConfig, env_token: Option<String>) -> Result<AccessToken, AuthError> {
    let literal = env_token
        .into_iter()
        .chain(cfg.access_token.clone())
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty());
    if let Some(token) = literal {
        return Ok(AccessToken(token));
    }

    match cfg.token_command.as_deref().map(str::trim) {
        Some(command) if !command.is_empty() => run_token_command(command),
        _ => Err(AuthError::Missing),
    }
}

fn run_token_command(command: &str) -> Result<AccessToken, AuthError> {
    tracing::debug!(command, "running token command");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|source| AuthError::CommandSpawn {
            command: command.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(AuthError::CommandFailed {
            command: command.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(AuthError::EmptyToken {
            command: command.to_string(),
        });
    }
    Ok(AccessToken(token))
}
