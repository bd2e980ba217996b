/// Storage permission capability

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionKind {
    WriteExternalStorage,
}

/// Text shown alongside the OS permission prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRationale {
    pub title: String,
    pub message: String,
    pub button_neutral: String,
    pub button_negative: String,
    pub button_positive: String,
}

impl Default for PermissionRationale {
    fn default() -> Self {
        Self {
            title: "Storage Permission".to_string(),
            message: "App needs access to storage to save the screenshot.".to_string(),
            button_neutral: "Ask Me Later".to_string(),
            button_negative: "Cancel".to_string(),
            button_positive: "OK".to_string(),
        }
    }
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Ask the environment for `kind`. `Ok(false)` is a denial; an `Err`
    /// means the request itself could not be made.
    async fn request(&self, kind: PermissionKind, rationale: &PermissionRationale) -> Result<bool>;
}

/// Answers every request the same way
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    granted: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermission {
    async fn request(
        &self,
        kind: PermissionKind,
        _rationale: &PermissionRationale,
    ) -> Result<bool> {
        log::debug!("{:?} requested, answering {}", kind, self.granted);
        Ok(self.granted)
    }
}

/// Asks on the terminal, printing the rationale and reading one line.
///
/// Anything starting with `y` or matching the positive button label grants;
/// everything else (including "Ask Me Later") denies.
#[derive(Debug, Clone, Default)]
pub struct PromptPermission;

fn parse_answer(answer: &str, rationale: &PermissionRationale) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case(&rationale.button_positive)
        || answer.to_ascii_lowercase().starts_with('y')
}

#[async_trait]
impl PermissionProvider for PromptPermission {
    async fn request(&self, kind: PermissionKind, rationale: &PermissionRationale) -> Result<bool> {
        let rationale = rationale.clone();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let mut out = std::io::stderr().lock();
            writeln!(out, "{} ({:?})", rationale.title, kind)?;
            writeln!(out, "{}", rationale.message)?;
            write!(
                out,
                "[{}] / [{}] / [{}]: ",
                rationale.button_positive, rationale.button_negative, rationale.button_neutral
            )?;
            out.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(parse_answer(&line, &rationale))
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}
