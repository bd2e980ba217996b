//! Scoreshare
//!
//! Renders a game score card (background image, dimming overlay, player name
//! and score), captures it as a raster image and hands the image to a share
//! target. The whole thing runs as one user-triggered workflow that never
//! surfaces an error to the embedding application: the caller only ever hears
//! `success` or `error` through its `on_share` callback.
//!
//! # Features
//!
//! - **Capture surface**: offscreen card renderer producing PNG/JPEG as a
//!   temporary file, raw base64 or a data URI
//! - **Share orchestrator**: permission gate, capture, share, best-effort
//!   cleanup
//! - **Swappable capabilities**: permissions, share target, file cleanup and
//!   error logging are traits, selected per platform
//!
//! # Example
//!
//! ```no_run
//! use scoreshare::platform::{DirectoryShareTarget, Services};
//! use scoreshare::{CardContent, ScoreCard, ShareConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> scoreshare::Result<()> {
//! let services = Services::new(Arc::new(DirectoryShareTarget::new("outbox")));
//! let card = ScoreCard::mount(
//!     CardContent::new("John Doe", "1500"),
//!     services,
//!     ShareConfig::default(),
//! )
//! .await?
//! .on_share(|outcome| println!("Share status: {}", outcome.status));
//!
//! card.share_score().await;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

// Card layout, paint list and rasterizer
pub mod surface;

// Capability traits and the adapters shipped with the crate
pub mod platform;

pub mod orchestrator;
pub use orchestrator::{ShareOrchestrator, WorkflowState};

pub mod card;
pub use card::ScoreCard;

/// Placeholder replaced by the player name in `ShareConfig::message_template`
pub const PLAYER_PLACEHOLDER: &str = "{player}";
/// Placeholder replaced by the score in `ShareConfig::message_template`
pub const SCORE_PLACEHOLDER: &str = "{score}";

/// Card dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 300,
            height: 400,
        }
    }
}

/// Opaque handle to the card background
#[derive(Debug, Clone)]
pub enum BackgroundImage {
    /// Image file decoded when the surface is mounted
    Path(PathBuf),
    /// Already decoded RGBA pixels
    Image(Arc<image::RgbaImage>),
    /// Flat color fill
    Solid([u8; 4]),
}

impl Default for BackgroundImage {
    fn default() -> Self {
        BackgroundImage::Solid([0x42, 0x67, 0xB2, 0xFF])
    }
}

impl From<&Path> for BackgroundImage {
    fn from(path: &Path) -> Self {
        BackgroundImage::Path(path.to_path_buf())
    }
}

impl From<image::RgbaImage> for BackgroundImage {
    fn from(img: image::RgbaImage) -> Self {
        BackgroundImage::Image(Arc::new(img))
    }
}

/// Input for one share workflow: who scored what, on which background
#[derive(Debug, Clone, Default)]
pub struct CardContent {
    pub player_name: String,
    pub score: String,
    pub background: BackgroundImage,
}

impl CardContent {
    pub fn new(player_name: impl Into<String>, score: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            score: score.into(),
            background: BackgroundImage::default(),
        }
    }

    pub fn with_background(mut self, background: impl Into<BackgroundImage>) -> Self {
        self.background = background.into();
        self
    }
}

/// Output image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// How a capture hands back its pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    /// Encoded image written to a temporary file, referenced by a `file://` URI
    TmpFile,
    /// Raw base64 of the encoded image
    Base64,
    /// `data:<mime>;base64,...` URI
    #[default]
    DataUri,
}

/// Options for `CaptureSurface::capture`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    pub format: ImageFormat,
    /// 0.0..=1.0, where 1.0 is maximum fidelity. PNG is always lossless.
    pub quality: f32,
    pub result: ResultKind,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: 1.0,
            result: ResultKind::DataUri,
        }
    }
}

impl CaptureOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(Error::CaptureFailure(format!(
                "quality must be within 0.0..=1.0, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// A reference to one rasterized snapshot of a surface
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResult {
    /// `file://` URI, base64 payload or data URI depending on `ResultKind`
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Backing file for `ResultKind::TmpFile` captures
    pub path: Option<PathBuf>,
}

/// Coarse outcome reported to the `on_share` callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    Success,
    Error,
    /// Only reported when `ShareConfig::report_permission_denied` is set
    PermissionDenied,
}

impl ShareStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareStatus::Success => "success",
            ShareStatus::Error => "error",
            ShareStatus::PermissionDenied => "permission_denied",
        }
    }
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller learns about one share attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOutcome {
    pub status: ShareStatus,
    /// Diagnostic text for developers, never meant for end users
    pub detail: Option<String>,
}

impl ShareOutcome {
    pub fn success() -> Self {
        Self {
            status: ShareStatus::Success,
            detail: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: ShareStatus::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            status: ShareStatus::PermissionDenied,
            detail: None,
        }
    }
}

/// Workflow configuration
///
/// The defaults reproduce the stock score card behaviour: a lossless PNG
/// handed over as a data URI, titled "Game Score", with silent permission
/// denial.
///
/// # Examples
///
/// ```
/// let cfg = scoreshare::ShareConfig::default();
/// assert_eq!(cfg.message("John Doe", "1500"), "Check out my score! John Doe: 1500");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Title shown on the share surface
    pub title: String,
    /// Share message; must contain `{player}` and `{score}`
    pub message_template: String,
    /// Capture settings used by the orchestrator
    pub capture: CaptureOptions,
    /// Text shown when asking for storage access
    pub rationale: platform::PermissionRationale,
    /// Deliver `permission_denied` to the callback instead of staying silent
    pub report_permission_denied: bool,
    /// Directory for `ResultKind::TmpFile` captures (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            title: "Game Score".to_string(),
            message_template: format!(
                "Check out my score! {}: {}",
                PLAYER_PLACEHOLDER, SCORE_PLACEHOLDER
            ),
            capture: CaptureOptions::default(),
            rationale: platform::PermissionRationale::default(),
            report_permission_denied: false,
            temp_dir: None,
        }
    }
}

impl ShareConfig {
    /// Load a config from a JSON file; missing fields fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: ShareConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for placeholder in [PLAYER_PLACEHOLDER, SCORE_PLACEHOLDER] {
            if !self.message_template.contains(placeholder) {
                return Err(Error::Config(format!(
                    "message_template must contain {}",
                    placeholder
                )));
            }
        }
        self.capture
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Interpolate the share message. Values are inserted verbatim.
    pub fn message(&self, player_name: &str, score: &str) -> String {
        // Single pass so a player name containing "{score}" stays literal.
        let mut out = String::with_capacity(
            self.message_template.len() + player_name.len() + score.len(),
        );
        let mut rest = self.message_template.as_str();
        loop {
            let next_player = rest.find(PLAYER_PLACEHOLDER);
            let next_score = rest.find(SCORE_PLACEHOLDER);
            let (idx, placeholder, value) = match (next_player, next_score) {
                (Some(p), Some(s)) if p < s => (p, PLAYER_PLACEHOLDER, player_name),
                (Some(p), None) => (p, PLAYER_PLACEHOLDER, player_name),
                (_, Some(s)) => (s, SCORE_PLACEHOLDER, score),
                (None, None) => break,
            };
            out.push_str(&rest[..idx]);
            out.push_str(value);
            rest = &rest[idx + placeholder.len()..];
        }
        out.push_str(rest);
        out
    }
}
