//! Capture surface: the offscreen score card and its capture contract

pub mod layout;
pub mod paint;
pub mod raster;

use crate::{
    BackgroundImage, CaptureOptions, CaptureResult, CardContent, Error, Result, ResultKind,
    Viewport,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as Base64Engine;
use image::imageops::FilterType;
use paint::{PaintCommand, ResolvedBackground};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Anything that can rasterize its current visual state into an image
/// resource.
///
/// A new capture supersedes the previous one; implementations never delete
/// earlier results, the caller owns them.
#[async_trait]
pub trait CaptureSurface: Send + Sync {
    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureResult>;
}

/// The score card surface.
///
/// Created unmounted; `mount` runs the layout pass (decoding and fitting the
/// background, laying out the text) and only then can `capture` succeed.
pub struct CardSurface {
    content: CardContent,
    viewport: Viewport,
    temp_dir: Option<PathBuf>,
    display_list: Option<Arc<Vec<PaintCommand>>>,
    latest: Mutex<Option<CaptureResult>>,
}

impl CardSurface {
    pub fn new(content: CardContent) -> Self {
        Self {
            content,
            viewport: Viewport::default(),
            temp_dir: None,
            display_list: None,
            latest: Mutex::new(None),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self.display_list = None;
        self
    }

    /// Directory for `ResultKind::TmpFile` captures; defaults to the system
    /// temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_mounted(&self) -> bool {
        self.display_list.is_some()
    }

    /// Run the layout pass. Blocking: may decode an image file.
    pub fn mount(&mut self) -> Result<()> {
        let background = resolve_background(&self.content.background, self.viewport)?;
        let nodes = layout::layout_card(&self.content, self.viewport);
        let list = paint::display_list(&background, &nodes, self.viewport);
        log::debug!(
            "card surface mounted: {}x{}, {} paint commands",
            self.viewport.width,
            self.viewport.height,
            list.len()
        );
        self.display_list = Some(Arc::new(list));
        Ok(())
    }

    /// The most recent capture, if any.
    pub fn latest_capture(&self) -> Option<CaptureResult> {
        self.latest.lock().ok().and_then(|g| g.clone())
    }
}

fn resolve_background(bg: &BackgroundImage, viewport: Viewport) -> Result<ResolvedBackground> {
    let fit = |img: image::DynamicImage| {
        // "cover": scale to fill, crop the overflow
        Arc::new(
            img.resize_to_fill(viewport.width, viewport.height, FilterType::Triangle)
                .to_rgba8(),
        )
    };
    Ok(match bg {
        BackgroundImage::Solid(rgba) => ResolvedBackground::Solid(*rgba),
        BackgroundImage::Image(img) => {
            if img.dimensions() == (viewport.width, viewport.height) {
                ResolvedBackground::Image(img.clone())
            } else {
                let dynamic = image::DynamicImage::ImageRgba8(img.as_ref().clone());
                ResolvedBackground::Image(fit(dynamic))
            }
        }
        BackgroundImage::Path(path) => {
            let img = image::open(path).map_err(|e| {
                Error::CaptureFailure(format!(
                    "Failed to load background {}: {}",
                    path.display(),
                    e
                ))
            })?;
            ResolvedBackground::Image(fit(img))
        }
    })
}

fn write_temp_file(dir: Option<&Path>, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
    let suffix = format!(".{}", extension);
    let mut builder = tempfile::Builder::new();
    builder.prefix("scoreshare-").suffix(&suffix);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(bytes)?;
    file.flush()?;
    let (_, path) = file
        .keep()
        .map_err(|e| Error::CaptureFailure(format!("Failed to persist capture: {}", e)))?;
    Ok(path)
}

#[async_trait]
impl CaptureSurface for CardSurface {
    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureResult> {
        options.validate()?;
        let list = self.display_list.clone().ok_or(Error::UnmountedSurface)?;
        let viewport = self.viewport;
        let options = *options;
        let temp_dir = self.temp_dir.clone();

        let result = tokio::task::spawn_blocking(move || -> Result<CaptureResult> {
            let img = raster::rasterize(&list, viewport);
            let bytes = raster::encode(&img, options.format, options.quality)?;
            let (uri, path) = match options.result {
                ResultKind::TmpFile => {
                    let extension = options.format.extension();
                    let path = write_temp_file(temp_dir.as_deref(), extension, &bytes)?;
                    let uri = url::Url::from_file_path(&path).map_err(|_| {
                        Error::CaptureFailure(format!("Not an absolute path: {}", path.display()))
                    })?;
                    (uri.to_string(), Some(path))
                }
                ResultKind::Base64 => (STANDARD.encode(&bytes), None),
                ResultKind::DataUri => {
                    let mime = options.format.mime_type();
                    (format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)), None)
                }
            };
            Ok(CaptureResult {
                uri,
                width: img.width(),
                height: img.height(),
                format: options.format,
                path,
            })
        })
        .await
        .map_err(|e| Error::CaptureFailure(format!("Capture task failed: {}", e)))??;

        log::debug!("captured card as {:?} ({:?})", result.format, options.result);
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(result.clone());
        }
        Ok(result)
    }
}
