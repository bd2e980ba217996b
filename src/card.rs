//! `ScoreCard`: the embeddable component tying surface and orchestrator
//! together. Integrators supply the player name, score, background and an
//! `on_share` callback, then call `share_score` from their share button.

use crate::orchestrator::{ShareOrchestrator, WorkflowState};
use crate::platform::Services;
use crate::surface::{CaptureSurface, CardSurface};
use crate::{CaptureOptions, CaptureResult, CardContent, Error, Result, ShareConfig, ShareOutcome};
use std::sync::Arc;

pub struct ScoreCard {
    surface: Arc<CardSurface>,
    orchestrator: ShareOrchestrator,
}

impl ScoreCard {
    /// Build the surface, run its layout pass and wire up the orchestrator.
    pub async fn mount(
        content: CardContent,
        services: Services,
        config: ShareConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut surface = CardSurface::new(content.clone());
        if let Some(dir) = &config.temp_dir {
            surface = surface.with_temp_dir(dir);
        }
        let surface = tokio::task::spawn_blocking(move || -> Result<CardSurface> {
            surface.mount()?;
            Ok(surface)
        })
        .await
        .map_err(|e| Error::CaptureFailure(format!("Mount task failed: {}", e)))??;

        let surface = Arc::new(surface);
        let orchestrator = ShareOrchestrator::new(&content, surface.clone(), services, config)?;
        Ok(Self { surface, orchestrator })
    }

    pub fn on_share<F>(mut self, cb: F) -> Self
    where
        F: Fn(&ShareOutcome) + Send + Sync + 'static,
    {
        self.orchestrator = self.orchestrator.on_share(cb);
        self
    }

    /// The share button handler.
    pub async fn share_score(&self) {
        self.orchestrator.share_score().await
    }

    /// Capture without sharing; the caller owns any file produced.
    pub async fn capture(&self, options: &CaptureOptions) -> Result<CaptureResult> {
        self.surface.capture(options).await
    }

    pub fn surface(&self) -> &CardSurface {
        &self.surface
    }

    pub fn state(&self) -> WorkflowState {
        self.orchestrator.state()
    }
}
