//! Share orchestrator: permission gate, capture, share, cleanup
//!
//! One call to `share_score` runs the whole workflow to a terminal state and
//! reports through the `on_share` callback. Nothing is returned and nothing is
//! raised to the caller; diagnostics go to the injected `ErrorLog`.

use crate::platform::{PermissionKind, Services, ShareRequest};
use crate::surface::CaptureSurface;
use crate::{CaptureResult, CardContent, Error, Result, ShareConfig, ShareOutcome};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Outcome callback
pub type OnShare = Arc<dyn Fn(&ShareOutcome) + Send + Sync>;

/// Where the most recent invocation is (or ended)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    PermissionPending,
    Capturing,
    Sharing,
    /// Transient; always returns to `Succeeded`
    CleaningUp,
    Succeeded,
    Failed,
    /// The permission gate refused; nothing was captured
    Denied,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowState::Succeeded | WorkflowState::Failed | WorkflowState::Denied
        )
    }
}

pub struct ShareOrchestrator {
    player_name: String,
    score: String,
    surface: Arc<dyn CaptureSurface>,
    services: Services,
    config: ShareConfig,
    on_share: Option<OnShare>,
    state: Mutex<WorkflowState>,
}

impl fmt::Debug for ShareOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareOrchestrator")
            .field("player_name", &self.player_name)
            .field("score", &self.score)
            .field("services", &self.services)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ShareOrchestrator {
    /// Fails only on an invalid `config`.
    pub fn new(
        content: &CardContent,
        surface: Arc<dyn CaptureSurface>,
        services: Services,
        config: ShareConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            player_name: content.player_name.clone(),
            score: content.score.clone(),
            surface,
            services,
            config,
            on_share: None,
            state: Mutex::new(WorkflowState::Idle),
        })
    }

    /// Register the outcome callback, replacing any previous one.
    pub fn on_share<F>(mut self, cb: F) -> Self
    where
        F: Fn(&ShareOutcome) + Send + Sync + 'static,
    {
        self.on_share = Some(Arc::new(cb));
        self
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn state(&self) -> WorkflowState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(WorkflowState::Failed)
    }

    fn transition(&self, next: WorkflowState) {
        if let Ok(mut state) = self.state.lock() {
            log::debug!("share workflow: {:?} -> {:?}", *state, next);
            *state = next;
        }
    }

    fn report(&self, outcome: ShareOutcome) {
        if let Some(cb) = &self.on_share {
            cb(&outcome);
        }
    }

    /// Metadata handed to the share target for a capture
    pub fn share_request(&self, capture: &CaptureResult) -> ShareRequest {
        ShareRequest {
            title: self.config.title.clone(),
            message: self.config.message(&self.player_name, &self.score),
            url: capture.uri.clone(),
            mime_type: capture.format.mime_type().to_string(),
        }
    }

    /// Run one capture-and-share attempt.
    ///
    /// Reports `success` or `error` exactly once, except on permission denial
    /// which stays silent unless `report_permission_denied` is set. Overlapping
    /// calls on one surface are not guarded.
    pub async fn share_score(&self) {
        self.transition(WorkflowState::Idle);

        if self.services.capabilities.storage_permission && !self.permission_granted().await {
            self.services.log.error(&Error::PermissionDenied.to_string());
            self.transition(WorkflowState::Denied);
            if self.config.report_permission_denied {
                self.report(ShareOutcome::permission_denied());
            }
            return;
        }

        let capture = match self.capture_and_share().await {
            Ok(capture) => capture,
            Err(err) => {
                self.services.log.error(&format!("Error sharing: {}", err));
                self.transition(WorkflowState::Failed);
                self.report(ShareOutcome::error(err.to_string()));
                return;
            }
        };

        self.transition(WorkflowState::Succeeded);
        self.report(ShareOutcome::success());

        if self.services.capabilities.temp_file_cleanup {
            self.cleanup(&capture).await;
        }
    }

    async fn permission_granted(&self) -> bool {
        self.transition(WorkflowState::PermissionPending);
        match self
            .services
            .permissions
            .request(PermissionKind::WriteExternalStorage, &self.config.rationale)
            .await
        {
            Ok(granted) => granted,
            Err(err) => {
                self.services
                    .log
                    .error(&format!("Permission request failed: {}", err));
                false
            }
        }
    }

    async fn capture_and_share(&self) -> Result<CaptureResult> {
        self.transition(WorkflowState::Capturing);
        let capture = self.surface.capture(&self.config.capture).await?;

        self.transition(WorkflowState::Sharing);
        let request = self.share_request(&capture);
        self.services.share.share(&request).await?;
        Ok(capture)
    }

    async fn cleanup(&self, capture: &CaptureResult) {
        self.transition(WorkflowState::CleaningUp);
        if let Err(err) = self.services.files.delete_file(&capture.uri).await {
            self.services
                .log
                .error(&format!("Error cleaning up temp file: {}", err));
        }
        self.transition(WorkflowState::Succeeded);
    }
}
