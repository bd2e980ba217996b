//! Recording fakes for the capability traits

#![allow(dead_code)]

use async_trait::async_trait;
use scoreshare::platform::{
    ErrorLog, FileCleaner, FsCleaner, PermissionKind, PermissionProvider, PermissionRationale,
    PlatformCapabilities, Services, ShareRequest, ShareTarget,
};
use scoreshare::surface::CaptureSurface;
use scoreshare::{CaptureOptions, CaptureResult, Error, Result, ShareOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct CountingPermission {
    pub granted: bool,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub rationale: Mutex<Option<PermissionRationale>>,
}

impl CountingPermission {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            fail: false,
            calls: AtomicUsize::new(0),
            rationale: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(true)
        }
    }
}

#[async_trait]
impl PermissionProvider for CountingPermission {
    async fn request(
        &self,
        _kind: PermissionKind,
        rationale: &PermissionRationale,
    ) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.rationale.lock().unwrap() = Some(rationale.clone());
        if self.fail {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "permission service unavailable",
            )));
        }
        Ok(self.granted)
    }
}

/// Wraps a surface (or fails on its own) and counts capture calls
pub struct CountingSurface {
    pub inner: Option<Arc<dyn CaptureSurface>>,
    pub calls: AtomicUsize,
}

impl CountingSurface {
    pub fn wrapping(inner: Arc<dyn CaptureSurface>) -> Self {
        Self {
            inner: Some(inner),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            inner: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CaptureSurface for CountingSurface {
    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(inner) => inner.capture(options).await,
            None => Err(Error::CaptureFailure("encoder unavailable".into())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ShareBehavior {
    Complete,
    Cancel,
    Reject,
}

pub struct RecordingShare {
    pub behavior: ShareBehavior,
    pub requests: Mutex<Vec<ShareRequest>>,
}

impl RecordingShare {
    pub fn new(behavior: ShareBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ShareTarget for RecordingShare {
    async fn share(&self, request: &ShareRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior {
            ShareBehavior::Complete => Ok(()),
            ShareBehavior::Cancel => Err(Error::ShareCancelled),
            ShareBehavior::Reject => Err(Error::ShareRejected("no share targets".into())),
        }
    }
}

/// Counts deletions; delegates to `FsCleaner` unless told to fail
pub struct RecordingCleaner {
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingCleaner {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FileCleaner for RecordingCleaner {
    async fn delete_file(&self, uri: &str) -> Result<()> {
        self.calls.lock().unwrap().push(uri.to_string());
        if self.fail {
            return Err(Error::CleanupFailure("file is busy".into()));
        }
        FsCleaner::new().delete_file(uri).await
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub entries: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorLog for RecordingLog {
    fn error(&self, msg: &str) {
        self.entries.lock().unwrap().push(msg.to_string());
    }
}

/// Every fake plus the outcome list, wired into `Services`
pub struct Harness {
    pub permission: Arc<CountingPermission>,
    pub share: Arc<RecordingShare>,
    pub cleaner: Arc<RecordingCleaner>,
    pub log: Arc<RecordingLog>,
    pub outcomes: Arc<Mutex<Vec<ShareOutcome>>>,
}

impl Harness {
    pub fn new(permission: CountingPermission, share: ShareBehavior, cleanup_fails: bool) -> Self {
        Self {
            permission: Arc::new(permission),
            share: Arc::new(RecordingShare::new(share)),
            cleaner: Arc::new(RecordingCleaner::new(cleanup_fails)),
            log: Arc::new(RecordingLog::default()),
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn services(&self, capabilities: PlatformCapabilities) -> Services {
        Services::new(self.share.clone())
            .with_permissions(self.permission.clone())
            .with_files(self.cleaner.clone())
            .with_log(self.log.clone())
            .with_capabilities(capabilities)
    }

    pub fn recorder(&self) -> impl Fn(&ShareOutcome) + Send + Sync + 'static {
        let outcomes = self.outcomes.clone();
        move |o: &ShareOutcome| outcomes.lock().unwrap().push(o.clone())
    }

    pub fn outcomes(&self) -> Vec<ShareOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

pub fn android() -> PlatformCapabilities {
    PlatformCapabilities {
        storage_permission: true,
        temp_file_cleanup: true,
    }
}
