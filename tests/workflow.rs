//! End-to-end behaviour of the share workflow against recording fakes

mod common;

use common::{android, CountingPermission, CountingSurface, Harness, ShareBehavior};
use scoreshare::platform::{PlatformCapabilities, Platform};
use scoreshare::surface::{CaptureSurface, CardSurface};
use scoreshare::{
    CaptureOptions, CardContent, Error, ResultKind, ShareConfig, ShareOrchestrator, ShareStatus,
    WorkflowState,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn mounted_surface(content: &CardContent, temp_dir: &std::path::Path) -> Arc<dyn CaptureSurface> {
    let mut surface = CardSurface::new(content.clone()).with_temp_dir(temp_dir);
    surface.mount().expect("mount");
    Arc::new(surface)
}

fn tmp_file_config() -> ShareConfig {
    ShareConfig {
        capture: CaptureOptions {
            result: ResultKind::TmpFile,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn happy_path_reports_success_and_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
    let surface = Arc::new(CountingSurface::wrapping(mounted_surface(&content, dir.path())));

    let orch = ShareOrchestrator::new(
        &content,
        surface.clone(),
        h.services(android()),
        tmp_file_config(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    let outcomes = h.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ShareStatus::Success);
    assert_eq!(h.permission.calls.load(Ordering::SeqCst), 1);
    assert_eq!(surface.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.share.count(), 1);
    assert_eq!(h.cleaner.count(), 1);
    assert!(h.log.entries().is_empty());
    assert_eq!(orch.state(), WorkflowState::Succeeded);

    // the captured file was handed over and then deleted
    let shared_uri = h.share.requests.lock().unwrap()[0].url.clone();
    assert!(shared_uri.starts_with("file://"));
    let path = url::Url::parse(&shared_uri).unwrap().to_file_path().unwrap();
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn permission_denied_is_silent_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(false), ShareBehavior::Complete, false);
    let surface = Arc::new(CountingSurface::wrapping(mounted_surface(&content, dir.path())));

    let orch = ShareOrchestrator::new(
        &content,
        surface.clone(),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    assert!(h.outcomes().is_empty(), "denial must not invoke the callback");
    assert_eq!(surface.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.share.count(), 0);
    assert_eq!(h.cleaner.count(), 0);
    assert_eq!(h.log.entries(), vec![Error::PermissionDenied.to_string()]);
    assert_eq!(orch.state(), WorkflowState::Denied);
}

#[tokio::test]
async fn permission_denied_can_be_reported() {
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(false), ShareBehavior::Complete, false);
    let surface = Arc::new(CountingSurface::failing());
    let cfg = ShareConfig {
        report_permission_denied: true,
        ..Default::default()
    };

    let orch = ShareOrchestrator::new(&content, surface.clone(), h.services(android()), cfg)
        .unwrap()
        .on_share(h.recorder());
    orch.share_score().await;

    let outcomes = h.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status.as_str(), "permission_denied");
    assert_eq!(surface.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn permission_request_error_counts_as_denial() {
    let content = CardContent::new("A", "1");
    let h = Harness::new(CountingPermission::failing(), ShareBehavior::Complete, false);
    let surface = Arc::new(CountingSurface::failing());

    let orch = ShareOrchestrator::new(
        &content,
        surface.clone(),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    assert!(h.outcomes().is_empty());
    assert_eq!(surface.calls.load(Ordering::SeqCst), 0);
    let logs = h.log.entries();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].starts_with("Permission request failed"));
    assert_eq!(logs[1], Error::PermissionDenied.to_string());
}

#[tokio::test]
async fn permission_is_requested_with_rationale() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("A", "1");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
    let orch = ShareOrchestrator::new(
        &content,
        mounted_surface(&content, dir.path()),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap();
    orch.share_score().await;
    orch.share_score().await;

    // asked fresh on every invocation
    assert_eq!(h.permission.calls.load(Ordering::SeqCst), 2);
    let rationale = h.permission.rationale.lock().unwrap().clone().unwrap();
    assert_eq!(rationale.title, "Storage Permission");
    assert_eq!(rationale.button_neutral, "Ask Me Later");
}

#[tokio::test]
async fn capture_failure_reports_error_without_share_or_cleanup() {
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
    let surface = Arc::new(CountingSurface::failing());

    let orch = ShareOrchestrator::new(
        &content,
        surface.clone(),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    let outcomes = h.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ShareStatus::Error);
    assert!(outcomes[0].detail.as_deref().unwrap().contains("encoder unavailable"));
    assert_eq!(h.share.count(), 0);
    assert_eq!(h.cleaner.count(), 0);
    assert_eq!(orch.state(), WorkflowState::Failed);
    assert!(h.log.entries()[0].starts_with("Error sharing:"));
}

#[tokio::test]
async fn unmounted_surface_reports_error() {
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
    let unmounted: Arc<dyn CaptureSurface> = Arc::new(CardSurface::new(content.clone()));

    let orch = ShareOrchestrator::new(
        &content,
        unmounted,
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    let outcomes = h.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ShareStatus::Error);
    assert_eq!(h.share.count(), 0);
}

#[tokio::test]
async fn share_cancel_and_reject_are_errors() {
    for behavior in [ShareBehavior::Cancel, ShareBehavior::Reject] {
        let dir = tempfile::tempdir().unwrap();
        let content = CardContent::new("John Doe", "1500");
        let h = Harness::new(CountingPermission::new(true), behavior, false);

        let orch = ShareOrchestrator::new(
            &content,
            mounted_surface(&content, dir.path()),
            h.services(android()),
            tmp_file_config(),
        )
        .unwrap()
        .on_share(h.recorder());
        orch.share_score().await;

        let outcomes = h.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, ShareStatus::Error);
        assert_eq!(h.share.count(), 1);
        // cleanup only runs on the success path
        assert_eq!(h.cleaner.count(), 0);
        assert_eq!(orch.state(), WorkflowState::Failed);
    }
}

#[tokio::test]
async fn cleanup_failure_keeps_success() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, true);

    let orch = ShareOrchestrator::new(
        &content,
        mounted_surface(&content, dir.path()),
        h.services(android()),
        tmp_file_config(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    let outcomes = h.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ShareStatus::Success);
    assert_eq!(h.cleaner.count(), 1);
    let logs = h.log.entries();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("Error cleaning up temp file:"));
    assert_eq!(orch.state(), WorkflowState::Succeeded);
}

#[tokio::test]
async fn platforms_without_gates_skip_permission_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(false), ShareBehavior::Complete, false);

    let orch = ShareOrchestrator::new(
        &content,
        mounted_surface(&content, dir.path()),
        h.services(PlatformCapabilities::for_platform(Platform::Ios)),
        tmp_file_config(),
    )
    .unwrap()
    .on_share(h.recorder());
    orch.share_score().await;

    assert_eq!(h.outcomes()[0].status, ShareStatus::Success);
    assert_eq!(h.permission.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.cleaner.count(), 0);
    // no cleanup capability: the file stays with the host
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn message_contains_name_and_score_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("John Doe", "1500"),
        ("Zoë «The Wall»", "9 999 999"),
        ("{score}", "{player}"),
        ("", "0"),
    ];
    for (name, score) in cases {
        let content = CardContent::new(name, score);
        let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
        let orch = ShareOrchestrator::new(
            &content,
            mounted_surface(&content, dir.path()),
            h.services(android()),
            ShareConfig::default(),
        )
        .unwrap()
        .on_share(h.recorder());
        orch.share_score().await;

        let requests = h.share.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert!(req.message.contains(name), "{:?} missing from {:?}", name, req.message);
        assert!(req.message.contains(score), "{:?} missing from {:?}", score, req.message);
        assert_eq!(req.title, "Game Score");
        assert_eq!(req.mime_type, "image/png");
        assert!(req.url.starts_with("data:image/png;base64,"));
    }
}

#[tokio::test]
async fn every_invocation_reports_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Complete, false);
    let orch = ShareOrchestrator::new(
        &content,
        mounted_surface(&content, dir.path()),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap()
    .on_share(h.recorder());

    for n in 1..=3 {
        orch.share_score().await;
        assert_eq!(h.outcomes().len(), n);
    }
    assert_eq!(h.cleaner.count(), 3);
}

#[tokio::test]
async fn missing_callback_is_fine() {
    let content = CardContent::new("John Doe", "1500");
    let h = Harness::new(CountingPermission::new(true), ShareBehavior::Reject, false);
    let orch = ShareOrchestrator::new(
        &content,
        Arc::new(CountingSurface::failing()),
        h.services(android()),
        ShareConfig::default(),
    )
    .unwrap();
    orch.share_score().await;
    assert_eq!(orch.state(), WorkflowState::Failed);
    assert_eq!(h.log.entries().len(), 1);
}
