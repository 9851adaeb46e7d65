// autoscale-client/tests/sync_integration.rs
// End-to-end tests against an in-process console endpoint

use autoscale_client::testing::{Notification, RecordingListing, RecordingNotifier};
use autoscale_client::{
    Collaborators, FailureKind, LaunchConfigSync, LaunchConfigurationSpec, NetworkTransport,
    RefreshChannel, SyncConfig, SyncState,
};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::routing::post;
use axum::Router;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct RecordedRequest {
    query: Option<String>,
    content_type: Option<String>,
    cookie: Option<String>,
    body: String,
}

#[derive(Clone)]
struct Console {
    status: StatusCode,
    reply: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Console {
    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn autoscaling(
    State(console): State<Console>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    console.requests.lock().unwrap().push(RecordedRequest {
        query: uri.query().map(String::from),
        content_type: header_str(header::CONTENT_TYPE),
        cookie: header_str(header::COOKIE),
        body,
    });
    (
        console.status,
        [(header::CONTENT_TYPE, "application/json")],
        console.reply.clone(),
    )
}

/// Serve a console stub answering every action with `status` and `reply`
async fn spawn_console(status: StatusCode, reply: &str) -> (String, Console) {
    let console = Console {
        status,
        reply: reply.to_string(),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/autoscaling", post(autoscaling))
        .with_state(console.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), console)
}

struct Harness {
    sync: LaunchConfigSync,
    notifier: Arc<RecordingNotifier>,
    listing: Arc<RecordingListing>,
}

/// Network transport with `_xsrf` stored in its cookie jar
fn harness(base_url: &str) -> Harness {
    let transport = NetworkTransport::new(&SyncConfig::new(base_url).with_timeout(5)).unwrap();
    transport.add_cookie("_xsrf=cookie-token; Path=/").unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let listing = Arc::new(RecordingListing::default());
    let collab = Collaborators::new(
        Arc::new(transport.token_source().unwrap()),
        notifier.clone(),
        listing.clone(),
    );

    Harness {
        sync: LaunchConfigSync::new(Arc::new(transport), collab),
        notifier,
        listing,
    }
}

#[tokio::test]
async fn test_create_round_trip() {
    let (url, console) = spawn_console(StatusCode::OK, r#"{"results": true}"#).await;
    let h = harness(&url);

    let spec = LaunchConfigurationSpec::new("web-lc-1")
        .with_image_id("ami-123")
        .with_instance_type("m1.small");
    let state = h.sync.create(spec).wait().await;

    assert_eq!(state, SyncState::Succeeded);
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Success {
            title: None,
            message: "Successfully created launch configuration web-lc-1".into(),
        }]
    );
    assert_eq!(h.listing.count(), 1);

    let requests = console.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.query.as_deref(), Some("Action=CreateLaunchConfiguration"));
    assert_eq!(
        req.body,
        "_xsrf=cookie-token&LaunchConfigurationName=web-lc-1&ImageId=ami-123&InstanceType=m1.small"
    );
    assert!(req
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded")));
    assert!(req.cookie.as_deref().is_some_and(|c| c.contains("_xsrf=cookie-token")));
}

#[tokio::test]
async fn test_create_encodes_user_data() {
    let (url, console) = spawn_console(StatusCode::OK, r#"{"results": true}"#).await;
    let h = harness(&url);

    let spec = LaunchConfigurationSpec::new("web-lc-1")
        .with_user_data("#!/bin/sh\necho a&b")
        .with_instance_monitoring(false);
    h.sync.create_now(&spec).await;

    assert_eq!(
        console.requests()[0].body,
        "_xsrf=cookie-token&LaunchConfigurationName=web-lc-1\
         &UserData=%23%21%2Fbin%2Fsh%0Aecho+a%26b&InstanceMonitoring=false"
    );
}

#[tokio::test]
async fn test_delete_rejected_by_service() {
    let (url, console) = spawn_console(StatusCode::OK, r#"{"results": false}"#).await;
    let h = harness(&url);

    let state = h
        .sync
        .delete(LaunchConfigurationSpec::new("web-lc-1").with_image_id("ami-123"))
        .wait()
        .await;

    assert_eq!(state, SyncState::Failed(FailureKind::Application));
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Error {
            title: "Failed to delete launch configuration web-lc-1".into(),
            detail: "An unknown error occurred".into(),
        }]
    );
    assert_eq!(h.listing.count(), 0);

    let requests = console.requests();
    assert_eq!(requests[0].query.as_deref(), Some("Action=DeleteLaunchConfiguration"));
    assert_eq!(requests[0].body, "_xsrf=cookie-token&LaunchConfigurationName=web-lc-1");
}

#[tokio::test]
async fn test_error_status_with_message() {
    let (url, _console) = spawn_console(
        StatusCode::BAD_REQUEST,
        r#"{"message": "Launch configuration web-lc-1 already exists"}"#,
    )
    .await;
    let h = harness(&url);

    let state = h.sync.create_now(&LaunchConfigurationSpec::new("web-lc-1")).await;

    assert_eq!(state, SyncState::Failed(FailureKind::Transport));
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Error {
            title: "Failed to create launch configuration web-lc-1".into(),
            detail: "Launch configuration web-lc-1 already exists".into(),
        }]
    );
    assert_eq!(h.listing.count(), 0);
}

#[tokio::test]
async fn test_error_status_without_body() {
    let (url, _console) = spawn_console(StatusCode::SERVICE_UNAVAILABLE, "").await;
    let h = harness(&url);

    let state = h.sync.delete_now(&LaunchConfigurationSpec::new("web-lc-1")).await;

    assert_eq!(state, SyncState::Failed(FailureKind::Transport));
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Error {
            title: "Failed to delete launch configuration web-lc-1".into(),
            detail: "Service Unavailable".into(),
        }]
    );
    assert_eq!(h.listing.count(), 0);
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let (url, _console) = spawn_console(StatusCode::OK, "<html>login</html>").await;
    let h = harness(&url);

    let state = h.sync.create_now(&LaunchConfigurationSpec::new("web-lc-1")).await;

    assert_eq!(state, SyncState::Failed(FailureKind::Transport));
    let notes = h.notifier.take();
    assert_eq!(notes.len(), 1);
    assert!(matches!(&notes[0], Notification::Error { .. }));
    assert_eq!(h.listing.count(), 0);
}

#[tokio::test]
async fn test_unreachable_server() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = harness(&format!("http://{}", addr));
    let state = h.sync.create_now(&LaunchConfigurationSpec::new("web-lc-1")).await;

    assert_eq!(state, SyncState::Failed(FailureKind::Transport));
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Error {
            title: "Failed to create launch configuration web-lc-1".into(),
            detail: "Unable to reach the server".into(),
        }]
    );
}

#[tokio::test]
async fn test_concurrent_creates_each_notify_once() {
    let (url, console) = spawn_console(StatusCode::OK, r#"{"results": true}"#).await;
    let h = harness(&url);

    let first = h.sync.create(LaunchConfigurationSpec::new("web-lc-1"));
    let second = h.sync.create(LaunchConfigurationSpec::new("web-lc-1"));
    let (a, b) = tokio::join!(first.wait(), second.wait());

    assert_eq!(a, SyncState::Succeeded);
    assert_eq!(b, SyncState::Succeeded);
    assert_eq!(console.requests().len(), 2);
    assert_eq!(h.notifier.take().len(), 2);
    assert_eq!(h.listing.count(), 2);
}

#[tokio::test]
async fn test_from_config_with_catalog_override() {
    let (url, console) = spawn_console(StatusCode::OK, r#"{"results": [{"name": "web-lc-1"}]}"#).await;

    let mut catalog = tempfile::NamedTempFile::new().unwrap();
    writeln!(catalog, "create_launch_config_run_success = Created {{0}}").unwrap();

    let config = SyncConfig::new(&url)
        .with_xsrf_token("static-token")
        .with_message_catalog(catalog.path());
    let listing = Arc::new(RefreshChannel::new(4));
    let mut refreshes = listing.subscribe();
    let notifier = Arc::new(RecordingNotifier::default());
    let sync = LaunchConfigSync::from_config(&config, listing.clone())
        .unwrap()
        .with_notifier(notifier.clone());

    let state = sync
        .create(LaunchConfigurationSpec::new("web-lc-1").with_spot_price("0.050"))
        .wait()
        .await;

    assert_eq!(state, SyncState::Succeeded);
    assert_eq!(
        notifier.take(),
        vec![Notification::Success {
            title: None,
            message: "Created web-lc-1".into(),
        }]
    );
    assert!(refreshes.try_recv().is_ok());
    assert_eq!(
        console.requests()[0].body,
        "_xsrf=static-token&LaunchConfigurationName=web-lc-1&SpotPrice=0.050"
    );
}

#[tokio::test]
async fn test_from_config_missing_catalog() {
    let config = SyncConfig::new("http://127.0.0.1:1").with_message_catalog("/nonexistent/messages.properties");
    let result = LaunchConfigSync::from_config(&config, Arc::new(RefreshChannel::default()));
    assert!(result.is_err());
}
