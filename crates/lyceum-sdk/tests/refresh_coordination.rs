//! Refresh coordination tests with in-process transports
//!
//! The transport records every send in initiation order and answers 401 to
//! anything not carrying `T2`. The refresher blocks on a gate so tests can
//! line up queued requests before the refresh settles.

use async_trait::async_trait;
use lyceum_sdk::auth::{AuthError, AuthResult, RefreshedTokens};
use lyceum_sdk::{
    ApiError, ApiRequest, ApiResponse, ClientBuilder, LyceumClient, RefreshState,
    RefreshTransport, SessionEvent, Transport,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(String, Option<String>)>>,
    slow_gate: Notify,
}

impl RecordingTransport {
    fn sent_with(&self, token: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(_, bearer)| bearer.as_deref() == Some(token))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> lyceum_sdk::Result<ApiResponse> {
        let bearer = request.bearer_token().map(str::to_string);
        self.sent.lock().push((request.path.clone(), bearer.clone()));

        if request.path == "/slow" && bearer.as_deref() == Some("T1") {
            self.slow_gate.notified().await;
        }

        if bearer.as_deref() == Some("T2") {
            let body = json!({ "path": request.path }).to_string();
            Ok(ApiResponse::new(StatusCode::OK, body))
        } else {
            Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, Vec::new()))
        }
    }
}

struct GatedRefresher {
    calls: AtomicUsize,
    gate: Notify,
    gated: bool,
    succeed: bool,
}

impl GatedRefresher {
    fn new(gated: bool, succeed: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
            gated,
            succeed,
        }
    }

    fn release(&self) {
        self.gate.notify_one();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshTransport for GatedRefresher {
    async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<RefreshedTokens> {
        assert_eq!(refresh_token, Some("R1"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.gate.notified().await;
        }
        if self.succeed {
            Ok(RefreshedTokens {
                access_token: Some("T2".into()),
                refresh_token: None,
            })
        } else {
            Err(AuthError::RefreshRejected {
                status: 401,
                message: "refresh token revoked".into(),
            })
        }
    }
}

fn client_with(
    transport: &Arc<RecordingTransport>,
    refresher: &Arc<GatedRefresher>,
) -> Arc<LyceumClient> {
    let client = ClientBuilder::default()
        .with_tokens("T1", "R1")
        .transport(transport.clone())
        .refresh_transport(refresher.clone())
        .build()
        .unwrap();
    Arc::new(client)
}

fn spawn_get(
    client: &Arc<LyceumClient>,
    path: &str,
) -> tokio::task::JoinHandle<lyceum_sdk::Result<Value>> {
    let client = Arc::clone(client);
    let path = path.to_string();
    tokio::spawn(async move { client.get::<Value>(&path).await })
}

async fn wait_for_pending(client: &LyceumClient, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.coordinator().pending_len() != expected {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("requests did not queue up in time");
}

#[tokio::test]
async fn test_concurrent_401s_trigger_one_refresh() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, true));
    let client = client_with(&transport, &refresher);

    let handles: Vec<_> = (0..8)
        .map(|i| spawn_get(&client, &format!("/students/s-{i}")))
        .collect();

    wait_for_pending(&client, 8).await;
    assert_eq!(client.coordinator().state(), RefreshState::Refreshing);
    refresher.release();

    for (i, handle) in handles.into_iter().enumerate() {
        let body = handle.await.unwrap().unwrap();
        assert_eq!(body["path"], format!("/students/s-{i}"));
    }

    assert_eq!(refresher.calls(), 1);
    assert_eq!(transport.sent_with("T1").len(), 8);
    assert_eq!(transport.sent_with("T2").len(), 8);
    assert_eq!(client.access_token().as_deref(), Some("T2"));
    assert_eq!(client.coordinator().state(), RefreshState::Idle);
    assert_eq!(client.coordinator().pending_len(), 0);
}

#[tokio::test]
async fn test_queued_requests_replay_in_registration_order() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, true));
    let client = client_with(&transport, &refresher);

    let a = spawn_get(&client, "/a");
    wait_for_pending(&client, 1).await;
    let b = spawn_get(&client, "/b");
    wait_for_pending(&client, 2).await;
    let c = spawn_get(&client, "/c");
    wait_for_pending(&client, 3).await;

    refresher.release();
    for handle in [a, b, c] {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(transport.sent_with("T2"), vec!["/a", "/b", "/c"]);
}

#[tokio::test]
async fn test_failed_refresh_rejects_queue_and_clears_store() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, false));
    let client = client_with(&transport, &refresher);
    let mut events = client.subscribe();

    let handles: Vec<_> = ["/a", "/b", "/c"]
        .iter()
        .map(|path| spawn_get(&client, path))
        .collect();
    wait_for_pending(&client, 3).await;
    refresher.release();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(
            matches!(err, ApiError::AuthExpired { ref message } if message.contains("refresh token revoked")),
            "got {err:?}"
        );
    }

    assert_eq!(refresher.calls(), 1);
    assert!(transport.sent_with("T2").is_empty());
    assert_eq!(client.access_token(), None);
    assert_eq!(client.coordinator().state(), RefreshState::Idle);
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Expired { .. }
    ));
}

#[tokio::test]
async fn test_abandoned_leader_does_not_stall_followers() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, true));
    let client = client_with(&transport, &refresher);

    let leader = spawn_get(&client, "/leader");
    wait_for_pending(&client, 1).await;
    let follower = spawn_get(&client, "/follower");
    wait_for_pending(&client, 2).await;

    leader.abort();
    refresher.release();

    let body = follower.await.unwrap().unwrap();
    assert_eq!(body["path"], "/follower");
    assert_eq!(client.coordinator().state(), RefreshState::Idle);
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_logout_during_refresh_stays_logged_out() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, true));
    let client = client_with(&transport, &refresher);

    let request = spawn_get(&client, "/a");
    wait_for_pending(&client, 1).await;

    client.logout().unwrap();
    let mut events = client.subscribe();
    refresher.release();

    let err = request.await.unwrap().unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired { .. }), "got {err:?}");
    assert!(!client.is_authenticated());
    assert_eq!(client.access_token(), None);
    assert!(client.credentials().snapshot().is_none());
    assert!(transport.sent_with("T2").is_empty());
    assert_eq!(client.coordinator().state(), RefreshState::Idle);
    // logout already announced the end of the session
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_refresh_keeps_login_made_meanwhile() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(true, false));
    let client = client_with(&transport, &refresher);

    let request = spawn_get(&client, "/a");
    wait_for_pending(&client, 1).await;

    client
        .credentials()
        .set("T9", Some("R9".into()), None)
        .unwrap();
    let mut events = client.subscribe();
    refresher.release();

    let err = request.await.unwrap().unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired { .. }), "got {err:?}");
    assert_eq!(client.access_token().as_deref(), Some("T9"));
    assert_eq!(client.credentials().refresh_token().as_deref(), Some("R9"));
    assert_eq!(client.coordinator().state(), RefreshState::Idle);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_late_401_reuses_completed_refresh() {
    let transport = Arc::new(RecordingTransport::default());
    let refresher = Arc::new(GatedRefresher::new(false, true));
    let client = client_with(&transport, &refresher);

    // goes out with T1 and is held by the transport
    let slow = spawn_get(&client, "/slow");
    tokio::time::timeout(Duration::from_secs(5), async {
        while transport.sent_with("T1").is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();

    client.get::<Value>("/fast").await.unwrap();
    assert_eq!(refresher.calls(), 1);

    // its 401 now arrives after T2 is already in place
    transport.slow_gate.notify_one();
    let body = slow.await.unwrap().unwrap();

    assert_eq!(body["path"], "/slow");
    assert_eq!(refresher.calls(), 1);
    assert_eq!(transport.sent_with("T2"), vec!["/fast", "/slow"]);
}

#[tokio::test]
async fn test_missing_access_token_is_a_failed_refresh() {
    struct EmptyRefresher;

    #[async_trait]
    impl RefreshTransport for EmptyRefresher {
        async fn refresh(&self, _: Option<&str>) -> AuthResult<RefreshedTokens> {
            Ok(RefreshedTokens::default())
        }
    }

    let transport = Arc::new(RecordingTransport::default());
    let client = ClientBuilder::default()
        .with_tokens("T1", "R1")
        .transport(transport.clone())
        .refresh_transport(Arc::new(EmptyRefresher))
        .build()
        .unwrap();

    let err = client.get::<Value>("/groups").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired { .. }), "got {err:?}");
    assert!(!client.is_authenticated());
}
