use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tower::ServiceExt;
use wadash_auth::hash::hash_password_with_cost;
use wadash_core::error::WadashError;
use wadash_core::event::PushEvent;
use wadash_core::record::CredentialRecord;
use wadash_core::traits::CredentialStore;

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

/// Records every call; optionally fails sends or teardown.
#[derive(Default)]
struct MockAutomation {
    sent: Mutex<Vec<(String, String)>>,
    destroyed: Mutex<usize>,
    initialized: tokio::sync::Notify,
    fail_send: bool,
    fail_destroy: bool,
}

#[async_trait]
impl Automation for MockAutomation {
    fn name(&self) -> &str {
        "mock"
    }

    async fn initialize(&self, _events: mpsc::Sender<AutomationEvent>) -> Result<(), WadashError> {
        self.initialized.notify_one();
        Ok(())
    }

    async fn send_message(&self, recipient: &str, body: &str) -> Result<(), WadashError> {
        if self.fail_send {
            return Err(WadashError::Automation("connection reset".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), body.to_string()));
        Ok(())
    }

    async fn destroy(&self) -> Result<(), WadashError> {
        *self.destroyed.lock().unwrap() += 1;
        if self.fail_destroy {
            return Err(WadashError::Automation("already gone".into()));
        }
        Ok(())
    }
}

struct MemoryStore(HashMap<String, CredentialRecord>);

#[async_trait]
impl CredentialStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, WadashError> {
        Ok(self.0.get(username).cloned())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    state: AppState,
    automation: Arc<MockAutomation>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn router(&self) -> Router {
        build_router(
            self.state.clone(),
            &self.dir.path().join("public"),
            "http://localhost:8080",
        )
    }

    async fn pair(&self) {
        self.state
            .tracker
            .handle(AutomationEvent::Ready {
                client_identity: "6281234567".into(),
            })
            .await;
    }
}

fn harness_with(automation: MockAutomation, repair_after_logout: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("public")).unwrap();
    std::fs::create_dir_all(dir.path().join("views")).unwrap();
    std::fs::write(dir.path().join("public").join("app.js"), "console.log(1);").unwrap();
    std::fs::write(dir.path().join("views").join("dashboard.html"), "dashboard page").unwrap();
    std::fs::write(dir.path().join("views").join("index.html"), "login page").unwrap();
    std::fs::write(dir.path().join("views").join("404.html"), "missing page").unwrap();

    let mut users = HashMap::new();
    users.insert(
        "admin".to_string(),
        CredentialRecord {
            username: "admin".into(),
            password: Some(hash_password_with_cost("hunter22", 4).unwrap()),
        },
    );

    let automation = Arc::new(automation);
    let (events, _rx) = mpsc::channel(8);
    let state = AppState {
        gate: Arc::new(SessionGate::new()),
        tracker: Arc::new(PairingTracker::new()),
        verifier: CredentialVerifier::new(Arc::new(MemoryStore(users))),
        automation: automation.clone(),
        events,
        views_dir: dir.path().join("views"),
        repair_after_logout,
    };
    Harness {
        state,
        automation,
        dir,
    }
}

fn harness() -> Harness {
    harness_with(MockAutomation::default(), false)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: Response<Body>) -> Value {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(resp: Response<Body>) -> String {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

// ---------------------------------------------------------------------------
// Pages and login flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dashboard_redirects_when_logged_out() {
    let h = harness();
    let resp = h.router().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_login_page_when_logged_out() {
    let h = harness();
    let resp = h.router().oneshot(get("/login")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "login page");
}

#[tokio::test]
async fn test_login_success_opens_session() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json(
            "/login",
            r#"{"username":"admin","password":"hunter22"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(
        json,
        json!({"code": 200, "status": "success", "message": "Successfully login"})
    );
    assert!(h.state.gate.is_logged_in());

    let resp = h.router().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "dashboard page");

    let resp = h.router().oneshot(get("/login")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json(
            "/login",
            r#"{"username":"admin","password":"hunter23"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["code"], 401);
    assert_eq!(json["status"], "Unauthorized");
    assert_eq!(json["message"], "Wrong username or password");
    assert!(!h.state.gate.is_logged_in());
}

#[tokio::test]
async fn test_login_unknown_account() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json(
            "/login",
            r#"{"username":"nobody","password":"hunter22"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "Account not found");
}

#[tokio::test]
async fn test_login_validation_error() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json("/login", r#"{"username":"ab","password":"validpass"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Bad Request");
    assert_eq!(
        json["message"],
        "Username must be at least 3 characters long"
    );
}

#[tokio::test]
async fn test_login_malformed_json() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json("/login", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["code"], 400);
    assert_eq!(json["status"], "Bad Request");
}

#[tokio::test]
async fn test_login_process_follows_gate() {
    let h = harness();
    let resp = h.router().oneshot(get("/login/process")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(!h.state.gate.is_logged_in());

    h.state.gate.login();
    let resp = h.router().oneshot(get("/login/process")).await.unwrap();
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_logout_closes_session() {
    let h = harness();
    h.state.gate.login();
    let resp = h.router().oneshot(get("/logout")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(!h.state.gate.is_logged_in());
}

#[tokio::test]
async fn test_static_asset_served() {
    let h = harness();
    let resp = h.router().oneshot(get("/app.js")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "console.log(1);");
}

#[tokio::test]
async fn test_unknown_path_renders_404_page() {
    let h = harness();
    let resp = h.router().oneshot(get("/no/such/page")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "missing page");
}

// ---------------------------------------------------------------------------
// Admin: send message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_send_while_unpaired_never_calls_client() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json(
            "/admin/whatsapp/send-message",
            r#"{"phone_number":"6281234567","message":"hi"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Failed");
    assert_eq!(
        json["message"],
        "WhatsApp is not logged in. Please scan the QR code to log in."
    );
    assert!(h.automation.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_success_normalizes_recipient() {
    let h = harness();
    h.pair().await;
    let resp = h
        .router()
        .oneshot(post_json(
            "/admin/whatsapp/send-message",
            r#"{"phone_number":" +6281234567 ","message":"hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 200, "status": "Success", "message": "Message sent successfully"})
    );
    assert_eq!(
        *h.automation.sent.lock().unwrap(),
        vec![(
            "6281234567@s.whatsapp.net".to_string(),
            "hello".to_string()
        )]
    );
}

#[tokio::test]
async fn test_send_validation_messages() {
    let h = harness();
    h.pair().await;
    let cases = [
        (r#"{"message":"hi"}"#, "\"phone_number\" is required"),
        (
            r#"{"phone_number":6281234567,"message":"hi"}"#,
            "\"phone_number\" must be a string",
        ),
        (r#"{"phone_number":"","message":"hi"}"#, "Phone number is required"),
        (r#"{"phone_number":null,"message":"hi"}"#, "\"phone_number\" is required"),
        (r#"{"phone_number":"62812"}"#, "\"message\" is required"),
        (r#"{"phone_number":"62812","message":""}"#, "Message is required"),
    ];
    for (body, expected) in cases {
        let resp = h
            .router()
            .oneshot(post_json("/admin/whatsapp/send-message", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = body_json(resp).await;
        assert_eq!(json["status"], "Bad Request", "{body}");
        assert_eq!(json["message"], expected, "{body}");
    }
    assert!(h.automation.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_failure_is_internal_error() {
    let h = harness_with(
        MockAutomation {
            fail_send: true,
            ..Default::default()
        },
        false,
    );
    h.pair().await;
    let resp = h
        .router()
        .oneshot(post_json(
            "/admin/whatsapp/send-message",
            r#"{"phone_number":"6281234567","message":"hi"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Internal Server Error");
    assert_eq!(json["message"], "connection reset");
}

// ---------------------------------------------------------------------------
// Admin: logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_whatsapp_logout_when_unpaired() {
    let h = harness();
    let resp = h
        .router()
        .oneshot(post_json("/admin/whatsapp/logout", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Failed");
    assert_eq!(json["message"], "WhatsApp is already logged out.");
    assert_eq!(*h.automation.destroyed.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_whatsapp_logout_tears_down_session() {
    let h = harness();
    h.pair().await;
    let resp = h
        .router()
        .oneshot(post_json("/admin/whatsapp/logout", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 200, "status": "Success", "message": "Successfully Logout"})
    );
    assert!(!h.state.tracker.is_paired().await);
    assert_eq!(*h.automation.destroyed.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_whatsapp_logout_ignores_teardown_failure_and_repairs() {
    let h = harness_with(
        MockAutomation {
            fail_destroy: true,
            ..Default::default()
        },
        true,
    );
    h.pair().await;
    let resp = h
        .router()
        .oneshot(post_json("/admin/whatsapp/logout", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!h.state.tracker.is_paired().await);

    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        h.automation.initialized.notified(),
    )
    .await
    .expect("automation should be re-initialized");
}

// ---------------------------------------------------------------------------
// Push events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ready_broadcasts_login_to_subscribers() {
    let h = harness();
    let mut rx = h.state.tracker.subscribe();
    h.pair().await;
    assert_eq!(rx.recv().await.unwrap(), PushEvent::login("6281234567"));
}

#[tokio::test]
async fn test_socket_requires_upgrade() {
    let h = harness();
    let resp = h.router().oneshot(get("/socket")).await.unwrap();
    assert!(resp.status().is_client_error());
}

/// Serve the router on an ephemeral port and open a browser-side socket.
async fn connect_socket(
    h: &Harness,
) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = h.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/socket"))
        .await
        .unwrap();
    ws
}

/// Next text frame, decoded as a push event.
async fn next_event<S>(ws: &mut S) -> PushEvent
where
    S: futures_util::Stream<
            Item = Result<
                tokio_tungstenite::tungstenite::Message,
                tokio_tungstenite::tungstenite::Error,
            >,
        > + Unpin,
{
    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    loop {
        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
            .await
            .expect("no frame within 5s")
            .expect("socket closed")
            .unwrap();
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_socket_sends_qr_snapshot_then_live_logout() {
    let h = harness();
    h.state
        .tracker
        .handle(AutomationEvent::Qr("pairing-challenge".into()))
        .await;

    let mut ws = connect_socket(&h).await;

    match next_event(&mut ws).await {
        PushEvent::Qr(url) => assert!(url.starts_with("data:image/png;base64,")),
        other => panic!("expected qr snapshot, got {other:?}"),
    }

    h.state.tracker.handle(AutomationEvent::Disconnected).await;
    assert_eq!(next_event(&mut ws).await, PushEvent::logout());
}

#[tokio::test]
async fn test_socket_sends_login_snapshot_when_paired() {
    let h = harness();
    h.pair().await;

    let mut ws = connect_socket(&h).await;
    assert_eq!(next_event(&mut ws).await, PushEvent::login("6281234567"));

    h.state.tracker.handle(AutomationEvent::Disconnected).await;
    assert_eq!(next_event(&mut ws).await, PushEvent::logout());
}

#[tokio::test]
async fn test_socket_streams_live_events_without_snapshot() {
    let h = harness();
    let mut ws = connect_socket(&h).await;

    // Unpaired: no snapshot. Wait until the connection has subscribed.
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while h.state.tracker.subscriber_count() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    h.pair().await;
    assert_eq!(next_event(&mut ws).await, PushEvent::login("6281234567"));
}
