//! HTTP surface tests driven through the router with a scripted reply service.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

use fellowship_chat::AppState;
use fellowship_chat::chat::{EMPTY_REPLY_TEXT, UNREACHABLE_TEXT};
use fellowship_chat::config::{
    AppConfig, DEFAULT_REPLY_ENDPOINT, LogConfig, ReplyConfig, ServerConfig, UiConfig,
};
use fellowship_chat::error::ReplyError;
use fellowship_chat::reply::{Reply, ReplyService};
use fellowship_chat::server::router;
use fellowship_chat::telemetry::LogFormat;
use fellowship_chat::ui::Layout;

/// Echoes the input, except for a couple of magic words.
#[derive(Debug)]
struct EchoReplies;

#[async_trait::async_trait]
impl ReplyService for EchoReplies {
    async fn ask(&self, input: &str) -> Result<Reply, ReplyError> {
        match input {
            "silence" => Ok(Reply::Empty),
            "garbage" => Err(ReplyError::MalformedBody("not json".to_string())),
            other => Ok(Reply::Text(format!("echo: {other}"))),
        }
    }
}

fn test_config(layout: Layout) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        reply: ReplyConfig {
            endpoint: Url::parse(DEFAULT_REPLY_ENDPOINT).unwrap(),
        },
        ui: UiConfig {
            layout,
            title: "AI Fellowship Chat".to_string(),
        },
        log: LogConfig {
            format: LogFormat::Pretty,
        },
    }
}

fn setup(layout: Layout) -> (Router, AppState) {
    let state = AppState::new(Arc::new(test_config(layout)), Arc::new(EchoReplies)).unwrap();
    (router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post_form(app: &Router, uri: &str, form: &str) -> axum::response::Response {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn get_page(app: &Router, uri: &str) -> String {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    String::from_utf8(body).unwrap()
}

#[tokio::test]
async fn test_starts_with_one_empty_active_session() {
    let (app, _) = setup(Layout::Sidebar);

    let (status, sessions) = get_json(&app, "/api/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["name"], "Chat 1");
    assert_eq!(sessions[0]["active"], true);
    assert_eq!(sessions[0]["message_count"], 0);

    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(messages, json!([]));
}

#[tokio::test]
async fn test_healthz() {
    let (app, _) = setup(Layout::Sidebar);
    let req = Request::get("/healthz").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_chat_delivers_and_records_both_messages() {
    let (app, _) = setup(Layout::Sidebar);

    let (status, outcome) = post_json(&app, "/api/chat", json!({ "input": "  hi there " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "delivered");
    assert_eq!(outcome["status"], "answered");
    assert_eq!(outcome["user"], json!({ "role": "user", "text": "hi there" }));
    assert_eq!(outcome["reply"], json!({ "role": "bot", "text": "echo: hi there" }));

    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(
        messages,
        json!([
            { "role": "user", "text": "hi there" },
            { "role": "bot", "text": "echo: hi there" },
        ])
    );
}

#[tokio::test]
async fn test_blank_chat_is_ignored() {
    let (app, _) = setup(Layout::Sidebar);

    let (status, outcome) = post_json(&app, "/api/chat", json!({ "input": "   " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome, json!({ "outcome": "ignored" }));
    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(messages, json!([]));
}

#[tokio::test]
async fn test_fallback_texts_are_recorded() {
    let (app, _) = setup(Layout::Sidebar);

    let (_, empty) = post_json(&app, "/api/chat", json!({ "input": "silence" })).await;
    assert_eq!(empty["status"], "empty_reply");
    assert_eq!(empty["reply"]["text"], EMPTY_REPLY_TEXT);

    let (_, failed) = post_json(&app, "/api/chat", json!({ "input": "garbage" })).await;
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["reply"]["text"], UNREACHABLE_TEXT);

    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(messages.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (app, state) = setup(Layout::Sidebar);
    let first = state.sessions().active_id().unwrap();
    post_json(&app, "/api/chat", json!({ "input": "in first" })).await;

    let (status, created) = post_json(&app, "/api/sessions", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Chat 2");
    assert_eq!(created["active"], true);
    assert_eq!(created["message_count"], 0);

    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(messages, json!([]));

    let req = Request::post(format!("/api/sessions/{first}/activate"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, messages) = get_json(&app, "/api/messages").await;
    assert_eq!(messages[0]["text"], "in first");

    let (_, sessions) = get_json(&app, "/api/sessions").await;
    assert_eq!(sessions[0]["active"], true);
    assert_eq!(sessions[1]["active"], false);
}

#[tokio::test]
async fn test_chat_to_explicit_session_leaves_active_alone() {
    let (app, state) = setup(Layout::Sidebar);
    let first = state.sessions().active_id().unwrap();
    let second = state.sessions().create_session();

    let (_, outcome) = post_json(
        &app,
        "/api/chat",
        json!({ "input": "late", "session_id": first.as_str() }),
    )
    .await;
    assert_eq!(outcome["session_id"], first.as_str());

    let (_, first_messages) = get_json(&app, &format!("/api/sessions/{first}/messages")).await;
    assert_eq!(first_messages.as_array().unwrap().len(), 2);
    assert_eq!(state.sessions().active_id(), Some(second));
    let (_, active) = get_json(&app, "/api/messages").await;
    assert_eq!(active, json!([]));
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let (app, state) = setup(Layout::Sidebar);

    let (status, body) = get_json(&app, "/api/sessions/ghost/messages").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session not found: ghost");

    let req = Request::post("/api/sessions/ghost/activate")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &app,
        "/api/chat",
        json!({ "input": "hello?", "session_id": "ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.sessions().active_messages().is_empty());
}

#[tokio::test]
async fn test_form_send_redirects_back_to_layout() {
    let (app, state) = setup(Layout::Sidebar);
    let id = state.sessions().active_id().unwrap();

    let resp = post_form(
        &app,
        "/chat/send",
        &format!("input=hello+form&session_id={id}&layout=single"),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/?layout=single");
    let texts: Vec<String> = state
        .sessions()
        .messages(&id)
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["hello form", "echo: hello form"]);
}

#[tokio::test]
async fn test_blank_form_send_redirects_without_recording() {
    let (app, state) = setup(Layout::Sidebar);
    let id = state.sessions().active_id().unwrap();

    let resp = post_form(
        &app,
        "/chat/send",
        &format!("input=+++&session_id={id}&layout=sidebar"),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/?layout=sidebar");
    assert!(state.sessions().messages(&id).unwrap().is_empty());
    assert_eq!(state.sessions().len(), 1);
}

#[tokio::test]
async fn test_sessions_report_start_time() {
    let (app, _) = setup(Layout::Sidebar);
    post_json(&app, "/api/sessions", json!({})).await;

    let (_, sessions) = get_json(&app, "/api/sessions").await;
    let first = sessions[0]["created_at"].as_str().unwrap();
    let second = sessions[1]["created_at"].as_str().unwrap();
    let first: chrono::DateTime<chrono::Utc> = first.parse().unwrap();
    let second: chrono::DateTime<chrono::Utc> = second.parse().unwrap();
    assert!(first <= second);
}

#[tokio::test]
async fn test_form_new_and_open_switch_sessions() {
    let (app, state) = setup(Layout::Sidebar);
    let first = state.sessions().active_id().unwrap();

    let resp = post_form(&app, "/chat/new", "").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
    assert_eq!(state.sessions().len(), 2);
    assert_ne!(state.sessions().active_id(), Some(first.clone()));

    let resp = post_form(&app, &format!("/chat/{first}/open"), "layout=sidebar").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/?layout=sidebar");
    assert_eq!(state.sessions().active_id(), Some(first));

    let resp = post_form(&app, "/chat/ghost/open", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_renders_configured_and_requested_layouts() {
    let (app, _) = setup(Layout::Sidebar);
    post_json(&app, "/api/chat", json!({ "input": "<b>bold</b>" })).await;

    let sidebar = get_page(&app, "/").await;
    assert!(sidebar.contains("My Chats"));
    assert!(sidebar.contains("Chat 1"));
    assert!(sidebar.contains("&lt;b&gt;bold"));
    assert!(!sidebar.contains("<b>bold</b>"));

    let single = get_page(&app, "/?layout=single").await;
    assert!(single.contains("Welcome to AI Fellowship Chat"));
    assert!(!single.contains("My Chats"));
}

#[tokio::test]
async fn test_empty_page_shows_placeholder() {
    let (app, _) = setup(Layout::Single);

    let page = get_page(&app, "/").await;

    assert!(page.contains("Start the conversation below..."));
    assert!(page.contains("+ New Chat"));
}
