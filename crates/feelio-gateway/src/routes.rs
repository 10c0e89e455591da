//! HTTP routes for the browser frontend.

use crate::state::{AppState, SessionHandle};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use feelio_core::{decode_frame, EmotionLabel, PaceHint};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
pub struct VisionRequest {
    /// Base64 frame, optionally a `data:image/...;base64,` URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Label already classified in the browser.
    #[serde(default)]
    pub emotion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisionResponse {
    pub emotion: EmotionLabel,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub detected_emotion: EmotionLabel,
    pub pace_hint: PaceHint,
    pub pre_pause_seconds: f32,
    pub crisis: bool,
    /// The user asked to leave. The session is finalized and removed.
    pub ended: bool,
    /// Closing summary, present when `ended` and something was said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionEnded {
    pub turns: usize,
    pub summary: Option<String>,
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id/vision", post(session_vision))
        .route("/api/v1/sessions/:id/chat", post(session_chat))
        .route("/api/v1/sessions/:id/end", post(end_session))
        .route("/vision", post(default_vision))
        .route("/chat", post(default_chat))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(cors)
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        target: "feelio::gateway",
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    Json(SessionCreated {
        session_id: state.create_session(),
    })
}

fn lookup(state: &AppState, id: &Uuid) -> Result<SessionHandle, (StatusCode, String)> {
    state
        .session(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {}", id)))
}

async fn session_vision(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VisionRequest>,
) -> ApiResult<VisionResponse> {
    let handle = lookup(&state, &id)?;
    apply_vision(&state, &handle, req).await
}

async fn default_vision(State(state): State<AppState>, Json(req): Json<VisionRequest>) -> ApiResult<VisionResponse> {
    let handle = state.default_session();
    apply_vision(&state, &handle, req).await
}

/// Update the session's latest label. An undecodable frame keeps the previous label.
async fn apply_vision(state: &AppState, handle: &SessionHandle, req: VisionRequest) -> ApiResult<VisionResponse> {
    let observed = match (req.emotion, req.image) {
        (Some(label), _) => Some(EmotionLabel::from_label(&label)),
        (None, Some(image)) => match decode_frame(&image) {
            Ok(frame) => Some(state.classifier().classify(&frame)),
            Err(e) => {
                warn!(target: "feelio::gateway", error = %e, "frame rejected, keeping previous emotion");
                None
            }
        },
        (None, None) => {
            return Err((StatusCode::BAD_REQUEST, "expected `image` or `emotion`".to_string()));
        }
    };

    let mut session = handle.lock().await;
    session.touch();
    if let Some(label) = observed {
        session.emotion = label;
    }
    Ok(Json(VisionResponse {
        emotion: session.emotion,
    }))
}

async fn session_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let handle = lookup(&state, &id)?;
    run_chat(&state, id, &handle, req).await
}

async fn default_chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> ApiResult<ChatResponse> {
    let handle = state.default_session();
    run_chat(&state, state.default_session_id(), &handle, req).await
}

/// One turn. An exit finalizes the session and drops it from the map.
async fn run_chat(state: &AppState, id: Uuid, handle: &SessionHandle, req: ChatRequest) -> ApiResult<ChatResponse> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is empty".to_string()));
    }

    let mut session = handle.lock().await;
    session.touch();
    let emotion = session.emotion;
    let outcome = session.orchestrator.process_turn(message, emotion).await;
    if outcome.is_already_ended() {
        return Err((StatusCode::CONFLICT, format!("session {} has ended", id)));
    }
    let pacing = outcome.pacing();

    let summary = if outcome.is_exit() {
        let closed = session.orchestrator.finalize().await;
        state.remove_session(&id);
        info!(target: "feelio::gateway", session = %id, turns = closed.turns, "session ended by user");
        closed.summary
    } else {
        None
    };

    Ok(Json(ChatResponse {
        reply: outcome.text().to_string(),
        detected_emotion: emotion,
        pace_hint: pacing.pace_hint,
        pre_pause_seconds: pacing.pre_pause_seconds,
        crisis: outcome.is_crisis(),
        ended: outcome.is_exit(),
        summary,
    }))
}

async fn end_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<SessionEnded> {
    let handle = state
        .remove_session(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {}", id)))?;
    let summary = handle.lock().await.orchestrator.finalize().await;
    info!(target: "feelio::gateway", session = %id, turns = summary.turns, "session ended");
    Ok(Json(SessionEnded {
        turns: summary.turns,
        summary: summary.summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use feelio_core::{safety, DialogueSettings, EmotionClassifier, MockGenerator, FAREWELL};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FearfulClassifier;

    impl EmotionClassifier for FearfulClassifier {
        fn classify(&self, _frame: &[u8]) -> EmotionLabel {
            EmotionLabel::Fear
        }
    }

    fn state() -> AppState {
        AppState::with_classifier(
            Arc::new(MockGenerator),
            Arc::new(FearfulClassifier),
            DialogueSettings::default(),
        )
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn new_session(app: &Router) -> Uuid {
        let (status, bytes) = call(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice::<SessionCreated>(&bytes).unwrap().session_id
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(state());
        let (status, bytes) = call(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"OK");
    }

    #[tokio::test]
    async fn vision_then_chat_uses_the_session_emotion() {
        let app = build_app(state());
        let id = new_session(&app).await;

        let frame = base64::engine::general_purpose::STANDARD.encode(b"frame");
        let (status, bytes) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/vision", id),
            Some(serde_json::json!({ "image": format!("data:image/jpeg;base64,{}", frame) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let vision: VisionResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(vision.emotion, EmotionLabel::Fear);

        let (status, bytes) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/chat", id),
            Some(serde_json::json!({ "message": "I'm fine really" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(chat.detected_emotion, EmotionLabel::Fear);
        assert!(chat.reply.contains("5-4-3-2-1 grounding"));
        assert_eq!(chat.pace_hint, PaceHint::Normal);
        assert!(!chat.crisis);
        assert!(!chat.ended);
    }

    #[tokio::test]
    async fn bad_frame_keeps_previous_label() {
        let app = build_app(state());
        let id = new_session(&app).await;
        let uri = format!("/api/v1/sessions/{}/vision", id);

        call(&app, "POST", &uri, Some(serde_json::json!({ "emotion": "sad" }))).await;
        let (status, bytes) = call(&app, "POST", &uri, Some(serde_json::json!({ "image": "%%%" }))).await;
        assert_eq!(status, StatusCode::OK);
        let vision: VisionResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(vision.emotion, EmotionLabel::Sad);

        let (status, _) = call(&app, "POST", &uri, Some(serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sessions_do_not_share_emotion() {
        let app = build_app(state());
        let a = new_session(&app).await;
        let b = new_session(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/vision", a),
            Some(serde_json::json!({ "emotion": "angry" })),
        )
        .await;

        let (_, bytes) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/chat", b),
            Some(serde_json::json!({ "message": "hello" })),
        )
        .await;
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(chat.detected_emotion, EmotionLabel::Neutral);
    }

    #[tokio::test]
    async fn crisis_then_goodbye_closes_the_session() {
        let app = build_app(state());
        let id = new_session(&app).await;
        let chat_uri = format!("/api/v1/sessions/{}/chat", id);

        let (_, bytes) = call(&app, "POST", &chat_uri, Some(serde_json::json!({ "message": "I want to end my life" }))).await;
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(chat.crisis);
        assert_eq!(chat.reply, safety::crisis_response());
        assert_eq!(chat.pre_pause_seconds, 0.5);
        assert_eq!(chat.pace_hint, PaceHint::Slower);

        let (_, bytes) = call(&app, "POST", &chat_uri, Some(serde_json::json!({ "message": "ok, goodbye" }))).await;
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(chat.ended);
        assert_eq!(chat.reply, FAREWELL);
        assert!(chat.summary.is_some());

        let (status, _) = call(&app, "POST", &chat_uri, Some(serde_json::json!({ "message": "hello again" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "POST", &format!("/api/v1/sessions/{}/end", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn end_returns_the_summary() {
        let st = state();
        let app = build_app(st.clone());
        let id = new_session(&app).await;
        call(&app, "POST", &format!("/api/v1/sessions/{}/chat", id), Some(serde_json::json!({ "message": "long week" }))).await;

        let (status, bytes) = call(&app, "POST", &format!("/api/v1/sessions/{}/end", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let ended: SessionEnded = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ended.turns, 1);
        assert!(ended.summary.is_some());
        assert_eq!(st.session_count(), 0);
    }

    #[tokio::test]
    async fn ended_dialogue_still_in_the_map_is_a_conflict() {
        let st = state();
        let app = build_app(st.clone());
        let id = st.create_session();
        st.session(&id).unwrap().lock().await.orchestrator.finalize().await;

        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/chat", id),
            Some(serde_json::json!({ "message": "hello?" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn default_session_restarts_after_goodbye() {
        let st = state();
        let app = build_app(st.clone());
        call(&app, "POST", "/vision", Some(serde_json::json!({ "emotion": "sad" }))).await;
        let (_, bytes) = call(&app, "POST", "/chat", Some(serde_json::json!({ "message": "bye for now" }))).await;
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(chat.ended);
        assert_eq!(st.session_count(), 0);

        let (status, bytes) = call(&app, "POST", "/chat", Some(serde_json::json!({ "message": "I'm back" }))).await;
        assert_eq!(status, StatusCode::OK);
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!chat.ended);
        assert_eq!(chat.detected_emotion, EmotionLabel::Neutral);
        assert_eq!(st.session_count(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_404_and_empty_message_is_400() {
        let app = build_app(state());
        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/chat", Uuid::new_v4()),
            Some(serde_json::json!({ "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "POST", "/chat", Some(serde_json::json!({ "message": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compatibility_routes_share_the_default_session() {
        let st = state();
        let app = build_app(st.clone());
        call(&app, "POST", "/vision", Some(serde_json::json!({ "emotion": "surprise" }))).await;
        let (status, bytes) = call(&app, "POST", "/chat", Some(serde_json::json!({ "message": "wow, what a day" }))).await;
        assert_eq!(status, StatusCode::OK);
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(chat.detected_emotion, EmotionLabel::Surprise);
        assert!(chat.reply.contains("box breathing"));
        assert_eq!(st.session_count(), 1);
    }
}
