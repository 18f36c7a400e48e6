//! # Web UI
//!
//! A single-page chat served by axum. The page itself is static; everything
//! else is JSON or a server-sent event stream:
//!
//! | Method | Path                   | Purpose                                  |
//! |--------|------------------------|------------------------------------------|
//! | GET    | `/`                    | chat page                                |
//! | GET    | `/api/examples`        | canned example questions                 |
//! | GET    | `/api/operations`      | the operation catalog                    |
//! | POST   | `/api/chat`            | ask a question, get the transcript       |
//! | POST   | `/api/chat/stream`     | ask a question, stream the answer (SSE)  |
//! | GET    | `/api/sessions/{id}`   | transcript of one session                |
//! | DELETE | `/api/sessions/{id}`   | clear a session back to the greeting     |
//!
//! The stream emits `session` (the session id), then one `delta` per chunk of
//! answer text, then `done` carrying the same body `/api/chat` returns.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{RwLock, mpsc};

use crate::core::agent::{Agent, AgentError};
use crate::core::session::{self, EXAMPLE_QUESTIONS, SessionStore};
use crate::inference::ContextSegment;

pub struct WebState {
    agent: Agent,
    sessions: RwLock<SessionStore>,
}

impl WebState {
    pub fn new(agent: Agent) -> Arc<Self> {
        Self::with_store(agent, SessionStore::default())
    }

    pub fn with_store(agent: Agent, store: SessionStore) -> Arc<Self> {
        Arc::new(Self {
            agent,
            sessions: RwLock::new(store),
        })
    }

    /// Records the question and returns the session it belongs to.
    /// The lock is released before the model is called.
    async fn record_question(&self, requested: Option<String>, question: &str) -> String {
        let session_id = requested
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(session::new_session_id);
        let mut sessions = self.sessions.write().await;
        sessions.get_or_create(&session_id).push_user(question);
        debug!("{} sessions in memory", sessions.len());
        session_id
    }

    async fn record_reply(
        &self,
        session_id: String,
        outcome: Result<String, AgentError>,
    ) -> ChatResponse {
        let reply = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Session {}: answering failed: {}", session_id, e);
                session::failure_message(&e)
            }
        };
        let mut sessions = self.sessions.write().await;
        let chat = sessions.get_or_create(&session_id);
        chat.push_assistant(reply.clone());
        ChatResponse {
            messages: chat.messages.clone(),
            session_id,
            reply,
        }
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub messages: Vec<ContextSegment>,
}

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/examples", get(examples_handler))
        .route("/api/operations", get(operations_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", post(chat_stream_handler))
        .route(
            "/api/sessions/{id}",
            get(session_handler).delete(clear_session_handler),
        )
        .with_state(state)
}

/// Start the web server and run until it fails.
pub async fn serve(agent: Agent, bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Web UI listening on {}", bind);
    println!("Math Agent web UI available at http://{}", bind);
    axum::serve(listener, router(WebState::new(agent))).await
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn index_handler() -> impl IntoResponse {
    Html(include_str!("page.html"))
}

async fn examples_handler() -> impl IntoResponse {
    Json(EXAMPLE_QUESTIONS)
}

async fn operations_handler(State(state): State<Arc<WebState>>) -> impl IntoResponse {
    Json(state.agent.registry().list_operations().to_vec())
}

fn question_of(request: &ChatRequest) -> Result<String, Response> {
    let question = request.message.trim();
    if question.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "message must not be empty"));
    }
    Ok(question.to_string())
}

async fn chat_handler(
    State(state): State<Arc<WebState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let question = match question_of(&request) {
        Ok(question) => question,
        Err(response) => return response,
    };
    let session_id = state.record_question(request.session_id, &question).await;
    let outcome = state.agent.answer(&question, |_| {}).await;
    Json(state.record_reply(session_id, outcome).await).into_response()
}

fn sse_event(name: &str, data: impl Serialize) -> Option<Event> {
    match Event::default().event(name).json_data(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Dropping unserializable {} event: {}", name, e);
            None
        }
    }
}

async fn chat_stream_handler(
    State(state): State<Arc<WebState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let question = match question_of(&request) {
        Ok(question) => question,
        Err(response) => return response,
    };
    let session_id = state.record_question(request.session_id, &question).await;

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    if let Some(event) = sse_event("session", json!({ "session_id": session_id })) {
        let _ = tx.send(event);
    }

    // The answer is recorded even if the client goes away mid-stream
    tokio::spawn(async move {
        let deltas = tx.clone();
        let outcome = state
            .agent
            .answer(&question, move |delta| {
                if let Some(event) = sse_event("delta", json!({ "text": delta })) {
                    let _ = deltas.send(event);
                }
            })
            .await;
        let response = state.record_reply(session_id, outcome).await;
        if let Some(event) = sse_event("done", &response) {
            let _ = tx.send(event);
        }
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

async fn session_handler(
    State(state): State<Arc<WebState>>,
    Path(id): Path<String>,
) -> Response {
    match state.sessions.read().await.get(&id) {
        Some(chat) => Json(chat.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("no session {id}")),
    }
}

async fn clear_session_handler(
    State(state): State<Arc<WebState>>,
    Path(id): Path<String>,
) -> Response {
    match state.sessions.write().await.get_mut(&id) {
        Some(chat) => {
            chat.clear();
            info!("Cleared session {}", id);
            Json(chat.clone()).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, format!("no session {id}")),
    }
}
