use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use deep_dive_rust_server::constants::TICK_MS;
use deep_dive_rust_server::dataset::{parse_dataset, DatasetError, DatasetFormat};
use deep_dive_rust_server::engine::{GameEngine, GameEngineOptions};
use deep_dive_rust_server::reward_store::RewardStore;
use deep_dive_rust_server::server_utils::{
    dataset_format_from_file_name, parse_reward_limit, sanitize_name,
};
use deep_dive_rust_server::session_protocol::{parse_client_message, ParsedClientMessage};
use deep_dive_rust_server::theme::{ThemeEvent, ThemeMode, ThemeNotifier};
use deep_dive_rust_server::types::{Action, Question, SessionSummary};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

// Shipped so a fresh checkout plays without any dataset configured.
const FALLBACK_DATASET: &str = "\
Which gas do divers need most from an air pocket?,Carbon dioxide;Oxygen;Helium,1
What does high turbidity tell you about water?,It is very clear;It is cloudy with particles;It is always safe,1
Which bacteria count closes a beach for swimming?,E. coli;Spirulina;Baker's yeast,0
Roughly how much of Earth's surface is ocean?,About one quarter;About half;About seventy percent,2
What should you check before swimming near a river mouth?,Recent rainfall;Moon phase;Boat names,0
Which of these warms a shallow bay fastest?,Sunlight;Tides;Plankton,0
";

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct SessionContext {
    tx: mpsc::Sender<OutboundMessage>,
    engine: GameEngine,
    player_name: String,
    reward_recorded: bool,
}

struct ServerState {
    sessions: HashMap<String, SessionContext>,
    reward_store: RewardStore,
    theme: ThemeNotifier,
    default_questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct RewardsQuery {
    limit: Option<String>,
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let rewards_path = std::env::var("REWARD_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/rewards.json"));

    let theme = ThemeNotifier::new();
    spawn_ambient_listener(theme.subscribe());

    let state = Arc::new(Mutex::new(ServerState {
        sessions: HashMap::new(),
        reward_store: RewardStore::new(rewards_path),
        theme,
        default_questions: load_startup_questions(),
    }));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/rewards", get(rewards_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found; serving API only.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn load_startup_questions() -> Vec<Question> {
    if let Ok(raw_path) = std::env::var("QUESTION_DATASET_PATH") {
        let path = PathBuf::from(raw_path);
        let format = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(dataset_format_from_file_name);
        match (std::fs::read_to_string(&path), format) {
            (Ok(content), Some(format)) => match parse_dataset(&content, format) {
                Ok(parsed) => {
                    println!(
                        "[server] loaded {} questions from {} ({} rejected)",
                        parsed.accepted,
                        path.display(),
                        parsed.rejected
                    );
                    return parsed.questions;
                }
                Err(error) => {
                    eprintln!("[server] dataset at {} rejected: {error}", path.display());
                }
            },
            (Ok(_), None) => {
                eprintln!(
                    "[server] unknown dataset extension: {}; falling back",
                    path.display()
                );
            }
            (Err(error), _) => {
                eprintln!("[server] failed to read {}: {error}", path.display());
            }
        }
    }

    parse_dataset(FALLBACK_DATASET, DatasetFormat::Delimited)
        .map(|parsed| parsed.questions)
        .unwrap_or_default()
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist/client"), PathBuf::from("static")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

fn spawn_ambient_listener(mut receiver: broadcast::Receiver<ThemeEvent>) {
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            let label = match event.mode {
                ThemeMode::Light => "light",
                ThemeMode::Dark => "dark",
            };
            println!("[theme] ambient background switched to {label}");
        }
    });
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn rewards_handler(
    State(state): State<SharedState>,
    Query(query): Query<RewardsQuery>,
) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(
        guard
            .reward_store
            .build_response(parse_reward_limit(query.limit.as_deref())),
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let session_id = make_id("session");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        let seed = rand::rng().random::<u32>();
        let engine = GameEngine::new(
            guard.default_questions.clone(),
            seed,
            GameEngineOptions::default(),
        );
        guard.sessions.insert(
            session_id.clone(),
            SessionContext {
                tx: tx.clone(),
                engine,
                player_name: "Diver".to_string(),
                reward_recorded: false,
            },
        );
        send_welcome(&mut guard, &session_id);
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(state.clone(), &session_id, raw.to_string()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(state.clone(), &session_id, text).await;
                } else {
                    send_error_to_session(&state, &session_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        guard.sessions.remove(&session_id);
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: SharedState, session_id: &str, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        send_error_to_session(&state, session_id, "invalid message").await;
        return;
    };

    match message {
        ParsedClientMessage::Hello { name } => {
            let mut guard = state.lock().await;
            if let Some(session) = guard.sessions.get_mut(session_id) {
                session.player_name = sanitize_name(&name);
            }
            send_welcome(&mut guard, session_id);
        }
        ParsedClientMessage::Ping { t } => {
            let mut guard = state.lock().await;
            send_to_session(
                &mut guard,
                session_id,
                &json!({ "type": "pong", "t": t }),
                QueuePolicy::DisconnectOnFull,
            );
        }
        ParsedClientMessage::Start => {
            apply_session_reset(state, session_id, Action::Start).await;
        }
        ParsedClientMessage::Restart => {
            apply_session_reset(state, session_id, Action::Restart).await;
        }
        ParsedClientMessage::Move { dir, pressed } => {
            let action = if pressed {
                Action::MoveStart(dir)
            } else {
                Action::MoveStop(dir)
            };
            apply_action(state, session_id, action).await;
        }
        ParsedClientMessage::PauseToggle => {
            apply_action(state, session_id, Action::TogglePause).await;
        }
        ParsedClientMessage::EnterPocket => {
            apply_action(state, session_id, Action::EnterPocket).await;
        }
        ParsedClientMessage::SelectOption { index } => {
            apply_action(state, session_id, Action::SelectOption(index)).await;
        }
        ParsedClientMessage::SubmitAnswer => {
            apply_action(state, session_id, Action::SubmitAnswer).await;
        }
        ParsedClientMessage::CancelQuestion => {
            apply_action(state, session_id, Action::CancelQuestion).await;
        }
        ParsedClientMessage::Theme { mode } => {
            let mut guard = state.lock().await;
            guard.theme.set_mode(mode);
        }
        ParsedClientMessage::LoadDataset { file_name, content } => {
            load_dataset_for_session(state, session_id, file_name, content).await;
        }
    }
}

async fn apply_action(state: SharedState, session_id: &str, action: Action) {
    let mut guard = state.lock().await;
    if let Some(session) = guard.sessions.get_mut(session_id) {
        session.engine.apply(action);
    }
}

// Start and restart regenerate the world, so the client also gets fresh
// static geometry.
async fn apply_session_reset(state: SharedState, session_id: &str, action: Action) {
    let mut guard = state.lock().await;
    let world_init = {
        let Some(session) = guard.sessions.get_mut(session_id) else {
            return;
        };
        session.engine.apply(action);
        session.reward_recorded = false;
        session.engine.build_world_init()
    };
    send_to_session(
        &mut guard,
        session_id,
        &json!({ "type": "world_init", "world": world_init }),
        QueuePolicy::DisconnectOnFull,
    );
}

// Parsing happens in its own task so a large upload never stalls the tick
// loop; the finished result is installed under the lock in one call.
async fn load_dataset_for_session(
    state: SharedState,
    session_id: &str,
    file_name: String,
    content: String,
) {
    let Some(format) = dataset_format_from_file_name(&file_name) else {
        send_error_to_session(&state, session_id, "unsupported dataset extension").await;
        return;
    };

    let session_id = session_id.to_string();
    tokio::spawn(async move {
        let result = parse_dataset(&content, format);
        let mut guard = state.lock().await;
        match result {
            Ok(parsed) => {
                let installed = if let Some(session) = guard.sessions.get_mut(&session_id) {
                    session.engine.install_questions(parsed.questions.clone());
                    true
                } else {
                    false
                };
                if installed {
                    send_to_session(
                        &mut guard,
                        &session_id,
                        &json!({
                            "type": "dataset_loaded",
                            "accepted": parsed.accepted,
                            "rejected": parsed.rejected,
                        }),
                        QueuePolicy::DisconnectOnFull,
                    );
                }
            }
            Err(error) => {
                let kind = match error {
                    DatasetError::InvalidShape => "invalid_shape",
                    DatasetError::NoValidRows { .. } => "no_valid_rows",
                };
                send_to_session(
                    &mut guard,
                    &session_id,
                    &json!({
                        "type": "dataset_error",
                        "kind": kind,
                        "message": error.to_string(),
                    }),
                    QueuePolicy::DisconnectOnFull,
                );
            }
        }
    });
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_sessions(&mut guard);
        }
    });
}

fn tick_sessions(state: &mut ServerState) {
    let mut won: Vec<(String, SessionSummary)> = Vec::new();

    for session in state.sessions.values_mut() {
        session.engine.step(TICK_MS);
        let snapshot = session.engine.build_snapshot(true);
        let payload = json!({ "type": "snapshot", "snapshot": snapshot }).to_string();
        let _ = session.tx.try_send(OutboundMessage::Text(payload));

        if session.engine.is_terminal() && !session.reward_recorded {
            session.reward_recorded = true;
            let summary = session.engine.build_summary();
            let payload = json!({ "type": "session_over", "summary": summary }).to_string();
            let _ = session.tx.try_send(OutboundMessage::Text(payload));
            if summary.won {
                won.push((session.player_name.clone(), summary));
            }
        }
    }

    for (name, summary) in won {
        state.reward_store.record_win(&name, &summary);
    }
}

fn send_welcome(state: &mut ServerState, session_id: &str) {
    let message = {
        let Some(session) = state.sessions.get(session_id) else {
            return;
        };
        json!({
            "type": "welcome",
            "sessionId": session_id,
            "name": session.player_name,
            "world": session.engine.build_world_init(),
        })
    };
    send_to_session(state, session_id, &message, QueuePolicy::DisconnectOnFull);
}

fn send_to_session(
    state: &mut ServerState,
    session_id: &str,
    message: &Value,
    policy: QueuePolicy,
) {
    let send_failed = state
        .sessions
        .get(session_id)
        .map(|session| {
            session
                .tx
                .try_send(OutboundMessage::Text(message.to_string()))
                .is_err()
        })
        .unwrap_or(false);
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        drop_session(state, session_id);
    }
}

async fn send_error_to_session(state: &SharedState, session_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_session(
        &mut guard,
        session_id,
        &json!({ "type": "error", "message": message }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn drop_session(state: &mut ServerState, session_id: &str) {
    if let Some(session) = state.sessions.remove(session_id) {
        let _ = session.tx.try_send(OutboundMessage::Close {
            code: 1013,
            reason: "outbound queue overflow".to_string(),
        });
    }
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
