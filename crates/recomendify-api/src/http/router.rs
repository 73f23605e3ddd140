//! Axum router configuration with middleware.
//!
//! Routes mirror the hosted backend the chat client was written against:
//! `/rest/v1/*` for table access, `/realtime/v1/*` for change streams and
//! `/functions/v1/*` for the bot function. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use recomendify_core::bot::CompletionBackend;
use recomendify_types::routes::{
    BOT_FUNCTION_PATH, MESSAGES_PATH, PROFILES_PATH, REALTIME_MESSAGES_PATH,
};

use crate::http::handlers;
use crate::state::ServerState;

/// Build the complete router with all routes and middleware.
pub fn build_router<C: CompletionBackend + 'static>(state: ServerState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Messages
        .route(
            MESSAGES_PATH,
            get(handlers::messages::list_conversation::<C>)
                .post(handlers::messages::insert_message::<C>),
        )
        .route(
            &format!("{MESSAGES_PATH}/{{id}}/read"),
            post(handlers::messages::mark_read::<C>),
        )
        // Profiles
        .route(
            PROFILES_PATH,
            get(handlers::profiles::list_profiles::<C>)
                .post(handlers::profiles::upsert_profile::<C>),
        )
        .route(
            &format!("{PROFILES_PATH}/{{id}}"),
            get(handlers::profiles::get_profile::<C>),
        )
        // Realtime
        .route(
            REALTIME_MESSAGES_PATH,
            get(handlers::realtime::subscribe::<C>),
        )
        // Bot function
        .route(BOT_FUNCTION_PATH, post(handlers::bot::generate::<C>))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use recomendify_core::bot::BotFunction;
    use recomendify_core::chat::{ConversationSnapshot, ConversationSync, SendOutcome, SyncOptions};
    use recomendify_core::realtime::ChangeFeed;
    use recomendify_infra::http::{HttpBotResponder, RemoteStore};
    use recomendify_infra::sqlite::{DatabasePool, SqliteLocalStorage};
    use recomendify_types::error::BotError;
    use recomendify_types::message::PrivateMessage;
    use recomendify_types::peer::{ConversationPeer, Profile};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    /// Answers every prompt by quoting it; the prompt "fail" errors.
    struct EchoBackend;

    impl CompletionBackend for EchoBackend {
        fn model(&self) -> &str {
            "echo-1"
        }

        async fn complete(&self, _system: &str, prompt: &str) -> Result<Option<String>, BotError> {
            if prompt == "fail" {
                return Err(BotError::Backend("model unavailable".into()));
            }
            Ok(Some(format!("Você perguntou: {prompt}")))
        }
    }

    async fn test_state(with_bot: bool) -> (ServerState<EchoBackend>, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = DatabasePool::open_in(dir.path(), "server.db").await.unwrap();
        let bot = with_bot.then(|| BotFunction::new(EchoBackend));
        (ServerState::new(pool, ChangeFeed::new(64), bot), dir)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let (status, body) = send(&router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn insert_then_fetch_conversation() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);

        let (status, row) = send(
            &router,
            post_json(
                MESSAGES_PATH,
                json!({"sender_id": "ana", "receiver_id": "bia", "content": "Viu Duna?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(row["read"], false);

        let (status, rows) = send(
            &router,
            get(&format!("{MESSAGES_PATH}?user_id=bia&peer_id=ana")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<PrivateMessage> = serde_json::from_value(rows).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "Viu Duna?");
        assert_eq!(rows[0].id, row["id"]);
    }

    #[tokio::test]
    async fn conversation_requires_both_ids() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let (status, body) = send(&router, get(&format!("{MESSAGES_PATH}?user_id=ana"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let (status, _) = send(
            &router,
            post_json(
                MESSAGES_PATH,
                json!({"sender_id": "ana", "receiver_id": "bia", "content": "   "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mark_read_unknown_is_not_found() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let (status, body) = send(&router, post_json(&format!("{MESSAGES_PATH}/nope/read"), json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn profile_upsert_get_and_find() {
        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let profile = Profile::for_new_user("u-ana", "ana@example.com");

        let (status, _) = send(&router, post_json(PROFILES_PATH, serde_json::to_value(&profile).unwrap())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, get(&format!("{PROFILES_PATH}/u-ana"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "ana");

        let (_, found) = send(&router, get(&format!("{PROFILES_PATH}?email=ana@example.com"))).await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, _) = send(&router, get(&format!("{PROFILES_PATH}/ghost"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bot_function_answers_with_generated_text() {
        let (state, _dir) = test_state(true).await;
        let router = build_router(state);
        let (status, body) = send(&router, post_json(BOT_FUNCTION_PATH, json!({"prompt": "Um livro?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generatedText"], "Você perguntou: Um livro?");
    }

    #[tokio::test]
    async fn bot_function_rejects_malformed_body() {
        let (state, _dir) = test_state(true).await;
        let router = build_router(state);
        let (status, body) = send(&router, post_json(BOT_FUNCTION_PATH, json!({"text": "oi"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bot_function_failures_are_500_with_error() {
        let (state, _dir) = test_state(true).await;
        let router = build_router(state);
        let (status, body) = send(&router, post_json(BOT_FUNCTION_PATH, json!({"prompt": "fail"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("model unavailable"));

        let (state, _dir) = test_state(false).await;
        let router = build_router(state);
        let (status, body) = send(&router, post_json(BOT_FUNCTION_PATH, json!({"prompt": "oi"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "bot backend is not configured");
    }

    // --- End to end: real server, HTTP clients, sync engine ---

    async fn serve(state: ServerState<EchoBackend>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    type RemoteEngine = ConversationSync<RemoteStore, HttpBotResponder, SqliteLocalStorage>;

    async fn engine(base: &str, user_id: &str, dir: &TempDir) -> RemoteEngine {
        let client = reqwest::Client::new();
        let pool = DatabasePool::open_in(dir.path(), &format!("{user_id}-client.db"))
            .await
            .unwrap();
        ConversationSync::new(
            RemoteStore::new(client.clone(), base),
            HttpBotResponder::new(client, base),
            SqliteLocalStorage::new(pool),
            user_id,
            SyncOptions::default(),
        )
    }

    async fn wait_for(
        engine: &RemoteEngine,
        ready: impl Fn(&ConversationSnapshot) -> bool,
    ) -> ConversationSnapshot {
        let mut updates = engine.updates();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = engine.snapshot();
                if ready(&snapshot) {
                    return snapshot;
                }
                updates.changed().await.unwrap();
            }
        })
        .await
        .expect("condition not reached in time")
    }

    #[tokio::test]
    async fn messages_flow_between_two_clients() {
        let (state, dir) = test_state(true).await;
        let feed = state.messages.feed().clone();
        let base = serve(state).await;

        let ana = engine(&base, "ana", &dir).await;
        let bia = engine(&base, "bia", &dir).await;
        ana.initialize(ConversationPeer::human("bia", None)).await.unwrap();
        bia.initialize(ConversationPeer::human("ana", None)).await.unwrap();
        assert_eq!(feed.active_channels(), vec!["msg:ana-bia".to_string()]);

        let outcome = ana.send_text("Recomenda um filme?").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Delivered(_)));

        let seen_by_bia = wait_for(&bia, |s| s.messages.len() == 1).await;
        assert_eq!(seen_by_bia.messages[0].content, "Recomenda um filme?");
        assert_eq!(seen_by_bia.messages[0].sender_id, "ana");

        let echoed = wait_for(&ana, |s| s.messages.len() == 1).await;
        assert_eq!(echoed.messages[0].id, seen_by_bia.messages[0].id);

        // A late joiner loads the same row from history.
        let late = engine(&base, "bia", &dir).await;
        late.initialize(ConversationPeer::human("ana", None)).await.unwrap();
        assert_eq!(late.snapshot().messages.len(), 1);

        ana.close();
        assert!(ana.active_channel().is_none());
        assert!(bia.active_channel().is_some());
    }

    #[tokio::test]
    async fn bot_conversation_goes_through_the_function() {
        let (state, dir) = test_state(true).await;
        let base = serve(state).await;

        let ana = engine(&base, "ana", &dir).await;
        ana.initialize(ConversationPeer::assistant()).await.unwrap();
        let outcome = ana.send_text("Um livro de ficção?").await.unwrap();
        let SendOutcome::Answered { reply, .. } = outcome else {
            panic!("expected a bot answer, got {outcome:?}");
        };
        assert_eq!(reply.content, "Você perguntou: Um livro de ficção?");
        assert!(reply.is_bot);

        let snapshot = ana.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[0].content, "Um livro de ficção?");
    }
}
