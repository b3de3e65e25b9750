pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::spell::handlers::handle_cast_spell;
use crate::state::AppState;
use crate::subscription::handlers::handle_subscribe;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/cast-spell", post(handle_cast_spell))
        .route("/subscribe", post(handle_subscribe))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::models::spell::SpellRecord;
    use crate::spell::caster::tests::MockCompletion;
    use crate::spell::caster::FALLBACK_SPELL;
    use crate::spell::persistence::{hash_ip, PersistenceError, SpellSink};
    use crate::subscription::handlers::{ALREADY_SUBSCRIBED_MESSAGE, SUBSCRIBED_MESSAGE};
    use crate::subscription::store::SubscriberStore;

    /// Forwards every record to the test over a channel.
    struct ChannelSink(mpsc::UnboundedSender<SpellRecord>);

    #[async_trait]
    impl SpellSink for ChannelSink {
        async fn record(&self, record: SpellRecord) -> Result<(), PersistenceError> {
            let _ = self.0.send(record);
            Ok(())
        }
    }

    /// Reports each attempt, then fails like an unreachable database.
    struct FailingSink(mpsc::UnboundedSender<SpellRecord>);

    #[async_trait]
    impl SpellSink for FailingSink {
        async fn record(&self, record: SpellRecord) -> Result<(), PersistenceError> {
            let _ = self.0.send(record);
            Err(PersistenceError::Database(sqlx::Error::PoolClosed))
        }
    }

    struct Harness {
        router: Router,
        records: mpsc::UnboundedReceiver<SpellRecord>,
        subscribers: Arc<SubscriberStore>,
        _dir: tempfile::TempDir,
    }

    fn harness(llm: MockCompletion) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let subscribers = Arc::new(SubscriberStore::new(dir.path().join("subscribers.json")));
        let (tx, rx) = mpsc::unbounded_channel();

        let state = AppState {
            llm: Arc::new(llm),
            spell_sink: Arc::new(ChannelSink(tx)),
            subscribers: subscribers.clone(),
            config: Config::for_tests(),
        };

        Harness {
            router: build_router(state),
            records: rx,
            subscribers,
            _dir: dir,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_key_and_model() {
        let h = harness(MockCompletion::replying(None));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "ok": true, "hasApiKey": true, "model": "gpt-4o-mini" })
        );
    }

    #[tokio::test]
    async fn test_cast_spell_returns_spell_and_records_it() {
        let mut h = harness(MockCompletion::replying(Some("Light a candle and breathe.")));
        let request = Request::builder()
            .method("POST")
            .uri("/cast-spell")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "spell-tests/1.0")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::from(
                json!({ "intent": "find clarity", "length": "short" }).to_string(),
            ))
            .unwrap();

        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "spell": "Light a candle and breathe." }));

        let record = tokio::time::timeout(Duration::from_secs(1), h.records.recv())
            .await
            .expect("persistence sink was not called")
            .unwrap();
        assert_eq!(record.intent, "find clarity");
        assert_eq!(record.length, "short");
        assert_eq!(record.spell_text, "Light a candle and breathe.");
        assert_eq!(record.user_agent.as_deref(), Some("spell-tests/1.0"));
        assert_eq!(record.ip_hash, hash_ip("198.51.100.4"));
    }

    #[tokio::test]
    async fn test_cast_spell_without_length_records_default_preset() {
        let mut h = harness(MockCompletion::replying(Some("A spell.")));
        let (status, _) = send(
            &h.router,
            post_json("/cast-spell", json!({ "intent": "courage", "length": "gigantic" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let record = tokio::time::timeout(Duration::from_secs(1), h.records.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.length, "medium");
        assert_eq!(record.ip_hash, hash_ip("unknown"));
    }

    #[tokio::test]
    async fn test_cast_spell_rejects_missing_or_blank_intent() {
        for body in [
            json!({}),
            json!({ "intent": "" }),
            json!({ "intent": "   ", "length": "long", "ingredients": "bleach" }),
        ] {
            let mut h = harness(MockCompletion::replying(Some("unused")));
            let (status, response) = send(&h.router, post_json("/cast-spell", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({ "error": "No intention provided." }));
            assert!(h.records.try_recv().is_err(), "rejected casts must not be recorded");
        }
    }

    #[tokio::test]
    async fn test_cast_spell_rejects_banned_ingredient_naming_the_term() {
        let h = harness(MockCompletion::replying(Some("unused")));
        let (status, body) = send(
            &h.router,
            post_json(
                "/cast-spell",
                json!({ "intent": "protection", "ingredients": "Sage and a GRENADE" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("\"grenade\""), "{error}");
    }

    #[tokio::test]
    async fn test_cast_spell_returns_fallback_on_empty_completion() {
        let h = harness(MockCompletion::replying(Some("   ")));
        let (status, body) = send(
            &h.router,
            post_json("/cast-spell", json!({ "intent": "sleep well" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "spell": FALLBACK_SPELL }));
    }

    #[tokio::test]
    async fn test_cast_spell_surfaces_upstream_failure() {
        let mut h = harness(MockCompletion::failing(LlmError::Api {
            status: 500,
            message: "The server had an error".into(),
        }));
        let (status, body) = send(
            &h.router,
            post_json("/cast-spell", json!({ "intent": "sleep well" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "The server had an error" }));
        assert!(h.records.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cast_spell_missing_api_key_is_500() {
        let h = harness(MockCompletion::failing(LlmError::MissingApiKey));
        let (status, body) = send(
            &h.router,
            post_json("/cast-spell", json!({ "intent": "sleep well" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "OpenAI API key is not configured." }));
    }

    #[tokio::test]
    async fn test_cast_spell_succeeds_when_recording_fails() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            llm: Arc::new(MockCompletion::replying(Some("Salt the threshold."))),
            spell_sink: Arc::new(FailingSink(tx)),
            subscribers: Arc::new(SubscriberStore::new(dir.path().join("subscribers.json"))),
            config: Config::for_tests(),
        };
        let router = build_router(state);

        let (status, body) = send(
            &router,
            post_json("/cast-spell", json!({ "intent": "protect my home" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "spell": "Salt the threshold." }));

        let attempted = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("persistence sink was not called")
            .unwrap();
        assert_eq!(attempted.intent, "protect my home");
    }

    #[tokio::test]
    async fn test_cast_spell_wrong_field_type_is_400_json() {
        let h = harness(MockCompletion::replying(Some("unused")));
        let (status, body) = send(&h.router, post_json("/cast-spell", json!({ "intent": 42 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn test_cast_spell_without_content_type_is_400_json() {
        let h = harness(MockCompletion::replying(Some("unused")));
        let request = Request::builder()
            .method("POST")
            .uri("/cast-spell")
            .body(Body::from(json!({ "intent": "rest" }).to_string()))
            .unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_cast_spell_malformed_json_is_400_json() {
        let h = harness(MockCompletion::replying(Some("unused")));
        let request = Request::builder()
            .method("POST")
            .uri("/cast-spell")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"intent\": "))
            .unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_subscribe_wrong_field_type_is_400_json() {
        let h = harness(MockCompletion::replying(None));
        let (status, body) = send(&h.router, post_json("/subscribe", json!({ "email": 7 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(h.subscribers.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_rejects_invalid_email() {
        let h = harness(MockCompletion::replying(None));
        let (status, body) = send(
            &h.router,
            post_json("/subscribe", json!({ "email": "not-an-email" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid email address." }));
    }

    #[tokio::test]
    async fn test_subscribe_missing_email_is_invalid() {
        let h = harness(MockCompletion::replying(None));
        let (status, body) = send(&h.router, post_json("/subscribe", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid email address." }));
    }

    #[tokio::test]
    async fn test_subscribe_twice_stores_one_entry() {
        let h = harness(MockCompletion::replying(None));

        let (status, body) = send(
            &h.router,
            post_json("/subscribe", json!({ "email": "moon@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": SUBSCRIBED_MESSAGE }));

        let (status, body) = send(
            &h.router,
            post_json("/subscribe", json!({ "email": "moon@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": ALREADY_SUBSCRIBED_MESSAGE }));

        assert_eq!(h.subscribers.list().await.unwrap(), vec!["moon@example.com"]);
    }

    #[tokio::test]
    async fn test_subscribe_write_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so reading it fails with a non-NotFound error.
        let state = AppState {
            llm: Arc::new(MockCompletion::replying(None)),
            spell_sink: Arc::new(crate::spell::persistence::DisabledSpellSink),
            subscribers: Arc::new(SubscriberStore::new(dir.path())),
            config: Config::for_tests(),
        };
        let router = build_router(state);

        let (status, body) = send(
            &router,
            post_json("/subscribe", json!({ "email": "moon@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }
}
