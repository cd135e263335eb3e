//! Integration tests for the botfleet HTTP API

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use fleet_bots::builtin_registry;
    use fleet_http::{create_router, FleetState};
    use fleet_ledger::MemoryLedger;
    use fleet_orchestrator::{Orchestrator, OrchestratorConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<Orchestrator>) {
        let orchestrator = Orchestrator::new(
            builtin_registry(),
            Arc::new(MemoryLedger::new()),
            OrchestratorConfig::default(),
        )
        .await
        .unwrap();
        let orchestrator = Arc::new(orchestrator);
        (create_router(FleetState::new(orchestrator.clone())), orchestrator)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_execute_success_envelope() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/execute",
            Some(json!({"bot": "social", "command": "platforms"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["bot"], "social");
        assert_eq!(body["command"], "platforms");
        assert_eq!(body["result"]["platforms"].as_array().unwrap().len(), 3);
        assert!(body.get("error").is_none());
        assert!(body["duration"].is_u64());
    }

    #[tokio::test]
    async fn test_execute_failure_is_still_200() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/execute",
            Some(json!({"bot": "unknown-bot", "command": "x", "params": {}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Bot not found: unknown-bot");
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_execute_malformed_body() {
        let (app, _) = app().await;
        let (status, body) = send(&app, Method::POST, "/api/execute", Some(json!({"bot": "docs"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("command"));
    }

    #[tokio::test]
    async fn test_schedule_lifecycle() {
        let (app, orchestrator) = app().await;
        let job = json!({
            "id": "job1",
            "schedule": "0 9 * * 1",
            "bot": "business",
            "command": "report",
            "params": {"title": "Weekly", "metrics": {"signups": 10}}
        });

        let (status, body) = send(&app, Method::POST, "/api/schedules", Some(job.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "taskId": "job1"}));

        let (status, body) = send(&app, Method::POST, "/api/schedules", Some(job)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"success": false, "error": "Task already scheduled: job1"}));

        let (_, body) = send(&app, Method::GET, "/api/schedules", None).await;
        let schedules = body["schedules"].as_array().unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0]["schedule"], "0 9 * * 1");

        let (status, body) = send(&app, Method::DELETE, "/api/schedules/job1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(&app, Method::DELETE, "/api/schedules/job1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found: job1");

        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_schedule_invalid_cron() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/schedules",
            Some(json!({"id": "bad", "schedule": "sometimes", "bot": "docs", "command": "daily-log"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_status_and_history() {
        let (app, _) = app().await;
        for _ in 0..3 {
            send(
                &app,
                Method::POST,
                "/api/execute",
                Some(json!({"bot": "social", "command": "platforms"})),
            )
            .await;
        }
        send(
            &app,
            Method::POST,
            "/api/execute",
            Some(json!({"bot": "docs", "command": "nope"})),
        )
        .await;

        let (_, status) = send(&app, Method::GET, "/api/status", None).await;
        assert_eq!(status["stats"]["tasksCompleted"], 3);
        assert_eq!(status["stats"]["tasksFailed"], 1);
        assert_eq!(status["stats"]["costSaved"], 3.0);
        assert_eq!(status["queueLength"], 0);
        assert!(status["activeTask"].is_null());
        assert_eq!(status["bots"]["social"]["name"], "Social Bot");

        let (_, body) = send(&app, Method::GET, "/api/history?limit=2", None).await;
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["command"], "nope");
        assert_eq!(history[0]["success"], false);
        assert_eq!(history[1]["success"], true);

        let (_, body) = send(&app, Method::GET, "/api/history", None).await;
        assert_eq!(body["history"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_history_bad_limit_is_json_error() {
        let (app, _) = app().await;
        let (status, body) = send(&app, Method::GET, "/api/history?limit=abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bots_listing() {
        let (app, _) = app().await;
        let (status, body) = send(&app, Method::GET, "/api/bots", None).await;

        assert_eq!(status, StatusCode::OK);
        let bots = body["bots"].as_array().unwrap();
        assert_eq!(bots.len(), 5);
        assert!(bots.iter().any(|b| b["bot"] == "code"));
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let (app, _) = app().await;
        send(
            &app,
            Method::POST,
            "/api/execute",
            Some(json!({"bot": "ghost", "command": "x"})),
        )
        .await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("fleet_executions_failed_total 1"));
    }
}
