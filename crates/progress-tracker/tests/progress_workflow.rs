use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use progress_tracker::workflows::progress::{
    progress_router, Child, ChildRepository, ProgressService, RepositoryError, RuleConfig,
    SettingsRepository,
};

#[derive(Default)]
struct Children(Mutex<Vec<Child>>);

impl ChildRepository for Children {
    fn load_all(&self) -> Result<Vec<Child>, RepositoryError> {
        Ok(self.0.lock().expect("lock").clone())
    }

    fn replace_all(&self, children: Vec<Child>) -> Result<(), RepositoryError> {
        *self.0.lock().expect("lock") = children;
        Ok(())
    }

    fn update<T, E, F>(&self, change: F) -> Result<T, E>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.0.lock().expect("lock");
        let (children, value) = change(guard.as_slice())?;
        *guard = children;
        Ok(value)
    }
}

#[derive(Default)]
struct Settings(Mutex<Option<RuleConfig>>);

impl SettingsRepository for Settings {
    fn load(&self) -> Result<Option<RuleConfig>, RepositoryError> {
        Ok(self.0.lock().expect("lock").clone())
    }

    fn store(&self, config: RuleConfig) -> Result<(), RepositoryError> {
        *self.0.lock().expect("lock") = Some(config);
        Ok(())
    }
}

fn router() -> axum::Router {
    progress_router(Arc::new(ProgressService::new(
        Arc::new(Children::default()),
        Arc::new(Settings::default()),
    )))
}

async fn send(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |value| Body::from(value.to_string())))
        .expect("request builds");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

#[tokio::test]
async fn daily_evaluations_drive_period_achievement() {
    let router = router();

    let mut settings = serde_json::to_value(RuleConfig::default()).expect("serializes");
    settings["categories"] = json!(["Chores", "Homework"]);
    settings["periods"] = json!([{"days": 3, "name": "3-day"}]);
    settings["cancelRule"] = json!({
        "enabled": true, "highScore": 2, "highCount": 2, "lowScore": 0, "lowCount": 1
    });
    settings["vetoRule"] = json!({"enabled": true, "zeroCount": 2});
    let (status, _) = send(&router, "PUT", "/api/v1/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, noah) = send(&router, "POST", "/api/v1/children", Some(json!({"name": "Noah"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = noah["id"].as_str().expect("id").to_string();

    let days = [
        ("2025-04-01", [0, 1]),
        ("2025-04-02", [1, 2]),
        ("2025-04-03", [2, 2]),
        ("2025-04-04", [2, 2]),
    ];
    for (date, [chores, homework]) in days {
        let batch = json!({
            "date": date,
            "evaluator": "Dana",
            "entries": [{"childId": id, "scores": {"0": chores, "1": homework}}]
        });
        let (status, _) = send(&router, "POST", "/api/v1/evaluations", Some(batch)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = send(&router, "GET", &format!("/api/v1/children/{id}/stats"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Overall holds five 2s, two 1s and one 0; one cancel round leaves [2, 2, 2, 1, 1].
    assert_eq!(stats["stats"]["totalScores"], 5);
    assert_eq!(stats["stats"]["average"], 1.6);
    assert_eq!(stats["stats"]["vetoApplied"], false);

    let period = &stats["stats"]["periods"][0];
    assert_eq!(period["daysCount"], 3);
    assert_eq!(period["achieved"], true);

    let (_, report) = send(&router, "GET", "/api/v1/reports/cohort", None).await;
    assert_eq!(report["children"][0]["status"], "achieved");
    assert_eq!(report["periods"][0]["achieved"], 1);
}

#[tokio::test]
async fn absent_marks_clear_a_day_and_can_trigger_veto() {
    let router = router();
    let (_, child) = send(&router, "POST", "/api/v1/children", Some(json!({"name": "Amira"}))).await;
    let id = child["id"].as_str().expect("id").to_string();

    let mut settings = serde_json::to_value(RuleConfig::default()).expect("serializes");
    settings["vetoRule"] = json!({"enabled": true, "zeroCount": 2});
    let (status, _) = send(&router, "PUT", "/api/v1/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);

    let full = |date: &str, scores: [u8; 4]| {
        json!({
            "date": date,
            "evaluator": "Dana",
            "entries": [{"childId": id, "scores": {"0": scores[0], "1": scores[1], "2": scores[2], "3": scores[3]}}]
        })
    };

    send(&router, "POST", "/api/v1/evaluations", Some(full("2025-04-01", [2, 2, 2, 2]))).await;
    send(&router, "POST", "/api/v1/evaluations", Some(full("2025-04-02", [0, 0, 2, 2]))).await;

    let (_, vetoed) = send(&router, "GET", &format!("/api/v1/children/{id}/stats"), None).await;
    assert_eq!(vetoed["stats"]["vetoApplied"], true);
    assert_eq!(vetoed["stats"]["average"], 0.0);

    // Another child's scores keep the batch valid while the absent mark clears the bad day.
    let (_, other) = send(&router, "POST", "/api/v1/children", Some(json!({"name": "Zed"}))).await;
    let other_id = other["id"].as_str().expect("id");
    let batch = json!({
        "date": "2025-04-02",
        "evaluator": "Dana",
        "entries": [
            {"childId": id, "absent": true},
            {"childId": other_id, "scores": {"0": 1, "1": 1, "2": 1, "3": 1}}
        ]
    });
    let (status, outcome) = send(&router, "POST", "/api/v1/evaluations", Some(batch)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["cleared"], 1);

    let (_, recovered) = send(&router, "GET", &format!("/api/v1/children/{id}/stats"), None).await;
    assert_eq!(recovered["stats"]["vetoApplied"], false);
    assert_eq!(recovered["stats"]["average"], 2.0);
}

#[tokio::test]
async fn archived_children_leave_default_listings() {
    let router = router();
    let (_, child) = send(&router, "POST", "/api/v1/children", Some(json!({"name": "Bea"}))).await;
    let id = child["id"].as_str().expect("id").to_string();
    send(&router, "POST", "/api/v1/children", Some(json!({"name": "ayla"}))).await;

    let (status, _) = send(&router, "POST", &format!("/api/v1/children/{id}/archive"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&router, "GET", "/api/v1/children", None).await;
    assert_eq!(listed.as_array().expect("array").len(), 1);
    assert_eq!(listed[0]["name"], "ayla");

    let (_, everyone) = send(&router, "GET", "/api/v1/children?include_archived=true&search=B", None).await;
    assert_eq!(everyone.as_array().expect("array").len(), 1);
    assert_eq!(everyone[0]["archived"], true);

    let (status, _) = send(&router, "POST", "/api/v1/children/ghost/archive", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
