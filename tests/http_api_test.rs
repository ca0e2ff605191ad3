mod helpers;

use helpers::{date, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create(server: &TestServer, user: &str, name: &str, frequency: &str) -> String {
    let resp = server
        .post(user, "/api/habits")
        .json(&json!({ "name": name, "frequency": frequency }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn check_in(server: &TestServer, user: &str, id: &str) -> reqwest::Response {
    server
        .post(user, &format!("/api/habits/{id}/check-in"))
        .send()
        .await
        .unwrap()
}

async fn habit(server: &TestServer, user: &str, id: &str) -> Value {
    let resp = server
        .get(user, &format!("/api/habits/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

fn streaks(habit: &Value) -> (u64, u64) {
    (
        habit["currentStreak"].as_u64().unwrap(),
        habit["longestStreak"].as_u64().unwrap(),
    )
}

#[tokio::test]
async fn daily_streak_scenarios() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let id = create(&server, "alice", "Read", "daily").await;

    let resp = check_in(&server, "alice", &id).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["date"], "2025-01-10");
    assert_eq!(body["habitId"], id.as_str());
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));

    let resp = check_in(&server, "alice", &id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Already checked in today");
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));

    server.clock.set_day(date(2025, 1, 11));
    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (2, 2));

    server.clock.set_day(date(2025, 1, 12));
    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (3, 3));

    server.clock.set_day(date(2025, 1, 14));
    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 3));
}

#[tokio::test]
async fn weekly_streak_scenario() {
    let server = TestServer::start(date(2025, 1, 6)).await;
    let id = create(&server, "alice", "Long run", "weekly").await;

    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));

    server.clock.set_day(date(2025, 1, 8));
    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));

    server.clock.set_day(date(2025, 1, 13));
    assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (2, 2));
}

#[tokio::test]
async fn other_owner_gets_not_found() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let id = create(&server, "alice", "Read", "daily").await;

    let resp = check_in(&server, "bob", &id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Habit not found");

    for resp in [
        server.get("bob", &format!("/api/habits/{id}")).send().await.unwrap(),
        server
            .patch("bob", &format!("/api/habits/{id}"))
            .json(&json!({ "name": "Mine" }))
            .send()
            .await
            .unwrap(),
        server.delete("bob", &format!("/api/habits/{id}")).send().await.unwrap(),
        server
            .get("bob", &format!("/api/habits/{id}/check-ins"))
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let missing = check_in(&server, "alice", "no-such-habit").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let h = habit(&server, "alice", &id).await;
    assert_eq!(streaks(&h), (0, 0));
    assert_eq!(h["name"], "Read");
}

#[tokio::test]
async fn delete_cascades_and_unlists() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let id = create(&server, "alice", "Read", "daily").await;
    for day in 10..=12 {
        server.clock.set_day(date(2025, 1, day));
        assert_eq!(check_in(&server, "alice", &id).await.status(), StatusCode::CREATED);
    }

    let resp = server
        .delete("alice", &format!("/api/habits/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let list: Value = server
        .get("alice", "/api/habits")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));

    let resp = server
        .get("alice", &format!("/api/habits/{id}/check-ins"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let stats: Value = server
        .get("alice", "/api/analytics/habits")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["totalCheckIns"], 0);
}

#[tokio::test]
async fn list_carries_completed_flag() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let read = create(&server, "alice", "Read", "daily").await;
    let run = create(&server, "alice", "Run", "weekly").await;
    create(&server, "bob", "Swim", "daily").await;
    check_in(&server, "alice", &read).await;

    let list: Value = server
        .get("alice", "/api/habits")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], run.as_str());
    assert_eq!(list[0]["completed"], false);
    assert_eq!(list[1]["id"], read.as_str());
    assert_eq!(list[1]["completed"], true);
    assert_eq!(list[1]["isActive"], true);
    assert!(list[1]["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn missing_principal_is_unauthorized() {
    let server = TestServer::start(date(2025, 1, 10)).await;

    let resp = server
        .client
        .get(server.url("/api/habits"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Unauthorized");

    let blank = server.get("   ", "/api/habits").send().await.unwrap();
    assert_eq!(blank.status(), StatusCode::UNAUTHORIZED);

    let health = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let server = TestServer::start(date(2025, 1, 10)).await;

    for body in [
        json!({ "frequency": "daily" }),
        json!({ "name": "", "frequency": "daily" }),
        json!({ "name": "Read" }),
        json!({ "name": "Read", "frequency": "monthly" }),
    ] {
        let resp = server
            .post("alice", "/api/habits")
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let err: Value = resp.json().await.unwrap();
        assert!(err["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let malformed = server
        .post("alice", "/api/habits")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_edits_owner_fields_only() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let id = create(&server, "alice", "Read", "daily").await;
    check_in(&server, "alice", &id).await;

    let resp = server
        .patch("alice", &format!("/api/habits/{id}"))
        .json(&json!({ "name": "Read fiction", "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Read fiction");
    assert_eq!(body["isActive"], false);
    assert_eq!(body["frequency"], "daily");
    assert_eq!(streaks(&body), (1, 1));

    let resp = server
        .patch("alice", &format!("/api/habits/{id}"))
        .json(&json!({ "currentStreak": 99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));

    let resp = server
        .patch("alice", &format!("/api/habits/{id}"))
        .json(&json!({ "frequency": "yearly" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_in_note_and_history_range() {
    let server = TestServer::start(date(2025, 1, 1)).await;
    let id = create(&server, "alice", "Read", "daily").await;

    for day in 1..=5 {
        server.clock.set_day(date(2025, 1, day));
        let resp = server
            .post("alice", &format!("/api/habits/{id}/check-in"))
            .json(&json!({ "notes": format!("day {day}") }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let all: Value = server
        .get("alice", &format!("/api/habits/{id}/check-ins"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 5);
    assert_eq!(all[0]["date"], "2025-01-05");
    assert_eq!(all[0]["note"], "day 5");

    let ranged: Value = server
        .get(
            "alice",
            &format!("/api/habits/{id}/check-ins?start=2025-01-02&end=2025-01-03"),
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let dates: Vec<&str> = ranged
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-01-03", "2025-01-02"]);

    for query in ["?start=2025-01-04&end=2025-01-02", "?start=2025-01-02", "?start=yesterday&end=2025-01-02"] {
        let resp = server
            .get("alice", &format!("/api/habits/{id}/check-ins{query}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query: {query}");
    }
}

#[tokio::test]
async fn analytics_summarize_the_callers_habits() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let read = create(&server, "alice", "Read", "daily").await;
    let run = create(&server, "alice", "Run", "daily").await;
    let swim = create(&server, "bob", "Swim", "daily").await;

    check_in(&server, "alice", &read).await;
    check_in(&server, "bob", &swim).await;
    server.clock.set_day(date(2025, 1, 11));
    check_in(&server, "alice", &read).await;
    check_in(&server, "alice", &run).await;

    let stats: Value = server
        .get("alice", "/api/analytics/habits")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        stats,
        json!({
            "total": 2,
            "active": 2,
            "completedToday": 2,
            "longestStreak": 2,
            "totalCheckIns": 3,
        })
    );
}

#[tokio::test]
async fn concurrent_http_check_ins_succeed_once() {
    let server = TestServer::start(date(2025, 1, 10)).await;
    let id = create(&server, "alice", "Read", "daily").await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let request = server.post("alice", &format!("/api/habits/{id}/check-in"));
        tasks.spawn(async move { request.send().await.unwrap().status() });
    }
    let statuses = tasks.join_all().await;

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(),
        9
    );
    assert_eq!(streaks(&habit(&server, "alice", &id).await), (1, 1));
}
