mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_case(
    http: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<Uuid> {
    let res = http
        .post(format!("{}/api/cases", base_url))
        .bearer_auth(token)
        .json(&json!({
            "case_number": format!("CASE-{}", Uuid::new_v4()),
            "title": "Estate of Quill",
            "case_type": "probate"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create case: {}", res.status());
    let body: Value = res.json().await?;
    Ok(common::data(&body)["id"].as_str().unwrap().parse()?)
}

#[tokio::test]
async fn event_end_must_follow_start() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{}/api/events", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Filing deadline",
            "starts_at": "2031-04-01T12:00:00Z",
            "ends_at": "2031-04-01T11:00:00Z"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn patches_cannot_invert_the_event_window() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{}/api/events", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Mediation session",
            "starts_at": "2031-04-02T10:00:00Z",
            "ends_at": "2031-04-02T12:00:00Z"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let id = common::data(&body)["id"].as_str().unwrap().to_string();

    // Pull the end before the stored start
    let res = http
        .patch(format!("{}/api/events/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "ends_at": "2031-04-02T09:00:00Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Push the start past the stored end
    let res = http
        .patch(format!("{}/api/events/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "starts_at": "2031-04-02T13:00:00Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Moving both together stays legal
    let res = http
        .patch(format!("{}/api/events/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({
            "starts_at": "2031-04-02T13:00:00Z",
            "ends_at": "2031-04-02T15:00:00Z"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn events_filter_by_case_and_window() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let case_id = create_case(&http, &server.base_url, &token).await?;

    for (title, starts_at, with_case) in [
        ("Hearing prep", "2031-04-10T09:00:00Z", true),
        ("Deposition", "2031-04-20T09:00:00Z", true),
        ("Unrelated errand", "2031-04-15T09:00:00Z", false),
    ] {
        let mut payload = json!({ "title": title, "starts_at": starts_at });
        if with_case {
            payload["case_id"] = json!(case_id);
        }
        let res = http
            .post(format!("{}/api/events", server.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = http
        .get(format!("{}/api/events?case_id={}", server.base_url, case_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(common::data(&body).as_array().unwrap().len(), 2);

    let res = http
        .get(format!(
            "{}/api/events?from=2031-04-12T00:00:00Z&to=2031-04-30T00:00:00Z",
            server.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let titles: Vec<&str> = common::data(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Unrelated errand", "Deposition"]);
    Ok(())
}

#[tokio::test]
async fn upcoming_window_is_bounded() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    for days in ["0", "31", "-1"] {
        let res = http
            .get(format!("{}/api/events/upcoming?days={}", server.base_url, days))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "days={}", days);
    }

    let res = http
        .get(format!("{}/api/events/upcoming", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn hearings_require_an_owned_case() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let owner_token = common::register_and_login(server).await?;
    let other_token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let case_id = create_case(&http, &server.base_url, &owner_token).await?;

    // Another account cannot attach hearings to this case
    let res = http
        .post(format!("{}/api/hearings", server.base_url))
        .bearer_auth(&other_token)
        .json(&json!({ "case_id": case_id, "hearing_date": "2031-05-01T09:00:00Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = http
        .post(format!("{}/api/hearings", server.base_url))
        .bearer_auth(&owner_token)
        .json(&json!({
            "case_id": case_id,
            "hearing_date": "2031-05-01T09:00:00Z",
            "court_room": "4B"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let hearing_id = common::data(&body)["id"].as_str().unwrap().to_string();
    assert_eq!(common::data(&body)["status"], "scheduled");
    assert_eq!(common::data(&body)["case_title"], "Estate of Quill");

    let res = http
        .patch(format!("{}/api/hearings/{}", server.base_url, hearing_id))
        .bearer_auth(&owner_token)
        .json(&json!({ "status": "postponed", "next_hearing_date": "2031-06-01T09:00:00Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(common::data(&body)["status"], "postponed");
    Ok(())
}

#[tokio::test]
async fn deleting_a_case_removes_its_hearings() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let case_id = create_case(&http, &server.base_url, &token).await?;
    let res = http
        .post(format!("{}/api/hearings", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "case_id": case_id, "hearing_date": "2031-05-02T09:00:00Z" }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    let hearing_id = common::data(&body)["id"].as_str().unwrap().to_string();

    let res = http
        .delete(format!("{}/api/cases/{}", server.base_url, case_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = http
        .get(format!("{}/api/hearings/{}", server.base_url, hearing_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
