mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_client(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
) -> Result<Uuid> {
    let res = client
        .post(format!("{}/api/clients", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create client: {}", res.status());
    let body: Value = res.json().await?;
    Ok(common::data(&body)["id"].as_str().unwrap().parse()?)
}

#[tokio::test]
async fn client_crud_round_trip() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let id = create_client(&http, &server.base_url, &token, "Ada Marsh").await?;

    let res = http
        .get(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(common::data(&body)["name"], "Ada Marsh");

    let res = http
        .patch(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "phone": "+1-555-0100" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(common::data(&body)["phone"], "+1-555-0100");
    assert_eq!(common::data(&body)["name"], "Ada Marsh");

    let res = http
        .delete(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = http
        .get(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_patch_is_rejected() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let id = create_client(&http, &server.base_url, &token, "Empty Patch").await?;

    let res = http
        .patch(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn client_with_cases_cannot_be_deleted() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let client_id = create_client(&http, &server.base_url, &token, "Busy Client").await?;

    let res = http
        .post(format!("{}/api/cases", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "case_number": format!("CASE-{}", Uuid::new_v4()),
            "title": "Marsh v. Crown Holdings",
            "case_type": "civil",
            "client_id": client_id
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let case_id: Uuid = common::data(&body)["id"].as_str().unwrap().parse()?;

    let res = http
        .delete(format!("{}/api/clients/{}", server.base_url, client_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Deleting the case first unblocks the client
    let res = http
        .delete(format!("{}/api/cases/{}", server.base_url, case_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = http
        .delete(format!("{}/api/clients/{}", server.base_url, client_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_case_number_conflicts() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let case_number = format!("CASE-{}", Uuid::new_v4());
    let payload = json!({ "case_number": case_number, "title": "First filing", "case_type": "civil" });

    let res = http
        .post(format!("{}/api/cases", server.base_url))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = http
        .post(format!("{}/api/cases", server.base_url))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn simultaneous_duplicate_case_numbers_admit_exactly_one() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let payload = json!({
        "case_number": format!("CASE-{}", Uuid::new_v4()),
        "title": "Racing filing",
        "case_type": "civil"
    });
    let post = |p: Value| {
        http.post(format!("{}/api/cases", server.base_url))
            .bearer_auth(&token)
            .json(&p)
            .send()
    };

    // Both may pass the pre-check; the unique index still admits only one,
    // and the loser surfaces as Conflict rather than a generic failure
    let (first, second) = tokio::join!(post(payload.clone()), post(payload.clone()));
    let mut statuses = [first?.status(), second?.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    Ok(())
}

#[tokio::test]
async fn records_are_invisible_across_owners() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let owner_token = common::register_and_login(server).await?;
    let other_token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let id = create_client(&http, &server.base_url, &owner_token, "Private Client").await?;

    // Read, update, and delete through another account all report NotFound
    let res = http
        .get(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&other_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = http
        .patch(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&other_token)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = http
        .delete(format!("{}/api/clients/{}", server.base_url, id))
        .bearer_auth(&other_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_requires_minimum_length() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::register_and_login(server).await?;
    let http = reqwest::Client::new();

    let res = http
        .get(format!("{}/api/clients/search?q=a", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    create_client(&http, &server.base_url, &token, "Searchable Quill").await?;
    let res = http
        .get(format!("{}/api/clients/search?q=Quill", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(common::data(&body).as_array().unwrap().iter().any(|c| c["name"] == "Searchable Quill"));
    Ok(())
}
