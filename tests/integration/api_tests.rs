//! API integration tests for the loan-request workflow.
//!
//! These tests drive a running server (with its database) end to end and
//! assume a seeded administrator account `admin`/`admin`. Each scenario
//! creates its own campus, users and books, so runs are independent.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

async fn login(client: &Client, login: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "login": login, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", login);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, "admin", "admin").await
}

async fn create_campus(client: &Client, token: &str) -> i64 {
    let name = unique("campus");
    let response = client
        .post(format!("{}/campuses", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": name, "code": &name[name.len() - 8..], "address": "1 Library Way" }))
        .send()
        .await
        .expect("Failed to create campus");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No campus ID")
}

/// Create a user and return (id, login, password)
async fn create_user(
    client: &Client,
    token: &str,
    campus_id: i64,
    role: &str,
) -> (i64, String, String) {
    let user_login = unique(role);
    let password = "s3cret-password".to_string();
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "login": user_login,
            "password": password,
            "display_name": format!("Test {}", role),
            "role": role,
            "campus_id": campus_id
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    (body["id"].as_i64().expect("No user ID"), user_login, password)
}

async fn create_book(client: &Client, token: &str, campus_id: i64, kind: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": unique("book"),
            "author": "Test Author",
            "kind": kind,
            "campus_id": campus_id
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No book ID")
}

async fn submit_request(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/loan-requests", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to submit loan request")
}

async fn decide(
    client: &Client,
    token: &str,
    request_id: i64,
    decision: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/loan-requests/{}/decide", BASE_URL, request_id))
        .bearer_auth(token)
        .json(&json!({ "decision": decision }))
        .send()
        .await
        .expect("Failed to decide loan request")
}

async fn get_book(client: &Client, token: &str, book_id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get book");
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

/// Full fixture: campus, reader, staff, physical book, pending request.
/// Returns (reader_token, staff_token, book_id, request_id).
async fn pending_request_fixture(client: &Client) -> (String, String, i64, i64) {
    let admin = admin_token(client).await;
    let campus_id = create_campus(client, &admin).await;
    let (_, reader_login, reader_pw) = create_user(client, &admin, campus_id, "regular-user").await;
    let (_, staff_login, staff_pw) = create_user(client, &admin, campus_id, "staff").await;
    let book_id = create_book(client, &admin, campus_id, "physical").await;

    let reader = login(client, &reader_login, &reader_pw).await;
    let staff = login(client, &staff_login, &staff_pw).await;

    let response = submit_request(client, &reader, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loanRequest"]["status"], "pending");
    let request_id = body["loanRequest"]["id"].as_i64().expect("No request ID");

    (reader, staff, book_id, request_id)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "login": "admin", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_pending_request_is_rejected() {
    let client = Client::new();
    let (reader, _staff, book_id, _request_id) = pending_request_fixture(&client).await;

    let response = submit_request(&client, &reader, book_id).await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "book");
}

#[tokio::test]
#[ignore]
async fn test_ebooks_cannot_be_requested() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let campus_id = create_campus(&client, &admin).await;
    let (_, reader_login, reader_pw) =
        create_user(&client, &admin, campus_id, "regular-user").await;
    let book_id = create_book(&client, &admin, campus_id, "ebook").await;

    let reader = login(&client, &reader_login, &reader_pw).await;
    let response = submit_request(&client, &reader, book_id).await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "book");
}

#[tokio::test]
#[ignore]
async fn test_staff_cannot_submit_requests() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let campus_id = create_campus(&client, &admin).await;
    let (_, staff_login, staff_pw) = create_user(&client, &admin, campus_id, "staff").await;
    let book_id = create_book(&client, &admin, campus_id, "physical").await;

    let staff = login(&client, &staff_login, &staff_pw).await;
    let response = submit_request(&client, &staff, book_id).await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_approval_creates_loan_and_clears_availability() {
    let client = Client::new();
    let (_reader, staff, book_id, request_id) = pending_request_fixture(&client).await;

    let response = decide(&client, &staff, request_id, "approved").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loanRequest"]["status"], "approved");
    assert!(body["loanRequest"]["approver_id"].is_number());
    assert!(body["loanRequest"]["decided_at"].is_string());

    let loan = &body["bookLoan"];
    assert_eq!(loan["status"], "processing");
    assert_eq!(loan["book_id"].as_i64(), Some(book_id));

    // return_date = today + 14 days
    let return_date = loan["return_date"].as_str().expect("No return date");
    let expected = (Utc::now() + Duration::days(14)).format("%Y-%m-%d").to_string();
    assert!(return_date.starts_with(&expected), "return_date {} != {}", return_date, expected);

    let book = get_book(&client, &staff, book_id).await;
    assert_eq!(book["is_available"], false);
}

#[tokio::test]
#[ignore]
async fn test_second_decision_fails_cleanly() {
    let client = Client::new();
    let (_reader, staff, book_id, request_id) = pending_request_fixture(&client).await;

    let response = decide(&client, &staff, request_id, "approved").await;
    assert_eq!(response.status(), 200);

    // A second decision observes the post-transition state
    let response = decide(&client, &staff, request_id, "rejected").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "request");

    // Availability untouched by the failed decision
    let book = get_book(&client, &staff, book_id).await;
    assert_eq!(book["is_available"], false);
}

#[tokio::test]
#[ignore]
async fn test_rejection_creates_no_loan() {
    let client = Client::new();
    let (_reader, staff, book_id, request_id) = pending_request_fixture(&client).await;

    let response = decide(&client, &staff, request_id, "rejected").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loanRequest"]["status"], "rejected");
    assert_eq!(body["loanRequest"]["canceled_by_requester"], false);
    assert!(body["bookLoan"].is_null());

    let book = get_book(&client, &staff, book_id).await;
    assert_eq!(book["is_available"], true);
}

#[tokio::test]
#[ignore]
async fn test_cancel_own_pending_request() {
    let client = Client::new();
    let (reader, staff, _book_id, request_id) = pending_request_fixture(&client).await;

    let response = client
        .post(format!("{}/loan-requests/{}/cancel", BASE_URL, request_id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to cancel request");
    assert_eq!(response.status(), 200);

    // A self-cancel is a rejection with no approver
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loanRequest"]["status"], "rejected");
    assert_eq!(body["loanRequest"]["canceled_by_requester"], true);
    assert!(body["loanRequest"]["approver_id"].is_null());

    // Canceling again fails as already processed
    let response = client
        .post(format!("{}/loan-requests/{}/cancel", BASE_URL, request_id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to cancel request");
    assert_eq!(response.status(), 422);

    // And deciding a canceled request fails too
    let response = decide(&client, &staff, request_id, "approved").await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_cancel_requires_ownership() {
    let client = Client::new();
    let (_reader, _staff, _book_id, request_id) = pending_request_fixture(&client).await;

    // A different reader cannot cancel someone else's request
    let admin = admin_token(&client).await;
    let campus_id = create_campus(&client, &admin).await;
    let (_, other_login, other_pw) =
        create_user(&client, &admin, campus_id, "regular-user").await;
    let other = login(&client, &other_login, &other_pw).await;

    let response = client
        .post(format!("{}/loan-requests/{}/cancel", BASE_URL, request_id))
        .bearer_auth(&other)
        .send()
        .await
        .expect("Failed to cancel request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_one_book_cannot_be_approved_twice() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let campus_id = create_campus(&client, &admin).await;
    let (_, first_login, first_pw) =
        create_user(&client, &admin, campus_id, "regular-user").await;
    let (_, second_login, second_pw) =
        create_user(&client, &admin, campus_id, "regular-user").await;
    let (_, staff_login, staff_pw) = create_user(&client, &admin, campus_id, "staff").await;
    let book_id = create_book(&client, &admin, campus_id, "physical").await;

    let first = login(&client, &first_login, &first_pw).await;
    let second = login(&client, &second_login, &second_pw).await;
    let staff = login(&client, &staff_login, &staff_pw).await;

    // Two pending requests for the same available book
    let response = submit_request(&client, &first, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let first_request = body["loanRequest"]["id"].as_i64().unwrap();

    let response = submit_request(&client, &second, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let second_request = body["loanRequest"]["id"].as_i64().unwrap();

    // First approval wins
    let response = decide(&client, &staff, first_request, "approved").await;
    assert_eq!(response.status(), 200);

    // Second approval hits the unavailable book
    let response = decide(&client, &staff, second_request, "approved").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "book");

    // The losing request can still be rejected
    let response = decide(&client, &staff, second_request, "rejected").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_decisions_serialize() {
    let client = Client::new();
    let (_reader, staff, _book_id, request_id) = pending_request_fixture(&client).await;

    let (a, b) = tokio::join!(
        decide(&client, &staff, request_id, "approved"),
        decide(&client, &staff, request_id, "approved"),
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    let successes = statuses.iter().filter(|s| **s == 200).count();
    let conflicts = statuses.iter().filter(|s| **s == 422).count();

    // Exactly one decision wins; the other observes "already processed"
    assert_eq!(successes, 1, "statuses: {:?}", statuses);
    assert_eq!(conflicts, 1, "statuses: {:?}", statuses);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_availability() {
    let client = Client::new();
    let (_reader, staff, book_id, request_id) = pending_request_fixture(&client).await;

    let response = decide(&client, &staff, request_id, "approved").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let loan_id = body["bookLoan"]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to return loan");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loan"]["status"], "returned");
    assert!(body["loan"]["returned_at"].is_string());

    let book = get_book(&client, &staff, book_id).await;
    assert_eq!(book["is_available"], true);

    // Returning twice fails as already closed
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to return loan");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_availability_guard_blocks_manual_override() {
    let client = Client::new();
    let (_reader, staff, book_id, request_id) = pending_request_fixture(&client).await;

    let response = decide(&client, &staff, request_id, "approved").await;
    assert_eq!(response.status(), 200);

    // A generic book edit cannot force the book available mid-loan
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&staff)
        .json(&json!({ "is_available": true }))
        .send()
        .await
        .expect("Failed to update book");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "book");
}

#[tokio::test]
#[ignore]
async fn test_local_scope_hides_other_campuses() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let campus_a = create_campus(&client, &admin).await;
    let campus_b = create_campus(&client, &admin).await;
    let (_, reader_login, reader_pw) =
        create_user(&client, &admin, campus_b, "regular-user").await;
    let book_id = create_book(&client, &admin, campus_a, "physical").await;

    let reader = login(&client, &reader_login, &reader_pw).await;

    // Local (default) scope: the campus-A book is not listed
    let response = client
        .get(format!("{}/books?per_page=100", BASE_URL))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to list books");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert!(!ids.contains(&book_id));

    // Global scope: visible
    let response = client
        .get(format!("{}/books?scope=global&per_page=100", BASE_URL))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to list books");
    let body: Value = response.json().await.unwrap();
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert!(ids.contains(&book_id));
}

#[tokio::test]
#[ignore]
async fn test_stats_overview() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to get stats");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_number());
    assert!(body["active_loans"].is_number());
    assert!(body["pending_requests"].is_number());
}
