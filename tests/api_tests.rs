//! API integration tests.
//!
//! Run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so tests can be re-run against the same database
fn unique() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Register an admin and return a bearer token
async fn admin_token(client: &Client) -> String {
    let id_number = format!("admin-{}", unique());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "role": "Admin",
            "full_name": "Test Admin",
            "id_number": id_number,
            "password": "secret-pass"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    login(client, "Admin", &id_number, "secret-pass").await
}

/// Register a student patron, returning (token, patron_id)
async fn student(client: &Client) -> (String, i64) {
    let id_number = format!("student-{}", unique());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "role": "Student",
            "full_name": "Test Student",
            "id_number": id_number,
            "password": "secret-pass",
            "strand": "STEM",
            "grade_level": "Grade 11"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let patron_id = body["id"].as_i64().expect("No patron id");

    let token = login(client, "Student", &id_number, "secret-pass").await;
    (token, patron_id)
}

async fn login(client: &Client, role: &str, id_number: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "role": role,
            "id_number": id_number,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Add a book via the admin token and return its id
async fn add_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "category": "Fiction",
            "title": title,
            "author": "Test Author",
            "edition": "1st",
            "isbn": "978-0-00-000000-0",
            "publication": "2024"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book id")
}

async fn borrow(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request")
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
        .json(&json!({
            "role": "Admin",
            "id_number": "does-not-exist",
            "password": "wrong"
        }))
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
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (token, patron_id) = student(&client).await;

    let book_id = add_book(&client, &admin, "Borrow Flow Book").await;

    // Borrow
    let response = borrow(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["loan_id"].as_i64().expect("No loan id");

    // Book is now out
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Borrowed");

    // Count reflects the open loan
    let response = client
        .get(format!("{}/patrons/{}/loans/count", BASE_URL, patron_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["active_loans"], 1);

    // Return on time
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "condition": "Good" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["return_status"], "Returned");
    assert_eq!(body["loan"]["condition"], "Good");

    // Book is available again
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Available");
}

#[tokio::test]
#[ignore]
async fn test_double_return_is_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (token, _patron_id) = student(&client).await;

    let book_id = add_book(&client, &admin, "Double Return Book").await;
    let response = borrow(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["loan_id"].as_i64().expect("No loan id");

    let first = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(first.status().is_success());

    let second = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "InvalidLoanState");
}

#[tokio::test]
#[ignore]
async fn test_borrowed_book_is_unavailable() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (first, _) = student(&client).await;
    let (second, _) = student(&client).await;

    let book_id = add_book(&client, &admin, "Contested Book").await;

    let response = borrow(&client, &first, book_id).await;
    assert_eq!(response.status(), 201);

    let response = borrow(&client, &second, book_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BookUnavailable");
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_enforced() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (token, patron_id) = student(&client).await;

    // Five borrows succeed
    for i in 0..5 {
        let book_id = add_book(&client, &admin, &format!("Limit Book {}", i)).await;
        let response = borrow(&client, &token, book_id).await;
        assert_eq!(response.status(), 201);
    }

    // The sixth is refused, whatever the book
    let book_id = add_book(&client, &admin, "One Too Many").await;
    let response = borrow(&client, &token, book_id).await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "LimitExceeded");

    // The refused attempt touched nothing
    let response = client
        .get(format!("{}/patrons/{}/loans/count", BASE_URL, patron_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["active_loans"], 5);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Available");
}

#[tokio::test]
#[ignore]
async fn test_borrow_nonexistent_book() {
    let client = Client::new();
    let (token, patron_id) = student(&client).await;

    let response = borrow(&client, &token, 9_999_999).await;
    assert_eq!(response.status(), 404);

    // No loan was created
    let response = client
        .get(format!("{}/patrons/{}/loans/count", BASE_URL, patron_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["active_loans"], 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_single_winner() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (first, _) = student(&client).await;
    let (second, _) = student(&client).await;

    let book_id = add_book(&client, &admin, "Race Book").await;

    let (a, b) = tokio::join!(
        borrow(&client, &first, book_id),
        borrow(&client, &second, book_id)
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    assert!(statuses.contains(&201), "one borrow must succeed: {:?}", statuses);
    assert!(statuses.contains(&409), "one borrow must lose: {:?}", statuses);
}

#[tokio::test]
#[ignore]
async fn test_patron_cannot_read_full_ledger() {
    let client = Client::new();
    let (token, _) = student(&client).await;

    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"]["total"].is_number());
    assert!(body["loans"]["open"].is_number());
    assert!(body["patrons"]["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_patron_history_shows_book_details() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (token, patron_id) = student(&client).await;

    let book_id = add_book(&client, &admin, "History Book").await;
    let response = borrow(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/patrons/{}/loans", BASE_URL, patron_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let loans = body.as_array().expect("Expected an array");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["title"], "History Book");
    assert_eq!(loans[0]["category"], "Fiction");
    assert_eq!(loans[0]["return_status"], "Active");
    assert_eq!(loans[0]["condition"], "-");
}
