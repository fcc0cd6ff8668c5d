use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use boardsync_backend::api::{create_router, AppState};
use boardsync_backend::auth::jwt;
use boardsync_backend::config::Config;

pub const TEST_SECRET: &str = "test-secret";

pub async fn setup_test_db() -> SqlitePool {
    // One connection: every new connection to sqlite::memory: would see its
    // own fresh database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::query(
        r#"
        CREATE TABLE boards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            owner_id TEXT NOT NULL,
            background TEXT NOT NULL DEFAULT '#FFFFFF',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE board_members (
            board_id TEXT NOT NULL REFERENCES boards(id),
            user_id TEXT NOT NULL,
            PRIMARY KEY (board_id, user_id)
        );

        CREATE TABLE lists (
            id TEXT PRIMARY KEY,
            board_id TEXT NOT NULL REFERENCES boards(id),
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#6B7280',
            position REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE cards (
            id TEXT PRIMARY KEY,
            board_id TEXT NOT NULL REFERENCES boards(id),
            list_id TEXT NOT NULL REFERENCES lists(id),
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            position REAL NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium',
            due_date TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create test schema");

    pool
}

pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        cors_origin: "http://localhost:3000".to_string(),
    })
}

pub fn mint_token(user_id: &str) -> String {
    jwt::mint_token(TEST_SECRET, user_id).expect("Failed to mint test token")
}

/// Router plus the state it shares, with a token for the default test user.
pub async fn setup_app() -> (Router, AppState, String) {
    let pool = setup_test_db().await;
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    let app = create_router(state.clone(), &config);
    let token = mint_token("user-1");

    (app, state, token)
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
    token: Option<&str>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}

/// Creates a board through the API and returns (board_id, list ids in column
/// order). New boards are seeded with To Do / Doing / Done.
pub async fn create_board(app: &Router, token: &str, name: &str) -> (String, Vec<String>) {
    let (status, body) = make_request(
        app.clone(),
        "POST",
        "/api/boards",
        Some(serde_json::json!({ "name": name }).to_string()),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "board create failed: {body}");

    let board: serde_json::Value = serde_json::from_str(&body).unwrap();
    let board_id = board["id"].as_str().unwrap().to_string();

    let (status, body) = make_request(
        app.clone(),
        "GET",
        &format!("/api/boards/{}", board_id),
        None,
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "board fetch failed: {body}");

    let detail: serde_json::Value = serde_json::from_str(&body).unwrap();
    let lists = detail["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect();

    (board_id, lists)
}

pub async fn create_card(
    app: &Router,
    token: &str,
    board_id: &str,
    list_id: &str,
    title: &str,
) -> serde_json::Value {
    let (status, body) = make_request(
        app.clone(),
        "POST",
        "/api/cards",
        Some(
            serde_json::json!({
                "title": title,
                "boardId": board_id,
                "listId": list_id,
            })
            .to_string(),
        ),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "card create failed: {body}");

    let envelope: serde_json::Value = serde_json::from_str(&body).unwrap();
    envelope["card"].clone()
}

pub async fn move_card(
    app: &Router,
    token: &str,
    card_id: &str,
    destination_list_id: &str,
    destination_index: usize,
) -> (StatusCode, serde_json::Value) {
    let (status, body) = make_request(
        app.clone(),
        "PATCH",
        &format!("/api/cards/{}/move", card_id),
        Some(
            serde_json::json!({
                "destinationListId": destination_list_id,
                "destinationIndex": destination_index,
            })
            .to_string(),
        ),
        Some(token),
    )
    .await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    (status, value)
}

/// Card titles of a list in display order, read through the API.
pub async fn list_titles(app: &Router, token: &str, board_id: &str, list_id: &str) -> Vec<String> {
    let (status, body) = make_request(
        app.clone(),
        "GET",
        &format!("/api/cards?boardId={}", board_id),
        None,
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "card listing failed: {body}");

    let cards: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    cards
        .iter()
        .filter(|c| c["listId"] == list_id)
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}
