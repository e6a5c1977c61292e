use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use shoplite::{
    AppConfig, AppState, create_router,
    error::{AppError, AppResult},
    models::{Item, ROLE_CUSTOMER, User, UserAuthRow, Voucher},
    repository::{Repository, RepositoryState},
};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;
use uuid::Uuid;

/// In-memory Repository used to exercise the real router and handlers
/// without a database. Uniqueness is enforced the same way the Postgres
/// implementation surfaces it: a typed DuplicateUser error.
#[derive(Default)]
struct InMemoryRepository {
    users: Mutex<Vec<UserAuthRow>>,
    items: Mutex<Vec<Item>>,
    vouchers: Mutex<Vec<Voucher>>,
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn list_vouchers(&self) -> AppResult<Vec<Voucher>> {
        Ok(self.vouchers.lock().unwrap().clone())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAuthRow>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(UserAuthRow::into_user))
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == username || u.email == email) {
            return Err(AppError::DuplicateUser);
        }
        let row = UserAuthRow {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            role: ROLE_CUSTOMER.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(row.clone());
        Ok(row.into_user())
    }
}

fn app_with(repo: Arc<InMemoryRepository>) -> axum::Router {
    let state = AppState {
        repo: repo as RepositoryState,
        config: AppConfig::default(),
    };
    create_router(state)
}

fn app() -> axum::Router {
    app_with(Arc::new(InMemoryRepository::default()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// --- Health ---

#[tokio::test]
async fn test_health_check() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// --- Catalog ---

#[tokio::test]
async fn test_list_items_empty_catalog() {
    let response = app().oneshot(get("/items/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_items_returns_all_fields_with_fixed_precision_price() {
    let repo = Arc::new(InMemoryRepository::default());
    repo.items.lock().unwrap().extend([
        Item {
            id: 1,
            name: "Mug".to_string(),
            description: "A ceramic mug".to_string(),
            price: Decimal::new(1999, 2),
            image_url: Some("https://cdn.example.com/mug.png".to_string()),
        },
        Item {
            id: 2,
            name: "Sticker".to_string(),
            description: "Vinyl sticker".to_string(),
            price: Decimal::new(150, 2),
            image_url: None,
        },
    ]);

    let response = app_with(repo).oneshot(get("/items/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);

    // Every field present, price rendered as a fixed-precision string.
    assert_eq!(list[0]["id"], 1);
    assert_eq!(list[0]["name"], "Mug");
    assert_eq!(list[0]["description"], "A ceramic mug");
    assert_eq!(list[0]["price"], "19.99");
    assert_eq!(list[0]["image_url"], "https://cdn.example.com/mug.png");
    assert_eq!(list[1]["price"], "1.50");
    assert!(list[1]["image_url"].is_null());
}

#[tokio::test]
async fn test_list_vouchers() {
    let repo = Arc::new(InMemoryRepository::default());
    repo.vouchers.lock().unwrap().push(Voucher {
        code: "WELCOME10".to_string(),
        discount_percent: Decimal::new(1000, 2),
    });

    let response = app_with(repo).oneshot(get("/vouchers/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body[0]["code"], "WELCOME10");
    assert_eq!(body[0]["discount_percent"], "10.00");
}

// --- Registration & Login ---

#[tokio::test]
async fn test_register_then_login_then_me() {
    let repo = Arc::new(InMemoryRepository::default());
    let app = app_with(repo);

    // Register
    let response = app
        .clone()
        .oneshot(json_post(
            "/register/",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "pw123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered = body_json(response).await;
    assert_eq!(registered["username"], "alice");
    assert_eq!(registered["email"], "alice@example.com");
    assert_eq!(registered["role"], "Customer");

    // Login
    let response = app
        .clone()
        .oneshot(json_post(
            "/login/",
            serde_json::json!({ "username": "alice", "password": "pw123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = response
        .headers()
        .get("x-session-token")
        .expect("login must establish a session")
        .to_str()
        .unwrap()
        .to_string();
    let logged_in = body_json(response).await;
    assert_eq!(logged_in["id"], registered["id"]);
    assert_eq!(logged_in["role"], "Customer");

    // The session token works as a Bearer token on the session-bound route.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/me/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_fail_identically() {
    let repo = Arc::new(InMemoryRepository::default());
    let app = app_with(repo);

    app.clone()
        .oneshot(json_post(
            "/register/",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "pw123"
            }),
        ))
        .await
        .unwrap();

    // Wrong password.
    let wrong_pw = app
        .clone()
        .oneshot(json_post(
            "/login/",
            serde_json::json!({ "username": "alice", "password": "wrongpw" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_pw.status(), StatusCode::BAD_REQUEST);
    assert!(wrong_pw.headers().get("x-session-token").is_none());
    let wrong_pw_body = body_json(wrong_pw).await;

    // Unknown username must be indistinguishable.
    let unknown = app
        .oneshot(json_post(
            "/login/",
            serde_json::json!({ "username": "doesnotexist", "password": "anything" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    let unknown_body = body_json(unknown).await;

    assert_eq!(wrong_pw_body, unknown_body);
    assert_eq!(wrong_pw_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_register_duplicate_username_is_conflict_and_creates_no_record() {
    let repo = Arc::new(InMemoryRepository::default());
    let app = app_with(repo.clone());

    let first = app
        .clone()
        .oneshot(json_post(
            "/register/",
            serde_json::json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "pw123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_post(
            "/register/",
            serde_json::json!({
                "username": "bob",
                "email": "other@example.com",
                "password": "pw456"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The store retains exactly one record for that username.
    let users = repo.users.lock().unwrap();
    assert_eq!(users.iter().filter(|u| u.username == "bob").count(), 1);
}

#[tokio::test]
async fn test_register_rejects_invalid_payloads() {
    let cases = [
        serde_json::json!({ "username": "", "email": "a@example.com", "password": "pw" }),
        serde_json::json!({ "username": "a", "email": "not-an-email", "password": "pw" }),
        serde_json::json!({ "username": "a", "email": "a@example.com", "password": "" }),
    ];
    for payload in cases {
        let response = app()
            .oneshot(json_post("/register/", payload.clone()))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "payload should be rejected: {payload}"
        );
    }
}

#[tokio::test]
async fn test_no_response_ever_contains_the_password() {
    let repo = Arc::new(InMemoryRepository::default());
    let app = app_with(repo);

    let register = app
        .clone()
        .oneshot(json_post(
            "/register/",
            serde_json::json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "hunter2"
            }),
        ))
        .await
        .unwrap();
    let register_bytes = axum::body::to_bytes(register.into_body(), usize::MAX)
        .await
        .unwrap();
    let register_text = String::from_utf8(register_bytes.to_vec()).unwrap();
    assert!(!register_text.contains("hunter2"));
    assert!(!register_text.contains("password"));

    let login = app
        .oneshot(json_post(
            "/login/",
            serde_json::json!({ "username": "carol", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    let login_bytes = axum::body::to_bytes(login.into_body(), usize::MAX)
        .await
        .unwrap();
    let login_text = String::from_utf8(login_bytes.to_vec()).unwrap();
    assert!(!login_text.contains("hunter2"));
    assert!(!login_text.contains("password"));
}

// --- Session-bound route ---

#[tokio::test]
async fn test_me_without_session_is_unauthorized() {
    let response = app().oneshot(get("/me/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_garbage_token_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/me/")
                .header("Authorization", "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_dev_bypass_resolves_known_user() {
    let repo = Arc::new(InMemoryRepository::default());
    let user = repo
        .create_user("dev", "dev@example.com", "irrelevant-hash")
        .await
        .unwrap();
    let app = app_with(repo);

    // AppConfig::default() runs in Local, so the x-user-id header stands in
    // for a session as long as the id maps to a real account.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/me/")
                .header("x-user-id", user.id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["username"], "dev");
}
