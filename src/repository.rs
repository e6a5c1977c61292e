use crate::{
    error::{AppError, AppResult},
    models::{Item, ROLE_CUSTOMER, User, UserAuthRow, Voucher},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers to interact with the data layer without knowing the concrete
/// implementation (Postgres in production, an in-memory stub in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Catalog (read-only) ---
    /// All items in insertion order. An empty catalog is an empty Vec.
    async fn list_items(&self) -> AppResult<Vec<Item>>;
    /// All vouchers in insertion order.
    async fn list_vouchers(&self) -> AppResult<Vec<Voucher>>;

    // --- Accounts ---
    /// Looks up the full credential row for login verification. `None` means
    /// the username is unknown; callers must not surface that distinction.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAuthRow>>;
    /// Public user representation by id, used by the session extractor.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    /// Inserts a new account with role 'Customer'. The password must already
    /// be hashed. Fails with `AppError::DuplicateUser` when the username or
    /// email is already taken.
    async fn create_user(&self, username: &str, email: &str, password_hash: &str)
    -> AppResult<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_items
    ///
    /// Ordering by the serial primary key gives the insertion order the
    /// listing contract promises.
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, price, image_url FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// list_vouchers
    ///
    /// The serial id exists only for ordering; it is not selected.
    async fn list_vouchers(&self) -> AppResult<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(
            "SELECT code, discount_percent FROM vouchers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vouchers)
    }

    /// find_user_by_username
    ///
    /// The only query that selects `password_hash`. The row never leaves the
    /// login path.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserAuthRow>> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            "SELECT id, username, email, role, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// find_user
    ///
    /// Retrieves the public user representation needed by the session
    /// extractor. A `None` here means the account was deleted after the
    /// session token was issued.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Uniqueness of username and email is enforced by the database
    /// constraints; a unique violation is translated into the typed
    /// `DuplicateUser` error so the handler can answer with a clean 409
    /// instead of a generic storage failure.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let id = Uuid::new_v4();
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, role
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(ROLE_CUSTOMER)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateUser)
            }
            Err(e) => Err(e.into()),
        }
    }
}
