use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Role values permitted on a user record. Registration always writes
// `Customer`; the database CHECK constraint is the final arbiter.
pub const ROLE_CUSTOMER: &str = "Customer";
pub const ROLE_ADMIN: &str = "Admin";

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The public representation of a user account, as stored in the `users`
/// table. This struct intentionally has no credential field: queries that
/// produce it never select `password_hash`, so it can be serialized into any
/// response without leaking secrets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // Unique login identifier.
    pub username: String,
    // Unique contact address.
    pub email: String,
    // 'Customer' or 'Admin'. Present on every account but not used to gate
    // any endpoint in this service.
    pub role: String,
}

/// UserAuthRow
///
/// Raw database row (internal use) carrying the bcrypt credential alongside
/// the public fields. Only the login path reads this shape, and it is never
/// serialized; `into_user` strips the hash before anything leaves the
/// repository boundary.
#[derive(Debug, Clone, FromRow)]
pub struct UserAuthRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

impl UserAuthRow {
    /// Drops the credential, leaving the response-safe representation.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            role: self.role,
        }
    }
}

/// Item
///
/// A catalog entry from the `items` table. The catalog is populated by an
/// external process; this service only lists it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    // NUMERIC(10,2) in the database. Decimal keeps the two fractional digits
    // exact and serializes as a fixed-precision string (e.g. "19.99").
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Voucher
///
/// A discount code from the `vouchers` table. The internal serial id that
/// preserves insertion order is not part of this representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Voucher {
    pub code: String,
    #[schema(value_type = String, example = "15.00")]
    pub discount_percent: Decimal,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /login/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RegisterRequest
///
/// Input payload for POST /register/. The password only ever exists in
/// plaintext inside this request; it is hashed before it reaches the
/// repository and is never logged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// validate
    ///
    /// Field-level checks that run before any business logic: all three
    /// fields must be non-empty and the email must look like an address.
    /// Uniqueness is deliberately not checked here; that is the storage
    /// layer's job.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("email is not a valid address".to_string());
        }
        Ok(())
    }
}
