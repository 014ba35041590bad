//! Authentication test helpers.

use sqlx::PgPool;
use uuid::Uuid;

use lumen_notes::auth::sessions::create_token;
use lumen_notes::auth::users::create_user;

/// A registered user plus a valid bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

/// Create a user directly in the database and mint a token for them.
pub async fn create_test_user(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<TestUser, Box<dyn std::error::Error>> {
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let email = format!("{username}@example.com");
    let user = create_user(pool, username.to_string(), email, password_hash).await?;
    let token = create_token(user.id, user.username.clone())?;

    Ok(TestUser {
        id: user.id,
        username: user.username,
        token,
    })
}

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}
