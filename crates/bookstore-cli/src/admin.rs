use anyhow::{Context, bail};
use chrono::Utc;
use sqlx::PgPool;

use bookstore_core::hash_password;
use bookstore_models::{Role, UserId};

pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub age: i32,
}

/// Inserts an `ADMIN` user after checking the username and email are free.
pub async fn create_admin(db: &PgPool, account: &AdminAccount) -> anyhow::Result<UserId> {
    if account.password.len() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let mut tx = db.begin().await?;

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(&account.username)
    .bind(&account.email)
    .fetch_one(&mut *tx)
    .await?;

    if taken {
        bail!("A user with that username or email already exists");
    }

    let password_hash = hash_password(&account.password).map_err(|err| err.error)?;

    let id: UserId = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, address, age, customer_id, role) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(&account.username)
    .bind(&account.email)
    .bind(password_hash)
    .bind(&account.address)
    .bind(account.age)
    .bind(format!("CUST{}", Utc::now().timestamp_millis()))
    .bind(Role::Admin)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to insert admin user")?;

    tx.commit().await?;
    Ok(id)
}
