use std::path::{Path, PathBuf};

use foodgram_api::{
    config::AppConfig,
    db::{DbPool, create_pool, orm_from_pool, run_migrations},
    middleware::auth::ROLE_ADMIN,
    services::auth_service::hash_password,
};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_INGREDIENTS_FILE: &str = "data/ingredients.json";

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

/// Usage: `seed [path/to/ingredients.json]`. Falls back to `SEED_INGREDIENTS`, then `data/ingredients.json`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&orm_from_pool(pool.clone())).await?;

    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());
    let admin_id = ensure_admin(&pool, &admin_email, &admin_password).await?;

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SEED_INGREDIENTS").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INGREDIENTS_FILE));
    let (inserted, skipped) = seed_ingredients(&pool, &path).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, ingredients inserted: {inserted}, already present: {skipped}"
    );
    Ok(())
}

async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let username = email.split('@').next().unwrap_or("admin");

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, username, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured admin {email}");
    Ok(user_id)
}

async fn seed_ingredients(pool: &DbPool, path: &Path) -> anyhow::Result<(usize, usize)> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
    let records: Vec<IngredientRecord> = serde_json::from_str(&raw)?;

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for record in &records {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, measurement_unit)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.name.trim())
        .bind(record.measurement_unit.trim())
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected() as usize;
    }
    tx.commit().await?;

    Ok((inserted, records.len() - inserted))
}
