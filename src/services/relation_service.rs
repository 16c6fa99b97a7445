//! Add/remove state machine shared by favorites, shopping carts and subscriptions.
//!
//! Every relation is a unique `(actor, target)` edge. The unique constraint on the
//! edge table is the only source of truth for "already exists": `add` inserts with
//! `ON CONFLICT DO NOTHING` and reports a conflict when no row comes back, so two
//! racing `add` calls produce exactly one row.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Favorite,
    ShoppingCart,
    Subscription,
}

impl RelationKind {
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_carts",
            RelationKind::Subscription => "subscriptions",
        }
    }

    pub fn actor_column(self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "user_id",
            RelationKind::Subscription => "follower_id",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipe_id",
            RelationKind::Subscription => "author_id",
        }
    }

    pub fn target_table(self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipes",
            RelationKind::Subscription => "users",
        }
    }

    /// Name of the target entity used in `NotFound` errors.
    pub fn target_name(self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipe",
            RelationKind::Subscription => "author",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorite",
            RelationKind::ShoppingCart => "shopping cart entry",
            RelationKind::Subscription => "subscription",
        }
    }
}

/// The relations whose target is a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeRelation {
    Favorite,
    ShoppingCart,
}

impl From<RecipeRelation> for RelationKind {
    fn from(relation: RecipeRelation) -> Self {
        match relation {
            RecipeRelation::Favorite => RelationKind::Favorite,
            RecipeRelation::ShoppingCart => RelationKind::ShoppingCart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Add,
    Remove,
}

/// Checks that do not need the store.
pub fn validate_edge(kind: RelationKind, actor: Uuid, target: Uuid) -> AppResult<()> {
    if kind == RelationKind::Subscription && actor == target {
        return Err(AppError::invalid("cannot subscribe to yourself"));
    }
    Ok(())
}

pub async fn count(pool: &DbPool, kind: RelationKind, actor: Uuid, target: Uuid) -> AppResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = $1 AND {} = $2",
        kind.table(),
        kind.actor_column(),
        kind.target_column()
    );
    let total: i64 = sqlx::query_scalar(&sql)
        .bind(actor)
        .bind(target)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

async fn target_exists(pool: &DbPool, kind: RelationKind, target: Uuid) -> AppResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        kind.target_table()
    );
    let present: bool = sqlx::query_scalar(&sql).bind(target).fetch_one(pool).await?;
    Ok(present)
}

/// ABSENT -> PRESENT. Fails with `Conflict` when the edge is already present.
pub async fn add(pool: &DbPool, kind: RelationKind, actor: Uuid, target: Uuid) -> AppResult<()> {
    validate_edge(kind, actor, target)?;

    if !target_exists(pool, kind, target).await? {
        return Err(AppError::not_found(kind.target_name()));
    }

    let sql = format!(
        r#"
        INSERT INTO {table} (id, {actor}, {target})
        VALUES ($1, $2, $3)
        ON CONFLICT ({actor}, {target}) DO NOTHING
        RETURNING id
        "#,
        table = kind.table(),
        actor = kind.actor_column(),
        target = kind.target_column(),
    );
    let inserted: Option<Uuid> = sqlx::query_scalar(&sql)
        .bind(Uuid::new_v4())
        .bind(actor)
        .bind(target)
        .fetch_optional(pool)
        .await
        .map_err(|err| match err.as_database_error() {
            // the target vanished between the existence check and the insert
            Some(db) if db.is_foreign_key_violation() => AppError::not_found(kind.target_name()),
            _ => AppError::from(err),
        })?;

    if inserted.is_none() {
        return Err(AppError::conflict(format!("{} already exists", kind.label())));
    }

    tracing::info!(relation = kind.label(), %actor, %target, "relation added");
    Ok(())
}

/// PRESENT -> ABSENT. Removing an absent edge is a `NotFound` error.
pub async fn remove(pool: &DbPool, kind: RelationKind, actor: Uuid, target: Uuid) -> AppResult<()> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = $2",
        kind.table(),
        kind.actor_column(),
        kind.target_column()
    );
    let result = sqlx::query(&sql)
        .bind(actor)
        .bind(target)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(kind.label()));
    }

    tracing::info!(relation = kind.label(), %actor, %target, "relation removed");
    Ok(())
}

pub async fn apply(
    pool: &DbPool,
    kind: RelationKind,
    action: ToggleAction,
    actor: Uuid,
    target: Uuid,
) -> AppResult<()> {
    match action {
        ToggleAction::Add => add(pool, kind, actor, target).await,
        ToggleAction::Remove => remove(pool, kind, actor, target).await,
    }
}
