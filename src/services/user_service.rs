use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait,
};
use uuid::Uuid;

use crate::{
    dto::users::{SubscriptionList, UserList},
    entity::{
        recipes::{self, Entity as Recipes},
        subscriptions::{self, Entity as Subscriptions},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::{AuthorWithRecipes, UserProfile},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SubscriptionQuery},
    services::{
        recipe_service::recipe_short_from_entity,
        relation_service::{self, RelationKind, ToggleAction},
    },
    state::AppState,
};

pub fn profile_from_entity(model: users::Model, is_subscribed: bool) -> UserProfile {
    UserProfile {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        is_subscribed,
    }
}

/// The subset of `author_ids` that `actor` follows. Empty for anonymous actors.
pub async fn followed_among<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    author_ids: &[Uuid],
) -> AppResult<HashSet<Uuid>> {
    let Some(actor) = actor else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let followed = Subscriptions::find()
        .filter(subscriptions::Column::FollowerId.eq(actor))
        .filter(subscriptions::Column::AuthorId.is_in(author_ids.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| s.author_id)
        .collect();
    Ok(followed)
}

pub async fn list_users(
    state: &AppState,
    actor: &MaybeAuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Users::find().order_by_asc(users::Column::Username);
    let total = finder.clone().count(&state.orm).await? as i64;

    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let followed = followed_among(&state.orm, actor.user_id(), &ids).await?;

    let items = users
        .into_iter()
        .map(|u| {
            let subscribed = followed.contains(&u.id);
            profile_from_entity(u, subscribed)
        })
        .collect();
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(
    state: &AppState,
    actor: &MaybeAuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserProfile>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    let subscribed = followed_among(&state.orm, actor.user_id(), &[id])
        .await?
        .contains(&id);
    Ok(ApiResponse::success(
        "User",
        profile_from_entity(user, subscribed),
        None,
    ))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let me = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    Ok(ApiResponse::success("Me", profile_from_entity(me, false), None))
}

fn validate_recipes_limit(recipes_limit: Option<i64>) -> AppResult<Option<usize>> {
    match recipes_limit {
        None => Ok(None),
        Some(n) if n < 0 => Err(AppError::invalid("recipes_limit must not be negative")),
        Some(n) => Ok(Some(n as usize)),
    }
}

async fn authors_with_recipes<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    authors: Vec<users::Model>,
    recipes_limit: Option<usize>,
) -> AppResult<Vec<AuthorWithRecipes>> {
    let ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_author: HashMap<Uuid, Vec<recipes::Model>> = HashMap::new();
    for recipe in Recipes::find()
        .filter(recipes::Column::AuthorId.is_in(ids.clone()))
        .order_by_desc(recipes::Column::PubDate)
        .all(conn)
        .await?
    {
        by_author.entry(recipe.author_id).or_default().push(recipe);
    }
    let followed = followed_among(conn, actor, &ids).await?;

    Ok(authors
        .into_iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as i64;
            let shown = recipes_limit.unwrap_or(recipes.len());
            let subscribed = followed.contains(&author.id);
            AuthorWithRecipes {
                profile: profile_from_entity(author, subscribed),
                recipes: recipes
                    .into_iter()
                    .take(shown)
                    .map(recipe_short_from_entity)
                    .collect(),
                recipes_count,
            }
        })
        .collect())
}

pub async fn list_subscriptions(
    state: &AppState,
    user: &AuthUser,
    query: SubscriptionQuery,
) -> AppResult<ApiResponse<SubscriptionList>> {
    let recipes_limit = validate_recipes_limit(query.recipes_limit)?;
    let (page, limit, offset) = query.pagination().normalize();

    let followed_ids = Subscriptions::find()
        .select_only()
        .column(subscriptions::Column::AuthorId)
        .filter(subscriptions::Column::FollowerId.eq(user.user_id))
        .into_query();
    let finder = Users::find()
        .filter(users::Column::Id.in_subquery(followed_ids))
        .order_by_asc(users::Column::Username);

    let total = finder.clone().count(&state.orm).await? as i64;
    let authors = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items =
        authors_with_recipes(&state.orm, Some(user.user_id), authors, recipes_limit).await?;
    Ok(ApiResponse::success(
        "Subscriptions",
        SubscriptionList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Subscribe or unsubscribe. Returns the author card on subscribe, nothing on unsubscribe.
pub async fn toggle_subscription(
    state: &AppState,
    action: ToggleAction,
    user: &AuthUser,
    author_id: Uuid,
    recipes_limit: Option<i64>,
) -> AppResult<Option<AuthorWithRecipes>> {
    let recipes_limit = validate_recipes_limit(recipes_limit)?;
    relation_service::apply(
        &state.pool,
        RelationKind::Subscription,
        action,
        user.user_id,
        author_id,
    )
    .await?;
    if action == ToggleAction::Remove {
        return Ok(None);
    }

    let author = Users::find_by_id(author_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("author"))?;
    let view = authors_with_recipes(&state.orm, Some(user.user_id), vec![author], recipes_limit)
        .await?
        .pop();
    Ok(view)
}
