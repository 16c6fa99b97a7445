use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::recipes::{CreateRecipeRequest, IngredientAmount, RecipeList, UpdateRecipeRequest},
    entity::{
        favorites::{self, Entity as Favorites},
        ingredients::{self, Entity as Ingredients},
        recipe_ingredients::{self, Entity as RecipeIngredients},
        recipe_tags::{self, Entity as RecipeTags},
        recipes::{self, Entity as Recipes},
        shopping_carts::{self, Entity as ShoppingCarts},
        tags::{self, Entity as Tags},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser, ensure_author},
    models::{Recipe, RecipeIngredient, RecipeShort, Tag},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, RecipeQuery},
    services::{
        catalog_service::tag_from_entity,
        composition::{self, first_missing, plan_ingredient_sync, plan_tag_sync},
        relation_service::{self, RecipeRelation, ToggleAction},
        user_service::{followed_among, profile_from_entity},
    },
    state::AppState,
};

/// Filters for [`list_recipes`]. Favorite/cart filters are ignored for anonymous actors.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    pub author: Option<Uuid>,
    pub tag_slugs: Vec<String>,
    pub favorited_only: bool,
    pub in_cart_only: bool,
}

impl From<&RecipeQuery> for RecipeFilters {
    fn from(query: &RecipeQuery) -> Self {
        Self {
            author: query.author,
            tag_slugs: query.tag_slugs(),
            favorited_only: query.is_favorited.unwrap_or(false),
            in_cart_only: query.is_in_shopping_cart.unwrap_or(false),
        }
    }
}

pub fn recipe_short_from_entity(model: recipes::Model) -> RecipeShort {
    RecipeShort {
        id: model.id,
        name: model.name,
        image: model.image,
        cooking_time: model.cooking_time,
    }
}

/// Every referenced ingredient and tag must exist; reports the first miss in request order.
async fn ensure_catalog_refs(
    txn: &DatabaseTransaction,
    ingredient_refs: &[IngredientAmount],
    tag_refs: &[Uuid],
) -> AppResult<()> {
    if !ingredient_refs.is_empty() {
        let requested: Vec<Uuid> = ingredient_refs.iter().map(|i| i.id).collect();
        let found: HashSet<Uuid> = Ingredients::find()
            .filter(ingredients::Column::Id.is_in(requested.clone()))
            .all(txn)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        if let Some(missing) = first_missing(requested, &found) {
            return Err(AppError::not_found(format!("ingredient {missing}")));
        }
    }

    if !tag_refs.is_empty() {
        let found: HashSet<Uuid> = Tags::find()
            .filter(tags::Column::Id.is_in(tag_refs.to_vec()))
            .all(txn)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if let Some(missing) = first_missing(tag_refs.iter().copied(), &found) {
            return Err(AppError::not_found(format!("tag {missing}")));
        }
    }
    Ok(())
}

async fn insert_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: Uuid,
    items: &[IngredientAmount],
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|item| recipe_ingredients::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipe_id: Set(recipe_id),
        ingredient_id: Set(item.id),
        amount: Set(item.amount),
    });
    RecipeIngredients::insert_many(rows).exec(txn).await?;
    Ok(())
}

async fn insert_tags(txn: &DatabaseTransaction, recipe_id: Uuid, tag_ids: &[Uuid]) -> AppResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows = tag_ids.iter().map(|tag_id| recipe_tags::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipe_id: Set(recipe_id),
        tag_id: Set(*tag_id),
    });
    RecipeTags::insert_many(rows).exec(txn).await?;
    Ok(())
}

async fn replace_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: Uuid,
    desired: &[IngredientAmount],
) -> AppResult<()> {
    let existing = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .all(txn)
        .await?;
    let plan = plan_ingredient_sync(&existing, desired);
    if plan.is_noop() {
        return Ok(());
    }

    if !plan.remove.is_empty() {
        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::Id.is_in(plan.remove.clone()))
            .exec(txn)
            .await?;
    }
    for (row_id, amount) in &plan.update {
        RecipeIngredients::update_many()
            .col_expr(recipe_ingredients::Column::Amount, Expr::value(*amount))
            .filter(recipe_ingredients::Column::Id.eq(*row_id))
            .exec(txn)
            .await?;
    }
    insert_ingredients(txn, recipe_id, &plan.insert).await
}

async fn replace_tags(txn: &DatabaseTransaction, recipe_id: Uuid, desired: &[Uuid]) -> AppResult<()> {
    let existing = RecipeTags::find()
        .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
        .all(txn)
        .await?;
    let plan = plan_tag_sync(&existing, desired);

    if !plan.remove.is_empty() {
        RecipeTags::delete_many()
            .filter(recipe_tags::Column::Id.is_in(plan.remove.clone()))
            .exec(txn)
            .await?;
    }
    insert_tags(txn, recipe_id, &plan.insert).await
}

pub async fn create_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    composition::validate_create(&payload)?;
    let name = composition::validate_name(&payload.name)?;

    // Dropping the transaction on any early return rolls everything back.
    let txn = state.orm.begin().await?;
    ensure_catalog_refs(&txn, &payload.ingredients, &payload.tags).await?;

    let recipe = recipes::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(user.user_id),
        name: Set(name),
        image: Set(payload.image),
        text: Set(payload.text),
        cooking_time: Set(payload.cooking_time),
        pub_date: NotSet,
    }
    .insert(&txn)
    .await?;

    insert_ingredients(&txn, recipe.id, &payload.ingredients).await?;
    insert_tags(&txn, recipe.id, &payload.tags).await?;
    txn.commit().await?;

    tracing::info!(
        recipe_id = %recipe.id,
        author_id = %user.user_id,
        ingredients = payload.ingredients.len(),
        tags = payload.tags.len(),
        "recipe created"
    );

    let view = hydrate_one(&state.orm, Some(user.user_id), recipe).await?;
    Ok(ApiResponse::success("Recipe created", view, Some(Meta::empty())))
}

pub async fn update_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    composition::validate_update(&payload)?;

    let txn = state.orm.begin().await?;
    let existing = Recipes::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("recipe"))?;
    ensure_author(user, &existing)?;

    ensure_catalog_refs(
        &txn,
        payload.ingredients.as_deref().unwrap_or_default(),
        payload.tags.as_deref().unwrap_or_default(),
    )
    .await?;

    let mut active: recipes::ActiveModel = existing.clone().into();
    if let Some(name) = payload.name.as_deref() {
        active.name = Set(composition::validate_name(name)?);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    if let Some(cooking_time) = payload.cooking_time {
        active.cooking_time = Set(cooking_time);
    }
    let recipe = if active.is_changed() {
        active.update(&txn).await?
    } else {
        existing
    };

    if let Some(items) = &payload.ingredients {
        replace_ingredients(&txn, recipe.id, items).await?;
    }
    if let Some(tag_ids) = &payload.tags {
        replace_tags(&txn, recipe.id, tag_ids).await?;
    }
    txn.commit().await?;

    tracing::info!(recipe_id = %recipe.id, author_id = %user.user_id, "recipe updated");

    let view = hydrate_one(&state.orm, Some(user.user_id), recipe).await?;
    Ok(ApiResponse::success("Updated", view, Some(Meta::empty())))
}

/// Join rows, favorites and cart entries cascade with the recipe; catalog rows stay.
pub async fn delete_recipe(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let existing = Recipes::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("recipe"))?;
    ensure_author(user, &existing)?;

    Recipes::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(recipe_id = %id, author_id = %user.user_id, "recipe deleted");
    Ok(())
}

pub async fn get_recipe(
    state: &AppState,
    actor: &MaybeAuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Recipe>> {
    let recipe = Recipes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("recipe"))?;
    let view = hydrate_one(&state.orm, actor.user_id(), recipe).await?;
    Ok(ApiResponse::success("Recipe", view, None))
}

pub async fn list_recipes(
    state: &AppState,
    actor: &MaybeAuthUser,
    filters: RecipeFilters,
    pagination: Pagination,
) -> AppResult<ApiResponse<RecipeList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(author) = filters.author {
        condition = condition.add(recipes::Column::AuthorId.eq(author));
    }

    if !filters.tag_slugs.is_empty() {
        let tagged = RecipeTags::find()
            .select_only()
            .column(recipe_tags::Column::RecipeId)
            .inner_join(Tags)
            .filter(tags::Column::Slug.is_in(filters.tag_slugs.clone()))
            .into_query();
        condition = condition.add(recipes::Column::Id.in_subquery(tagged));
    }

    if let Some(actor_id) = actor.user_id() {
        if filters.favorited_only {
            let favorited = Favorites::find()
                .select_only()
                .column(favorites::Column::RecipeId)
                .filter(favorites::Column::UserId.eq(actor_id))
                .into_query();
            condition = condition.add(recipes::Column::Id.in_subquery(favorited));
        }
        if filters.in_cart_only {
            let in_cart = ShoppingCarts::find()
                .select_only()
                .column(shopping_carts::Column::RecipeId)
                .filter(shopping_carts::Column::UserId.eq(actor_id))
                .into_query();
            condition = condition.add(recipes::Column::Id.in_subquery(in_cart));
        }
    }

    let finder = Recipes::find()
        .filter(condition)
        .order_by_desc(recipes::Column::PubDate)
        .order_by_asc(recipes::Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let page_rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    tracing::debug!(?filters, total, "listing recipes");
    let items = hydrate(&state.orm, actor.user_id(), page_rows).await?;
    Ok(ApiResponse::success(
        "Recipes",
        RecipeList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn hydrate_one<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    recipe: recipes::Model,
) -> AppResult<Recipe> {
    hydrate(conn, actor, vec![recipe])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("recipe view could not be built")))
}

/// Builds full recipe views with a fixed number of batched queries.
pub async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    recipes: Vec<recipes::Model>,
) -> AppResult<Vec<Recipe>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, _> = Users::find()
        .filter(crate::entity::users::Column::Id.is_in(author_ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let followed = followed_among(conn, actor, &author_ids).await?;

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (row, tag) in RecipeTags::find()
        .filter(recipe_tags::Column::RecipeId.is_in(ids.clone()))
        .find_also_related(Tags)
        .all(conn)
        .await?
    {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(tag_from_entity(tag));
        }
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
    for (row, ingredient) in RecipeIngredients::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(ids.clone()))
        .find_also_related(Ingredients)
        .all(conn)
        .await?
    {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: row.amount,
                });
        }
    }

    let (favorited, in_cart) = match actor {
        Some(actor_id) => {
            let favorited: HashSet<Uuid> = Favorites::find()
                .filter(favorites::Column::UserId.eq(actor_id))
                .filter(favorites::Column::RecipeId.is_in(ids.clone()))
                .all(conn)
                .await?
                .into_iter()
                .map(|f| f.recipe_id)
                .collect();
            let in_cart: HashSet<Uuid> = ShoppingCarts::find()
                .filter(shopping_carts::Column::UserId.eq(actor_id))
                .filter(shopping_carts::Column::RecipeId.is_in(ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|c| c.recipe_id)
                .collect();
            (favorited, in_cart)
        }
        None => (HashSet::new(), HashSet::new()),
    };

    recipes
        .into_iter()
        .map(|recipe| {
            let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("recipe {} has no author", recipe.id))
            })?;
            let mut tags = tags_by_recipe.remove(&recipe.id).unwrap_or_default();
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            let mut ingredients = ingredients_by_recipe.remove(&recipe.id).unwrap_or_default();
            ingredients.sort_by(|a, b| a.name.cmp(&b.name));

            Ok(Recipe {
                id: recipe.id,
                author: profile_from_entity(author, followed.contains(&recipe.author_id)),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
                pub_date: recipe.pub_date.with_timezone(&Utc),
                tags,
                ingredients,
            })
        })
        .collect()
}

/// Favorite or cart toggle. Returns the compact recipe view on add, nothing on remove.
pub async fn toggle_recipe_relation(
    state: &AppState,
    relation: RecipeRelation,
    action: ToggleAction,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<Option<RecipeShort>> {
    relation_service::apply(&state.pool, relation.into(), action, user.user_id, recipe_id).await?;

    match action {
        ToggleAction::Remove => Ok(None),
        ToggleAction::Add => {
            let recipe = Recipes::find_by_id(recipe_id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::not_found("recipe"))?;
            Ok(Some(recipe_short_from_entity(recipe)))
        }
    }
}

pub async fn toggle_favorite(
    state: &AppState,
    action: ToggleAction,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<Option<RecipeShort>> {
    toggle_recipe_relation(state, RecipeRelation::Favorite, action, user, recipe_id).await
}

pub async fn toggle_shopping_cart(
    state: &AppState,
    action: ToggleAction,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<Option<RecipeShort>> {
    toggle_recipe_relation(state, RecipeRelation::ShoppingCart, action, user, recipe_id).await
}
