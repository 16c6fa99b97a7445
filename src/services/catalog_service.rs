use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CreateIngredientRequest, CreateTagRequest, IngredientList, TagList},
    entity::{
        ingredients::{self, Entity as Ingredients},
        recipe_ingredients::{self, Entity as RecipeIngredients},
        tags::{self, Entity as Tags},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Ingredient, Tag},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_TAG_FIELD_LEN: usize = 64;
const MAX_INGREDIENT_NAME_LEN: usize = 200;
const MAX_UNIT_LEN: usize = 16;

pub fn tag_from_entity(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

pub fn ingredient_from_entity(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

fn bounded(field: &str, value: &str, max: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::invalid(format!("{field} must be at most {max} characters")));
    }
    Ok(value.to_string())
}

/// `#RRGGBB`, stored upper-case so uniqueness ignores hex digit case.
pub fn normalize_color(color: &str) -> AppResult<String> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(AppError::invalid("color must be a hex code like #E26C2D"));
    }
    Ok(color.to_ascii_uppercase())
}

pub fn validate_slug(slug: &str) -> AppResult<String> {
    let slug = bounded("slug", slug, MAX_TAG_FIELD_LEN)?;
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::invalid(
            "slug may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(slug)
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_prefix(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 1);
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_tags(state: &AppState) -> AppResult<ApiResponse<TagList>> {
    let items = Tags::find()
        .order_by_asc(tags::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();
    Ok(ApiResponse::success("Tags", TagList { items }, None))
}

pub async fn get_tag(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Tag>> {
    let tag = Tags::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("tag"))?;
    Ok(ApiResponse::success("Tag", tag_from_entity(tag), None))
}

pub async fn create_tag(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    ensure_admin(user)?;
    let name = bounded("name", &payload.name, MAX_TAG_FIELD_LEN)?;
    let color = normalize_color(&payload.color)?;
    let slug = validate_slug(&payload.slug)?;

    let tag = tags::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        color: Set(color),
        slug: Set(slug),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(tag_id = %tag.id, slug = %tag.slug, "tag created");
    Ok(ApiResponse::success(
        "Tag created",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

pub async fn delete_tag(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<()> {
    ensure_admin(user)?;
    let result = Tags::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("tag"));
    }
    tracing::info!(tag_id = %id, "tag deleted");
    Ok(())
}

pub async fn list_ingredients(
    state: &AppState,
    name: Option<&str>,
) -> AppResult<ApiResponse<IngredientList>> {
    let mut finder = Ingredients::find();
    if let Some(prefix) = name.map(str::trim).filter(|s| !s.is_empty()) {
        finder = finder.filter(Expr::col(ingredients::Column::Name).ilike(like_prefix(prefix)));
    }

    let items = finder
        .order_by_asc(ingredients::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ingredient_from_entity)
        .collect();
    Ok(ApiResponse::success("Ingredients", IngredientList { items }, None))
}

pub async fn get_ingredient(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Ingredient>> {
    let ingredient = Ingredients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("ingredient"))?;
    Ok(ApiResponse::success(
        "Ingredient",
        ingredient_from_entity(ingredient),
        None,
    ))
}

pub async fn create_ingredient(
    state: &AppState,
    user: &AuthUser,
    payload: CreateIngredientRequest,
) -> AppResult<ApiResponse<Ingredient>> {
    ensure_admin(user)?;
    let name = bounded("name", &payload.name, MAX_INGREDIENT_NAME_LEN)?;
    let unit = bounded("measurement_unit", &payload.measurement_unit, MAX_UNIT_LEN)?;

    let ingredient = ingredients::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        measurement_unit: Set(unit),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(ingredient_id = %ingredient.id, name = %ingredient.name, "ingredient created");
    Ok(ApiResponse::success(
        "Ingredient created",
        ingredient_from_entity(ingredient),
        Some(Meta::empty()),
    ))
}

/// Refused while any recipe still references the ingredient.
pub async fn delete_ingredient(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<()> {
    ensure_admin(user)?;
    if Ingredients::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::not_found("ingredient"));
    }

    let references = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::IngredientId.eq(id))
        .count(&state.orm)
        .await?;
    if references > 0 {
        return Err(AppError::conflict(format!(
            "ingredient is used by {references} recipe(s)"
        )));
    }

    let result = Ingredients::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| match err.sql_err() {
            // a recipe attached it after the reference count
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::conflict("ingredient is used by a recipe")
            }
            _ => AppError::from(err),
        })?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("ingredient"));
    }
    tracing::info!(ingredient_id = %id, "ingredient deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_must_be_hex() {
        assert_eq!(normalize_color("#e26c2d").ok().as_deref(), Some("#E26C2D"));
        assert!(normalize_color("e26c2d").is_err());
        assert!(normalize_color("#e26c2").is_err());
        assert!(normalize_color("#g26c2d").is_err());
    }

    #[test]
    fn slug_charset() {
        assert_eq!(validate_slug(" breakfast ").ok().as_deref(), Some("breakfast"));
        assert!(validate_slug("late-night_snack2").is_ok());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("sug"), "sug%");
        assert_eq!(like_prefix("100%_"), "100\\%\\_%");
    }
}
