//! Validation and replacement planning for a recipe's ingredient and tag attachments.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    dto::recipes::{CreateRecipeRequest, IngredientAmount, UpdateRecipeRequest},
    entity::{recipe_ingredients, recipe_tags},
    error::{AppError, AppResult},
};

pub const MAX_RECIPE_NAME_LEN: usize = 200;

/// Returns the trimmed name.
pub fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }
    if name.chars().count() > MAX_RECIPE_NAME_LEN {
        return Err(AppError::invalid(format!(
            "name must be at most {MAX_RECIPE_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn validate_cooking_time(minutes: i32) -> AppResult<()> {
    if minutes <= 0 {
        return Err(AppError::invalid("cooking_time must be a positive number of minutes"));
    }
    Ok(())
}

pub fn validate_ingredients(items: &[IngredientAmount]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::invalid("a recipe needs at least one ingredient"));
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.amount <= 0 {
            return Err(AppError::invalid(format!(
                "amount for ingredient {} must be positive",
                item.id
            )));
        }
        if !seen.insert(item.id) {
            return Err(AppError::invalid(format!("ingredient {} is listed twice", item.id)));
        }
    }
    Ok(())
}

pub fn validate_tags(tags: &[Uuid]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        if !seen.insert(*tag) {
            return Err(AppError::invalid(format!("tag {tag} is listed twice")));
        }
    }
    Ok(())
}

pub fn validate_create(req: &CreateRecipeRequest) -> AppResult<()> {
    validate_name(&req.name)?;
    validate_cooking_time(req.cooking_time)?;
    validate_ingredients(&req.ingredients)?;
    validate_tags(&req.tags)
}

pub fn validate_update(req: &UpdateRecipeRequest) -> AppResult<()> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(minutes) = req.cooking_time {
        validate_cooking_time(minutes)?;
    }
    if let Some(items) = &req.ingredients {
        validate_ingredients(items)?;
    }
    if let Some(tags) = &req.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

/// First requested id (in request order) that the catalog lookup did not return.
pub fn first_missing(requested: impl IntoIterator<Item = Uuid>, found: &HashSet<Uuid>) -> Option<Uuid> {
    requested.into_iter().find(|id| !found.contains(id))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngredientSyncPlan {
    /// Join row ids to delete.
    pub remove: Vec<Uuid>,
    /// `(join row id, new amount)` for ingredients kept with a different amount.
    pub update: Vec<(Uuid, i32)>,
    pub insert: Vec<IngredientAmount>,
}

impl IngredientSyncPlan {
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// Diff stored join rows against the desired set. Unchanged rows keep their identity.
pub fn plan_ingredient_sync(
    existing: &[recipe_ingredients::Model],
    desired: &[IngredientAmount],
) -> IngredientSyncPlan {
    let wanted: HashMap<Uuid, i32> = desired.iter().map(|i| (i.id, i.amount)).collect();
    let stored: HashSet<Uuid> = existing.iter().map(|row| row.ingredient_id).collect();

    let mut plan = IngredientSyncPlan::default();
    for row in existing {
        match wanted.get(&row.ingredient_id) {
            None => plan.remove.push(row.id),
            Some(&amount) if amount != row.amount => plan.update.push((row.id, amount)),
            Some(_) => {}
        }
    }
    plan.insert = desired
        .iter()
        .filter(|item| !stored.contains(&item.id))
        .copied()
        .collect();
    plan
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagSyncPlan {
    /// Join row ids to delete.
    pub remove: Vec<Uuid>,
    /// Tag ids to attach.
    pub insert: Vec<Uuid>,
}

pub fn plan_tag_sync(existing: &[recipe_tags::Model], desired: &[Uuid]) -> TagSyncPlan {
    let wanted: HashSet<Uuid> = desired.iter().copied().collect();
    let stored: HashSet<Uuid> = existing.iter().map(|row| row.tag_id).collect();

    TagSyncPlan {
        remove: existing
            .iter()
            .filter(|row| !wanted.contains(&row.tag_id))
            .map(|row| row.id)
            .collect(),
        insert: desired
            .iter()
            .filter(|tag| !stored.contains(tag))
            .copied()
            .collect(),
    }
}
