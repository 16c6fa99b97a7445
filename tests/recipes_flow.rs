use std::collections::BTreeSet;

use foodgram_api::{
    db::{create_pool, run_migrations},
    dto::{
        catalog::{CreateIngredientRequest, CreateTagRequest},
        recipes::{CreateRecipeRequest, IngredientAmount, UpdateRecipeRequest},
    },
    entity::{
        favorites::{self, Entity as Favorites},
        recipe_ingredients::{self, Entity as RecipeIngredients},
        recipe_tags::{self, Entity as RecipeTags},
        recipes::{self, Entity as Recipes},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::{AuthUser, MaybeAuthUser, ROLE_ADMIN, ROLE_USER},
    routes::params::Pagination,
    services::{
        catalog_service,
        recipe_service::{self, RecipeFilters},
        relation_service::{self, RelationKind, ToggleAction},
        user_service,
    },
    state::{AppState, AuthSettings},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    Statement,
};
use uuid::Uuid;

// Integration flow: catalog -> atomic create -> replacement update -> toggles -> author-only mutation.
#[tokio::test]
async fn recipe_composition_and_relation_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = create_user(&state, ROLE_ADMIN, "chef").await?;
    let alice = create_user(&state, ROLE_USER, "alice").await?;
    let bob = create_user(&state, ROLE_USER, "bob").await?;

    // Catalog
    let flour = ingredient(&state, &admin, "Flour", "g").await?;
    let sugar = ingredient(&state, &admin, "Sugar", "g").await?;
    let egg = ingredient(&state, &admin, "Egg", "pcs").await?;
    let breakfast = tag(&state, &admin, "Breakfast", "#E26C2D", "breakfast").await?;
    let dinner = tag(&state, &admin, "Dinner", "#49B64E", "dinner").await?;

    let not_admin = catalog_service::create_tag(
        &state,
        &alice,
        CreateTagRequest {
            name: "Lunch".into(),
            color: "#8775D2".into(),
            slug: "lunch".into(),
        },
    )
    .await;
    assert!(matches!(not_admin, Err(AppError::Forbidden)));

    // Alice creates a recipe with 200 g of flour
    let created = recipe_service::create_recipe(
        &state,
        &alice,
        CreateRecipeRequest {
            name: "Flatbread".into(),
            image: String::new(),
            text: "Mix and bake".into(),
            cooking_time: 30,
            ingredients: vec![IngredientAmount { id: flour, amount: 200 }],
            tags: vec![breakfast],
        },
    )
    .await?
    .into_data()
    .expect("recipe");
    assert_eq!(created.author.id, alice.user_id);
    assert_eq!(created.ingredients.len(), 1);
    assert_eq!(created.ingredients[0].amount, 200);

    let row = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::RecipeId.eq(created.id))
        .filter(recipe_ingredients::Column::IngredientId.eq(flour))
        .one(&state.orm)
        .await?
        .expect("join row");
    assert_eq!(row.amount, 200);

    // Atomic composition: an unknown tag leaves nothing behind
    let recipes_before = Recipes::find().count(&state.orm).await?;
    let joins_before = RecipeIngredients::find().count(&state.orm).await?;
    let failed = recipe_service::create_recipe(
        &state,
        &alice,
        CreateRecipeRequest {
            name: "Ghost cake".into(),
            image: String::new(),
            text: "Never stored".into(),
            cooking_time: 10,
            ingredients: vec![IngredientAmount { id: sugar, amount: 50 }],
            tags: vec![Uuid::new_v4()],
        },
    )
    .await;
    assert!(matches!(failed, Err(AppError::NotFound(_))));
    let failed = recipe_service::create_recipe(
        &state,
        &alice,
        CreateRecipeRequest {
            name: "Ghost cake".into(),
            image: String::new(),
            text: "Never stored".into(),
            cooking_time: 10,
            ingredients: vec![
                IngredientAmount { id: sugar, amount: 50 },
                IngredientAmount { id: Uuid::new_v4(), amount: 1 },
            ],
            tags: vec![],
        },
    )
    .await;
    assert!(matches!(failed, Err(AppError::NotFound(_))));
    assert_eq!(Recipes::find().count(&state.orm).await?, recipes_before);
    assert_eq!(RecipeIngredients::find().count(&state.orm).await?, joins_before);
    assert!(
        Recipes::find()
            .filter(recipes::Column::Name.eq("Ghost cake"))
            .one(&state.orm)
            .await?
            .is_none()
    );

    // Duplicate recipe name is a conflict
    let duplicate = recipe_service::create_recipe(
        &state,
        &bob,
        CreateRecipeRequest {
            name: "Flatbread".into(),
            image: String::new(),
            text: "Copy".into(),
            cooking_time: 5,
            ingredients: vec![IngredientAmount { id: egg, amount: 1 }],
            tags: vec![],
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Replacement update: the stored sets become exactly the requested ones
    let updated = recipe_service::update_recipe(
        &state,
        &alice,
        created.id,
        UpdateRecipeRequest {
            cooking_time: Some(35),
            ingredients: Some(vec![
                IngredientAmount { id: flour, amount: 250 },
                IngredientAmount { id: egg, amount: 2 },
            ]),
            tags: Some(vec![dinner]),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("recipe");
    assert_eq!(updated.cooking_time, 35);
    assert_eq!(updated.name, "Flatbread");

    let stored: BTreeSet<(Uuid, i32)> = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::RecipeId.eq(created.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| (r.ingredient_id, r.amount))
        .collect();
    assert_eq!(stored, BTreeSet::from([(flour, 250), (egg, 2)]));

    let stored_tags: Vec<Uuid> = RecipeTags::find()
        .filter(recipe_tags::Column::RecipeId.eq(created.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|t| t.tag_id)
        .collect();
    assert_eq!(stored_tags, vec![dinner]);

    // A failed update leaves the previous sets untouched
    let failed = recipe_service::update_recipe(
        &state,
        &alice,
        created.id,
        UpdateRecipeRequest {
            ingredients: Some(vec![IngredientAmount { id: Uuid::new_v4(), amount: 1 }]),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(failed, Err(AppError::NotFound(_))));
    assert_eq!(
        RecipeIngredients::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(created.id))
            .count(&state.orm)
            .await?,
        2
    );

    // Author-only mutation
    let forbidden = recipe_service::update_recipe(
        &state,
        &bob,
        created.id,
        UpdateRecipeRequest {
            name: Some("Stolen".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));
    let forbidden = recipe_service::delete_recipe(&state, &bob, created.id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Favorite toggle boundary
    let short = recipe_service::toggle_favorite(&state, ToggleAction::Add, &bob, created.id)
        .await?
        .expect("compact view");
    assert_eq!(short.id, created.id);
    let again = recipe_service::toggle_favorite(&state, ToggleAction::Add, &bob, created.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(
        relation_service::count(&state.pool, RelationKind::Favorite, bob.user_id, created.id)
            .await?,
        1
    );

    let missing =
        recipe_service::toggle_favorite(&state, ToggleAction::Add, &bob, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Reads reflect the actor's relations
    let bob_actor = MaybeAuthUser::from(bob.clone());
    let seen = recipe_service::get_recipe(&state, &bob_actor, created.id)
        .await?
        .into_data()
        .expect("recipe");
    assert!(seen.is_favorited);
    assert!(!seen.is_in_shopping_cart);
    let anonymous = recipe_service::get_recipe(&state, &MaybeAuthUser::anonymous(), created.id)
        .await?
        .into_data()
        .expect("recipe");
    assert!(!anonymous.is_favorited);

    // Listing filters
    let second = recipe_service::create_recipe(
        &state,
        &bob,
        CreateRecipeRequest {
            name: "Omelette".into(),
            image: String::new(),
            text: "Whisk and fry".into(),
            cooking_time: 10,
            ingredients: vec![IngredientAmount { id: egg, amount: 3 }],
            tags: vec![breakfast],
        },
    )
    .await?
    .into_data()
    .expect("recipe");

    let all = recipe_service::list_recipes(
        &state,
        &bob_actor,
        RecipeFilters::default(),
        Pagination::new(1, 10),
    )
    .await?;
    assert_eq!(all.meta.as_ref().and_then(|m| m.total), Some(2));
    assert_eq!(all.into_data().expect("list").items[0].id, second.id);

    let favorited = recipe_service::list_recipes(
        &state,
        &bob_actor,
        RecipeFilters {
            favorited_only: true,
            ..Default::default()
        },
        Pagination::new(1, 10),
    )
    .await?
    .into_data()
    .expect("list");
    let ids: Vec<Uuid> = favorited.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![created.id]);

    let by_tag = recipe_service::list_recipes(
        &state,
        &MaybeAuthUser::anonymous(),
        RecipeFilters {
            tag_slugs: vec!["breakfast".into()],
            favorited_only: true,
            ..Default::default()
        },
        Pagination::new(1, 10),
    )
    .await?
    .into_data()
    .expect("list");
    let ids: Vec<Uuid> = by_tag.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id]);

    let by_author = recipe_service::list_recipes(
        &state,
        &MaybeAuthUser::anonymous(),
        RecipeFilters {
            author: Some(alice.user_id),
            ..Default::default()
        },
        Pagination::new(1, 10),
    )
    .await?
    .into_data()
    .expect("list");
    assert_eq!(by_author.items.len(), 1);
    assert_eq!(by_author.items[0].author.username, "alice");

    // Strict remove
    recipe_service::toggle_favorite(&state, ToggleAction::Remove, &bob, created.id).await?;
    let again =
        recipe_service::toggle_favorite(&state, ToggleAction::Remove, &bob, created.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
    assert_eq!(
        relation_service::count(&state.pool, RelationKind::Favorite, bob.user_id, created.id)
            .await?,
        0
    );

    // Subscriptions
    let selfish = user_service::toggle_subscription(
        &state,
        ToggleAction::Add,
        &alice,
        alice.user_id,
        None,
    )
    .await;
    assert!(matches!(selfish, Err(AppError::InvalidArgument(_))));

    let card = user_service::toggle_subscription(
        &state,
        ToggleAction::Add,
        &bob,
        alice.user_id,
        Some(0),
    )
    .await?
    .expect("author card");
    assert_eq!(card.recipes_count, 1);
    assert!(card.recipes.is_empty());
    assert!(card.profile.is_subscribed);

    let again = user_service::toggle_subscription(
        &state,
        ToggleAction::Add,
        &bob,
        alice.user_id,
        None,
    )
    .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let following = user_service::list_subscriptions(&state, &bob, Default::default())
        .await?
        .into_data()
        .expect("list");
    assert_eq!(following.items.len(), 1);
    assert_eq!(following.items[0].recipes.len(), 1);

    // Unsubscribe is strict too
    user_service::toggle_subscription(&state, ToggleAction::Remove, &bob, alice.user_id, None)
        .await?;
    let again = user_service::toggle_subscription(
        &state,
        ToggleAction::Remove,
        &bob,
        alice.user_id,
        None,
    )
    .await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
    assert_eq!(
        relation_service::count(
            &state.pool,
            RelationKind::Subscription,
            bob.user_id,
            alice.user_id
        )
        .await?,
        0
    );

    // Ingredients in use cannot be deleted
    let in_use = catalog_service::delete_ingredient(&state, &admin, flour).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    // Author deletes; dependents cascade, catalog stays
    recipe_service::toggle_favorite(&state, ToggleAction::Add, &bob, created.id).await?;
    recipe_service::delete_recipe(&state, &alice, created.id).await?;
    assert!(Recipes::find_by_id(created.id).one(&state.orm).await?.is_none());
    assert_eq!(
        RecipeIngredients::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(created.id))
            .count(&state.orm)
            .await?,
        0
    );
    assert_eq!(
        Favorites::find()
            .filter(favorites::Column::RecipeId.eq(created.id))
            .count(&state.orm)
            .await?,
        0
    );
    catalog_service::delete_ingredient(&state, &admin, flour).await?;
    let gone = recipe_service::delete_recipe(&state, &alice, created.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    let state = AppState::new(
        pool,
        AuthSettings {
            jwt_secret: "flow-test-secret".into(),
            token_ttl_hours: 1,
        },
    );
    run_migrations(&state.orm).await?;

    // Clean tables between runs
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE favorites, shopping_carts, subscriptions, recipe_tags, recipe_ingredients, recipes, tags, ingredients, users CASCADE",
        ))
        .await?;

    Ok(state)
}

async fn create_user(state: &AppState, role: &str, username: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

async fn ingredient(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    unit: &str,
) -> anyhow::Result<Uuid> {
    let created = catalog_service::create_ingredient(
        state,
        admin,
        CreateIngredientRequest {
            name: name.into(),
            measurement_unit: unit.into(),
        },
    )
    .await?;
    Ok(created.into_data().expect("ingredient").id)
}

async fn tag(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    color: &str,
    slug: &str,
) -> anyhow::Result<Uuid> {
    let created = catalog_service::create_tag(
        state,
        admin,
        CreateTagRequest {
            name: name.into(),
            color: color.into(),
            slug: slug.into(),
        },
    )
    .await?;
    Ok(created.into_data().expect("tag").id)
}
