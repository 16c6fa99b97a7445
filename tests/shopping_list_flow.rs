use foodgram_api::{
    db::{create_pool, run_migrations},
    dto::recipes::{CreateRecipeRequest, IngredientAmount},
    error::AppError,
    entity::{ingredients::ActiveModel as IngredientActive, users::ActiveModel as UserActive},
    middleware::auth::{AuthUser, ROLE_USER},
    services::{
        recipe_service,
        relation_service::ToggleAction,
        shopping_list_service::{SHOPPING_LIST_BANNER, build_shopping_list, export_shopping_list},
    },
    state::{AppState, AuthSettings},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: two recipes in the cart collapse into one line per (ingredient, unit).
#[tokio::test]
async fn shopping_list_aggregates_cart_recipes() -> anyhow::Result<()> {
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
    let cook = create_user(&state, "cook").await?;
    let shopper = create_user(&state, "shopper").await?;

    // Empty cart is an empty list, not an error
    assert!(build_shopping_list(&state.pool, &shopper).await?.is_empty());
    assert_eq!(
        export_shopping_list(&state.pool, &shopper).await?,
        format!("{SHOPPING_LIST_BANNER}\n\n")
    );

    let flour = ingredient(&state, "flour", "g").await?;
    let sugar = ingredient(&state, "sugar", "g").await?;
    let egg = ingredient(&state, "egg", "pcs").await?;

    let r1 = recipe(
        &state,
        &cook,
        "Shortbread",
        vec![
            IngredientAmount { id: flour, amount: 200 },
            IngredientAmount { id: sugar, amount: 50 },
        ],
    )
    .await?;
    let r2 = recipe(
        &state,
        &cook,
        "Pasta dough",
        vec![
            IngredientAmount { id: flour, amount: 100 },
            IngredientAmount { id: egg, amount: 2 },
        ],
    )
    .await?;

    for id in [r1, r2] {
        recipe_service::toggle_shopping_cart(&state, ToggleAction::Add, &shopper, id).await?;
    }

    // A recipe sits in the cart at most once
    let again =
        recipe_service::toggle_shopping_cart(&state, ToggleAction::Add, &shopper, r1).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let lines: Vec<(String, i64, String)> = build_shopping_list(&state.pool, &shopper)
        .await?
        .into_iter()
        .map(|i| (i.name, i.total_amount, i.measurement_unit))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("egg".to_string(), 2, "pcs".to_string()),
            ("flour".to_string(), 300, "g".to_string()),
            ("sugar".to_string(), 50, "g".to_string()),
        ]
    );

    let text = export_shopping_list(&state.pool, &shopper).await?;
    assert_eq!(
        text,
        format!("{SHOPPING_LIST_BANNER}\n\n* egg: 2 pcs\n* flour: 300 g\n* sugar: 50 g\n")
    );

    // Other users' carts do not leak in
    assert!(build_shopping_list(&state.pool, &cook).await?.is_empty());

    recipe_service::toggle_shopping_cart(&state, ToggleAction::Remove, &shopper, r2).await?;
    let lines: Vec<(String, i64)> = build_shopping_list(&state.pool, &shopper)
        .await?
        .into_iter()
        .map(|i| (i.name, i.total_amount))
        .collect();
    assert_eq!(lines, vec![("flour".to_string(), 200), ("sugar".to_string(), 50)]);

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

async fn create_user(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set("dummy".into()),
        role: Set(ROLE_USER.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

async fn ingredient(state: &AppState, name: &str, unit: &str) -> anyhow::Result<Uuid> {
    let created = IngredientActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        measurement_unit: Set(unit.to_string()),
    }
    .insert(&state.orm)
    .await?;
    Ok(created.id)
}

async fn recipe(
    state: &AppState,
    author: &AuthUser,
    name: &str,
    ingredients: Vec<IngredientAmount>,
) -> anyhow::Result<Uuid> {
    let created = recipe_service::create_recipe(
        state,
        author,
        CreateRecipeRequest {
            name: name.into(),
            image: String::new(),
            text: "Knead".into(),
            cooking_time: 20,
            ingredients,
            tags: vec![],
        },
    )
    .await?;
    Ok(created.into_data().expect("recipe").id)
}
