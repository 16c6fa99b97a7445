use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, SetPasswordRequest},
        catalog::{CreateIngredientRequest, CreateTagRequest, IngredientList, TagList},
        recipes::{
            CreateRecipeRequest, IngredientAmount, RecipeList, ShoppingList, UpdateRecipeRequest,
        },
        users::{SubscriptionList, UserList},
    },
    models::{
        AuthorWithRecipes, Ingredient, Recipe, RecipeIngredient, RecipeShort, ShoppingListItem,
        Tag, UserProfile,
    },
    response::{ApiResponse, Meta},
    routes::{auth, health, ingredients, params, recipes, tags, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::list_users,
        users::get_user,
        users::me,
        users::set_password,
        users::list_subscriptions,
        users::subscribe,
        users::unsubscribe,
        tags::list_tags,
        tags::get_tag,
        tags::create_tag,
        tags::delete_tag,
        ingredients::list_ingredients,
        ingredients::get_ingredient,
        ingredients::create_ingredient,
        ingredients::delete_ingredient,
        recipes::list_recipes,
        recipes::get_recipe,
        recipes::create_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::add_favorite,
        recipes::remove_favorite,
        recipes::add_to_shopping_cart,
        recipes::remove_from_shopping_cart,
        recipes::shopping_list,
        recipes::download_shopping_cart
    ),
    components(
        schemas(
            UserProfile,
            Tag,
            Ingredient,
            Recipe,
            RecipeIngredient,
            RecipeShort,
            AuthorWithRecipes,
            ShoppingListItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            SetPasswordRequest,
            CreateTagRequest,
            CreateIngredientRequest,
            CreateRecipeRequest,
            UpdateRecipeRequest,
            IngredientAmount,
            TagList,
            IngredientList,
            RecipeList,
            ShoppingList,
            UserList,
            SubscriptionList,
            params::Pagination,
            params::RecipeQuery,
            params::IngredientQuery,
            params::SubscriptionQuery,
            params::RecipesLimitQuery,
            health::HealthData,
            Meta,
            ApiResponse<Recipe>,
            ApiResponse<RecipeList>,
            ApiResponse<RecipeShort>,
            ApiResponse<AuthorWithRecipes>,
            ApiResponse<SubscriptionList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profiles and subscriptions"),
        (name = "Tags", description = "Tag catalog"),
        (name = "Ingredients", description = "Ingredient catalog"),
        (name = "Recipes", description = "Recipes, favorites and shopping cart"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
