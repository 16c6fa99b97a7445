use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{AuthorWithRecipes, UserProfile};

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserProfile>)]
    pub items: Vec<UserProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SubscriptionList {
    #[schema(value_type = Vec<AuthorWithRecipes>)]
    pub items: Vec<AuthorWithRecipes>,
}
