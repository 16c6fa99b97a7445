use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use foodgram_api::{
    middleware::auth::ROLE_USER,
    routes,
    services::auth_service::issue_token,
    state::{AppState, AuthSettings},
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "guard-test-secret";

// The pool never connects: every request here must be answered before any query runs.
fn app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://nobody@127.0.0.1:1/unused")
        .expect("lazy pool");
    routes::app(AppState::new(pool, settings()))
}

fn settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: SECRET.into(),
        token_ttl_hours: 1,
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn mutations_without_token_are_unauthorized() {
    let recipe_id = Uuid::new_v4();
    let cases = [
        (Method::POST, "/api/recipes".to_string()),
        (Method::PATCH, format!("/api/recipes/{recipe_id}")),
        (Method::DELETE, format!("/api/recipes/{recipe_id}")),
        (Method::POST, format!("/api/recipes/{recipe_id}/favorite")),
        (Method::DELETE, format!("/api/recipes/{recipe_id}/shopping_cart")),
        (Method::GET, "/api/recipes/download_shopping_cart".to_string()),
        (Method::GET, "/api/users/me".to_string()),
        (Method::GET, "/api/users/subscriptions".to_string()),
        (Method::POST, format!("/api/users/{}/subscribe", Uuid::new_v4())),
    ];

    for (method, uri) in cases {
        let response = app()
            .oneshot(request(method.clone(), &uri, None, None))
            .await
            .expect("response");
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should require a token"
        );
    }
}

#[tokio::test]
async fn forged_token_is_rejected_even_on_public_reads() {
    let forged = issue_token(
        &AuthSettings {
            jwt_secret: "someone-else".into(),
            token_ttl_hours: 1,
        },
        Uuid::new_v4(),
        ROLE_USER,
    )
    .expect("token");

    let response = app()
        .oneshot(request(Method::GET, "/api/recipes", Some(&forged), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert!(body["data"]["error"].is_string());
}

#[tokio::test]
async fn self_subscription_is_rejected_before_touching_the_store() {
    let me = Uuid::new_v4();
    let token = issue_token(&settings(), me, ROLE_USER).expect("token");

    let response = app()
        .oneshot(request(
            Method::POST,
            &format!("/api/users/{me}/subscribe"),
            Some(&token),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_recipe_payload_is_rejected_before_touching_the_store() {
    let token = issue_token(&settings(), Uuid::new_v4(), ROLE_USER).expect("token");

    let no_ingredients = serde_json::json!({
        "name": "Toast",
        "text": "Toast the bread",
        "cooking_time": 3,
        "ingredients": []
    });
    let response = app()
        .oneshot(request(Method::POST, "/api/recipes", Some(&token), Some(no_ingredients)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let ingredient = Uuid::new_v4();
    let zero_amount = serde_json::json!({
        "name": "Toast",
        "text": "Toast the bread",
        "cooking_time": 3,
        "ingredients": [{ "id": ingredient, "amount": 0 }]
    });
    let response = app()
        .oneshot(request(Method::POST, "/api/recipes", Some(&token), Some(zero_amount)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_gets_json_404_with_request_id() {
    let response = app()
        .oneshot(request(Method::GET, "/api/nowhere", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(routes::REQUEST_ID_HEADER));

    let body = json_body(response).await;
    assert_eq!(body["data"]["path"], "/api/nowhere");
    assert_eq!(body["data"]["method"], "GET");
}
