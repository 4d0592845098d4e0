use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::database::Store;
use crate::{categories, expenses};

pub fn app(store: Store) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/categories",
            get(categories::get_categories).post(categories::create_category),
        )
        .route("/categories/options", get(categories::get_category_options))
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/expenses",
            get(expenses::get_expenses).post(expenses::create_expense),
        )
        .route(
            "/expenses/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .layer(cors)
        .with_state(store)
}

pub async fn health(State(store): State<Store>) -> Result<&'static str, (StatusCode, String)> {
    store.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Database unavailable".to_string(),
        )
    })?;
    Ok("ok")
}
