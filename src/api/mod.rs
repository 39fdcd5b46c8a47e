//! REST API: public storefront, admin CRUD, and token login.

pub mod admin;
pub mod auth;
pub mod error;
pub mod payload;
pub mod public;

use crate::catalog::Store;
use axum::routing::{get, patch, post, put};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use auth::{hash_password, AdminAuth, AuthError, Claims};
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: Arc<AdminAuth>,
}

impl AppState {
    pub fn new(store: Store, auth: AdminAuth) -> Self {
        Self { store, auth: Arc::new(auth) }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/products", post(admin::create_product))
        .route("/products/:id", axum::routing::delete(admin::delete_product))
        .route("/sellers", get(admin::list_sellers).post(admin::create_seller))
        .route("/sellers/:id", patch(admin::update_seller).delete(admin::delete_seller))
        .route("/offers", get(admin::list_offers).post(admin::upsert_offer))
        .route("/offers/:id", put(admin::update_offer).delete(admin::delete_offer))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/auth/login", post(public::login))
        .route("/products", get(public::list_products))
        .route("/products/:slug", get(public::product_detail))
        .route("/sellers", get(public::list_sellers))
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
