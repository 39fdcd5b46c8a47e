//! Storefront routes and admin login.

use crate::api::auth::AuthError;
use crate::api::error::ApiError;
use crate::api::payload::{JsonBody, LoginRequest, PathParam};
use crate::api::AppState;
use crate::catalog::{Product, ProductDetail, Seller};
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    match state.auth.login(&username, &password) {
        Ok(token) => {
            info!("Admin logged in");
            Ok(Json(json!({ "token": token })))
        }
        Err(AuthError::InvalidCredentials) => Err(ApiError::Unauthorized("Invalid")),
        Err(e) => Err(ApiError::Internal(e.into())),
    }
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.list_products().await?))
}

pub async fn product_detail(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    state.store.product_detail(&slug).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn list_sellers(State(state): State<AppState>) -> Result<Json<Vec<Seller>>, ApiError> {
    Ok(Json(state.store.list_sellers().await?))
}
