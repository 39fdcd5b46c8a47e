//! Admin CRUD routes. All of them sit behind [`crate::api::auth::require_admin`].

use crate::api::error::ApiError;
use crate::api::payload::{
    JsonBody, OfferRequest, PathParam, ProductRequest, SellerPatchRequest, SellerRequest,
};
use crate::api::AppState;
use crate::catalog::{AdminOffer, Seller};
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn positive_id(id: i64) -> Result<i64, ApiError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(ApiError::Validation("Bad id".to_string()))
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProductRequest>,
) -> Result<Json<Value>, ApiError> {
    let product = body.validate()?;
    let id = state.store.create_product(&product, Utc::now()).await?;

    info!("Created product {} ({})", product.slug, id);
    Ok(Json(json!({ "id": id })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    let id = positive_id(id)?;
    if !state.store.delete_product(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Deleted product {} and its offers", id);
    Ok(ok())
}

pub async fn create_seller(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SellerRequest>,
) -> Result<Json<Value>, ApiError> {
    let seller = body.validate()?;
    let id = state.store.create_seller(&seller).await?;

    info!("Created seller {} ({})", seller.name, id);
    Ok(Json(json!({ "id": id })))
}

pub async fn list_sellers(State(state): State<AppState>) -> Result<Json<Vec<Seller>>, ApiError> {
    Ok(Json(state.store.list_sellers_by_trust().await?))
}

pub async fn update_seller(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<SellerPatchRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = positive_id(id)?;
    let changes = body.validate()?;

    if !state.store.update_seller(id, &changes).await? {
        return Err(ApiError::NotFound);
    }
    Ok(ok())
}

pub async fn delete_seller(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    let id = positive_id(id)?;
    if !state.store.delete_seller(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Deleted seller {} and its offers", id);
    Ok(ok())
}

/// Creates the offer for (product_id, seller_id) or refreshes the existing one.
pub async fn upsert_offer(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<OfferRequest>,
) -> Result<Json<Value>, ApiError> {
    let submission = body.into_submission()?;
    state.store.upsert_offer(&submission, Utc::now()).await?;
    Ok(ok())
}

pub async fn list_offers(State(state): State<AppState>) -> Result<Json<Vec<AdminOffer>>, ApiError> {
    Ok(Json(state.store.list_offers().await?))
}

pub async fn update_offer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<OfferRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = positive_id(id)?;
    if state.store.offer(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let terms = body.into_terms()?;
    if !state.store.update_offer(id, &terms, Utc::now()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(ok())
}

pub async fn delete_offer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    let id = positive_id(id)?;
    if !state.store.delete_offer(id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(ok())
}
