//! Data models for products, sellers, and offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product, addressed publicly by its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A seller and how much it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Seller {
    pub id: i64,
    pub name: String,
    pub is_authorised: bool,
    pub base_url: String,
    pub score: i64,
    pub notes: String,
}

/// One seller's offer for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: i64,
    pub product_id: i64,
    pub seller_id: i64,
    /// Price in currency subunits
    pub price_inr: i64,
    pub warranty_type: String,
    pub return_days: i64,
    pub product_url: String,
    pub last_checked_at: DateTime<Utc>,
}

/// An offer joined with its seller's trust fields, as shown on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OfferListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub offer: Offer,
    pub seller_name: String,
    pub is_authorised: bool,
    pub seller_score: i64,
}

/// An offer joined with product and seller names, for the admin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminOffer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub offer: Offer,
    pub product_name: String,
    pub product_slug: String,
    pub seller_name: String,
}

/// A product page: the product and its ranked offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub offers: Vec<OfferListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSeller {
    pub name: String,
    pub is_authorised: bool,
    pub base_url: String,
    pub score: i64,
    pub notes: String,
}

impl NewSeller {
    /// Default trust score for sellers created without one.
    pub const DEFAULT_SCORE: i64 = 50;
}

/// Partial update of a seller's adjustable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerChanges {
    pub is_authorised: Option<bool>,
    pub score: Option<i64>,
    pub notes: Option<String>,
}

impl SellerChanges {
    pub fn is_empty(&self) -> bool {
        self.is_authorised.is_none() && self.score.is_none() && self.notes.is_none()
    }
}

/// An offer submission, keyed by (product_id, seller_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSubmission {
    pub product_id: i64,
    pub seller_id: i64,
    pub terms: OfferTerms,
}

/// The mutable part of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTerms {
    pub price_inr: i64,
    pub warranty_type: String,
    pub return_days: i64,
    pub product_url: String,
}
