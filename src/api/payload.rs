//! Request bodies and their validation into catalog types.
//!
//! Bodies deserialize leniently (every field optional) so that a missing
//! field is reported by name instead of as a serde failure.

use crate::api::error::ApiError;
use crate::catalog::{NewProduct, NewSeller, OfferSubmission, OfferTerms, SellerChanges};
use axum::extract::{FromRequest, FromRequestParts};
use serde::Deserialize;
use serde_json::Value;

/// JSON body extractor whose rejections become [`ApiError`]s.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path extractor whose rejections become [`ApiError`]s.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Boolean flag that also accepts 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn as_bool(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SellerRequest {
    pub name: Option<String>,
    pub is_authorised: Option<Flag>,
    pub base_url: Option<String>,
    pub score: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SellerPatchRequest {
    pub is_authorised: Option<Flag>,
    pub score: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferRequest {
    pub product_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub price_inr: Option<Value>,
    pub warranty_type: Option<String>,
    pub return_days: Option<i64>,
    pub product_url: Option<String>,
}

/// Tracks which required fields are absent or blank.
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn text(&mut self, name: &'static str, value: Option<String>) -> String {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn id(&mut self, name: &'static str, value: Option<i64>) -> i64 {
        match value.filter(|v| *v > 0) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                0
            }
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing(&self.missing))
        }
    }
}

/// A price must be a positive JSON integer; floats and strings are rejected.
fn price(value: Option<Value>) -> Result<Option<i64>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(p) if p > 0 => Ok(Some(p)),
            _ => Err(ApiError::Validation("price_inr must be a positive integer".to_string())),
        },
        Some(_) => Err(ApiError::Validation("price_inr must be a positive integer".to_string())),
    }
}

fn return_days(value: Option<i64>) -> Result<i64, ApiError> {
    match value.unwrap_or(0) {
        d if d < 0 => Err(ApiError::Validation("return_days must not be negative".to_string())),
        d => Ok(d),
    }
}

impl ProductRequest {
    pub fn validate(self) -> Result<NewProduct, ApiError> {
        let mut req = Required::default();
        let product = NewProduct {
            slug: req.text("slug", self.slug),
            name: req.text("name", self.name),
            category: req.text("category", self.category),
            image_url: req.text("image_url", self.image_url),
        };
        req.finish()?;

        if !product.slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ApiError::Validation(
                "slug may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }

        Ok(product)
    }
}

impl SellerRequest {
    pub fn validate(self) -> Result<NewSeller, ApiError> {
        let mut req = Required::default();
        let name = req.text("name", self.name);
        let base_url = req.text("base_url", self.base_url);
        req.finish()?;

        Ok(NewSeller {
            name,
            is_authorised: self.is_authorised.is_some_and(Flag::as_bool),
            base_url,
            score: self.score.unwrap_or(NewSeller::DEFAULT_SCORE),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl SellerPatchRequest {
    pub fn validate(self) -> Result<SellerChanges, ApiError> {
        let changes = SellerChanges {
            is_authorised: self.is_authorised.map(Flag::as_bool),
            score: self.score,
            notes: self.notes,
        };

        if changes.is_empty() {
            return Err(ApiError::Validation(
                "Nothing to update: send is_authorised, score or notes".to_string(),
            ));
        }

        Ok(changes)
    }
}

impl OfferRequest {
    /// Validates an upsert submission.
    pub fn into_submission(self) -> Result<OfferSubmission, ApiError> {
        let price_inr = price(self.price_inr)?;

        let mut req = Required::default();
        let product_id = req.id("product_id", self.product_id);
        let seller_id = req.id("seller_id", self.seller_id);
        if price_inr.is_none() {
            req.missing.push("price_inr");
        }
        let warranty_type = req.text("warranty_type", self.warranty_type);
        let product_url = req.text("product_url", self.product_url);
        req.finish()?;

        Ok(OfferSubmission {
            product_id,
            seller_id,
            terms: OfferTerms {
                price_inr: price_inr.unwrap_or_default(),
                warranty_type,
                return_days: return_days(self.return_days)?,
                product_url,
            },
        })
    }

    /// Validates an edit of an existing offer; ids in the body are ignored.
    pub fn into_terms(self) -> Result<OfferTerms, ApiError> {
        let price_inr = price(self.price_inr)?;

        let mut req = Required::default();
        if price_inr.is_none() {
            req.missing.push("price_inr");
        }
        let warranty_type = req.text("warranty_type", self.warranty_type);
        let product_url = req.text("product_url", self.product_url);
        req.finish()?;

        Ok(OfferTerms {
            price_inr: price_inr.unwrap_or_default(),
            warranty_type,
            return_days: return_days(self.return_days)?,
            product_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer(body: Value) -> OfferRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_product_missing_fields_named() {
        let req: ProductRequest =
            serde_json::from_value(json!({ "slug": "x", "name": " " })).unwrap();
        let err = req.validate().unwrap_err().to_string();
        assert_eq!(err, "Missing required fields: name, category, image_url");
    }

    #[test]
    fn test_product_slug_must_be_url_safe() {
        let req: ProductRequest = serde_json::from_value(json!({
            "slug": "iphone 15", "name": "iPhone", "category": "phones", "image_url": "/i.png"
        }))
        .unwrap();
        assert!(req.validate().unwrap_err().to_string().contains("slug"));
    }

    #[test]
    fn test_seller_defaults() {
        let req: SellerRequest =
            serde_json::from_value(json!({ "name": "Imagine", "base_url": "https://imagine.test" }))
                .unwrap();
        let seller = req.validate().unwrap();
        assert!(!seller.is_authorised);
        assert_eq!(seller.score, 50);
        assert_eq!(seller.notes, "");
    }

    #[test]
    fn test_seller_flag_accepts_int() {
        let req: SellerRequest = serde_json::from_value(
            json!({ "name": "Imagine", "base_url": "https://imagine.test", "is_authorised": 1 }),
        )
        .unwrap();
        assert!(req.validate().unwrap().is_authorised);
    }

    #[test]
    fn test_seller_patch_requires_something() {
        let req: SellerPatchRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.validate().is_err());

        let req: SellerPatchRequest = serde_json::from_value(json!({ "score": 75 })).unwrap();
        assert_eq!(req.validate().unwrap().score, Some(75));
    }

    #[test]
    fn test_offer_submission() {
        let sub = offer(json!({
            "product_id": 1, "seller_id": 2, "price_inr": 70000,
            "warranty_type": "Brand warranty", "product_url": "https://s.test/p"
        }))
        .into_submission()
        .unwrap();

        assert_eq!(sub.product_id, 1);
        assert_eq!(sub.seller_id, 2);
        assert_eq!(sub.terms.price_inr, 70000);
        assert_eq!(sub.terms.return_days, 0);
    }

    #[test]
    fn test_offer_price_must_be_integer() {
        for bad in [json!(69999.5), json!("70000"), json!(0), json!(-5)] {
            let err = offer(json!({
                "product_id": 1, "seller_id": 2, "price_inr": bad,
                "warranty_type": "w", "product_url": "u"
            }))
            .into_submission()
            .unwrap_err();
            assert!(err.to_string().contains("positive integer"), "accepted {}", bad);
        }
    }

    #[test]
    fn test_offer_missing_fields_named() {
        let err = offer(json!({ "seller_id": 2 })).into_submission().unwrap_err().to_string();
        assert_eq!(
            err,
            "Missing required fields: product_id, price_inr, warranty_type, product_url"
        );
    }

    #[test]
    fn test_offer_negative_return_days() {
        let err = offer(json!({
            "price_inr": 70000, "warranty_type": "w", "product_url": "u", "return_days": -1
        }))
        .into_terms()
        .unwrap_err();
        assert!(err.to_string().contains("return_days"));
    }

    #[test]
    fn test_offer_terms() {
        let terms = offer(json!({
            "price_inr": 65000, "warranty_type": "Seller warranty",
            "product_url": "https://s.test/p", "return_days": 10
        }))
        .into_terms()
        .unwrap();
        assert_eq!(terms.price_inr, 65000);
        assert_eq!(terms.return_days, 10);
    }
}
