//! Catalog of products, sellers, and their offers.

pub mod models;
pub mod ranking;
pub mod store;

pub use models::{
    AdminOffer, NewProduct, NewSeller, Offer, OfferListing, OfferSubmission, OfferTerms, Product,
    ProductDetail, Seller, SellerChanges,
};
pub use ranking::rank_offers;
pub use store::{Store, StoreError};
