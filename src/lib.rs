//! price-compare - price comparison service for electronics listings
//!
//! Scrapes store product pages for a confident price, keeps one offer per
//! product and seller, and serves ranked offers over a small REST API.

pub mod amazon;
pub mod api;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod extract;
pub mod format;

pub use catalog::{Offer, OfferListing, Product, ProductDetail, Seller, Store};
pub use config::Config;
pub use extract::{Extractor, PriceBand};
