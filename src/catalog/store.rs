//! SQLite persistence for the catalog.

use crate::catalog::models::{
    AdminOffer, NewProduct, NewSeller, Offer, OfferListing, OfferSubmission, OfferTerms, Product,
    ProductDetail, Seller, SellerChanges,
};
use crate::catalog::ranking::rank_offers;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Bootstrap DDL; safe to run on every start.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    image_url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sellers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    is_authorised INTEGER NOT NULL DEFAULT 0,
    base_url TEXT NOT NULL,
    score INTEGER NOT NULL DEFAULT 50,
    notes TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS offers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL,
    seller_id INTEGER NOT NULL,
    price_inr INTEGER NOT NULL CHECK (price_inr > 0),
    warranty_type TEXT NOT NULL,
    return_days INTEGER NOT NULL DEFAULT 0 CHECK (return_days >= 0),
    product_url TEXT NOT NULL,
    last_checked_at TEXT NOT NULL,
    FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE,
    FOREIGN KEY (seller_id) REFERENCES sellers(id) ON DELETE CASCADE,
    UNIQUE (product_id, seller_id)
);
"#;

const OFFER_COLUMNS: &str = "o.id, o.product_id, o.seller_id, o.price_inr, o.warranty_type, \
                             o.return_days, o.product_url, o.last_checked_at";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("Referenced product or seller does not exist")]
    MissingReference,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Sorts constraint violations out of a raw database error.
    fn classify(err: sqlx::Error, duplicate: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Duplicate(duplicate);
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingReference;
            }
        }
        StoreError::Database(err)
    }
}

/// Catalog store over a SQLite pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options =
            SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;

        info!("Connected to {}", url);
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        debug!("Schema ready");
        Ok(Self { pool })
    }

    // --- products ---

    /// Lists products, newest first.
    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT id, slug, name, category, image_url, created_at \
             FROM products ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, Product>(
            "SELECT id, slug, name, category, image_url, created_at FROM products WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Returns a product with its offers ranked for display.
    pub async fn product_detail(&self, slug: &str) -> Result<Option<ProductDetail>, StoreError> {
        let Some(product) = self.product_by_slug(slug).await? else {
            return Ok(None);
        };

        let offers = self.offers_for_product(product.id).await?;
        Ok(Some(ProductDetail { product, offers }))
    }

    pub async fn create_product(
        &self,
        product: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO products (slug, name, category, image_url, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::classify(e, "Slug"))?;

        Ok(result.last_insert_rowid())
    }

    /// Deletes a product and, through the foreign key, all of its offers.
    pub async fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- sellers ---

    /// Lists sellers by name.
    pub async fn list_sellers(&self) -> Result<Vec<Seller>, StoreError> {
        let rows = sqlx::query_as::<_, Seller>(
            "SELECT id, name, is_authorised, base_url, score, notes FROM sellers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lists sellers authorised first, then by descending score.
    pub async fn list_sellers_by_trust(&self) -> Result<Vec<Seller>, StoreError> {
        let rows = sqlx::query_as::<_, Seller>(
            "SELECT id, name, is_authorised, base_url, score, notes FROM sellers \
             ORDER BY is_authorised DESC, score DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn seller_by_name(&self, name: &str) -> Result<Option<Seller>, StoreError> {
        let row = sqlx::query_as::<_, Seller>(
            "SELECT id, name, is_authorised, base_url, score, notes FROM sellers WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create_seller(&self, seller: &NewSeller) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO sellers (name, is_authorised, base_url, score, notes) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&seller.name)
        .bind(seller.is_authorised)
        .bind(&seller.base_url)
        .bind(seller.score)
        .bind(&seller.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::classify(e, "Seller"))?;

        Ok(result.last_insert_rowid())
    }

    /// Applies the given changes; absent fields keep their value.
    pub async fn update_seller(
        &self,
        id: i64,
        changes: &SellerChanges,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE sellers SET \
                is_authorised = COALESCE(?, is_authorised), \
                score = COALESCE(?, score), \
                notes = COALESCE(?, notes) \
             WHERE id = ?",
        )
        .bind(changes.is_authorised)
        .bind(changes.score)
        .bind(changes.notes.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a seller and, through the foreign key, all of its offers.
    pub async fn delete_seller(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sellers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- offers ---

    /// Offers for one product joined with seller trust, ranked for display.
    pub async fn offers_for_product(
        &self,
        product_id: i64,
    ) -> Result<Vec<OfferListing>, StoreError> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS}, \
                s.name AS seller_name, s.is_authorised, s.score AS seller_score \
             FROM offers o JOIN sellers s ON s.id = o.seller_id \
             WHERE o.product_id = ? ORDER BY o.id ASC"
        );

        let mut offers = sqlx::query_as::<_, OfferListing>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        rank_offers(&mut offers);
        Ok(offers)
    }

    /// Inserts the offer for (product_id, seller_id), or overwrites its terms.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE` statement, so concurrent
    /// submissions for one pair always end up as one row.
    pub async fn upsert_offer(
        &self,
        submission: &OfferSubmission,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let terms = &submission.terms;

        sqlx::query(
            "INSERT INTO offers \
                (product_id, seller_id, price_inr, warranty_type, return_days, \
                 product_url, last_checked_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (product_id, seller_id) DO UPDATE SET \
                price_inr = excluded.price_inr, \
                warranty_type = excluded.warranty_type, \
                return_days = excluded.return_days, \
                product_url = excluded.product_url, \
                last_checked_at = excluded.last_checked_at",
        )
        .bind(submission.product_id)
        .bind(submission.seller_id)
        .bind(terms.price_inr)
        .bind(&terms.warranty_type)
        .bind(terms.return_days)
        .bind(&terms.product_url)
        .bind(checked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::classify(e, "Offer"))?;

        debug!(
            "Upserted offer product={} seller={} price={}",
            submission.product_id, submission.seller_id, terms.price_inr
        );
        Ok(())
    }

    pub async fn offer(&self, id: i64) -> Result<Option<Offer>, StoreError> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers o WHERE o.id = ?");
        let row = sqlx::query_as::<_, Offer>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /// All offers with product and seller names, most recently checked first.
    pub async fn list_offers(&self) -> Result<Vec<AdminOffer>, StoreError> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS}, \
                p.name AS product_name, p.slug AS product_slug, s.name AS seller_name \
             FROM offers o \
             JOIN products p ON p.id = o.product_id \
             JOIN sellers s ON s.id = o.seller_id \
             ORDER BY o.last_checked_at DESC, o.id DESC"
        );

        let rows = sqlx::query_as::<_, AdminOffer>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Overwrites an offer's terms by id. Returns false if no such offer.
    pub async fn update_offer(
        &self,
        id: i64,
        terms: &OfferTerms,
        checked_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE offers SET price_inr = ?, warranty_type = ?, return_days = ?, product_url = ?, \
             last_checked_at = ? WHERE id = ?",
        )
        .bind(terms.price_inr)
        .bind(&terms.warranty_type)
        .bind(terms.return_days)
        .bind(&terms.product_url)
        .bind(checked_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_offer(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM offers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
