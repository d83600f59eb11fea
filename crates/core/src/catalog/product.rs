use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Where a product entered the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    Shopify,
    TiktokShop,
    Manual,
}

impl ProductSource {
    pub const ALL: [ProductSource; 3] = [
        ProductSource::Shopify,
        ProductSource::TiktokShop,
        ProductSource::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSource::Shopify => "shopify",
            ProductSource::TiktokShop => "tiktok_shop",
            ProductSource::Manual => "manual",
        }
    }
}

impl FromStr for ProductSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "source",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProductSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product lifecycle. Upstream automation advances it past the first state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    PendingContentGeneration,
    ContentGenerated,
    Published,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::PendingContentGeneration,
        ProductStatus::ContentGenerated,
        ProductStatus::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::PendingContentGeneration => "pending_content_generation",
            ProductStatus::ContentGenerated => "content_generated",
            ProductStatus::Published => "published",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductCategory {
    Accessories,
    Electronics,
    Clothing,
    Home,
    #[default]
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Accessories => "Accessories",
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Home => "Home",
            ProductCategory::Other => "Other",
        }
    }
}

/// A row of the `products` table as the product list renders it.
///
/// Enumerated columns stay as text here: rows are written by upstream
/// automation too, and an unexpected value must not break the listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub source: String,
    pub product_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    #[sqlx(json)]
    pub images: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Column list matching [`ProductRow`].
pub const PRODUCT_COLUMNS: &str = "id::TEXT AS id, source, product_id, title, description, \
     price::FLOAT8 AS price, category, COALESCE(images, '[]'::jsonb) AS images, status, created_at";
