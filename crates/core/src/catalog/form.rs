use serde::{Deserialize, Serialize};

use super::product::{ProductCategory, ProductSource, ProductStatus};
use crate::sql::{SqlParam, Statement};
use crate::validate::{require_text, ValidationError};

/// "Add Product" form as submitted by the operator.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub title: Option<String>,
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: ProductCategory,
    pub description: Option<String>,
    pub source: ProductSource,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A product that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub source: ProductSource,
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub images: Vec<String>,
}

impl ProductForm {
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        let title = require_text(self.title.as_deref())?.to_string();
        let product_id = require_text(self.product_id.as_deref())?.to_string();

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ValidationError::NonPositivePrice);
        }

        let images = self
            .images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect::<Vec<_>>();
        if let Some(bad) = images
            .iter()
            .find(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        {
            return Err(ValidationError::InvalidImageUrl(bad.clone()));
        }

        Ok(NewProduct {
            source: self.source,
            product_id,
            title,
            description: self.description.unwrap_or_default().trim().to_string(),
            price: self.price,
            category: self.category,
            images,
        })
    }
}

impl NewProduct {
    /// Insert statement; new products always start awaiting content generation.
    pub fn insert_statement(&self) -> Statement {
        Statement::new(format!(
            "INSERT INTO products (source, product_id, title, description, price, category, images, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, '{}')",
            ProductStatus::PendingContentGeneration.as_str()
        ))
        .bind(self.source.as_str())
        .bind(self.product_id.clone())
        .bind(self.title.clone())
        .bind(self.description.clone())
        .bind(self.price)
        .bind(self.category.as_str())
        .bind(SqlParam::Json(serde_json::json!(self.images)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            title: Some("Premium Leather Wallet".to_string()),
            product_id: Some("PROD-1".to_string()),
            price: 9.99,
            category: ProductCategory::Accessories,
            description: Some("Full-grain leather".to_string()),
            source: ProductSource::Manual,
            images: vec![],
        }
    }

    #[test]
    fn valid_form_passes() {
        let product = form().validate().unwrap();
        assert_eq!(product.product_id, "PROD-1");
        assert_eq!(product.price, 9.99);
        assert!(product.images.is_empty());
    }

    #[test]
    fn title_and_product_id_required() {
        let mut f = form();
        f.title = Some("  ".to_string());
        assert_eq!(f.validate(), Err(ValidationError::MissingRequired));

        let mut f = form();
        f.product_id = None;
        assert_eq!(f.validate(), Err(ValidationError::MissingRequired));
    }

    #[test]
    fn non_positive_price_rejected() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut f = form();
            f.price = price;
            assert_eq!(f.validate(), Err(ValidationError::NonPositivePrice));
        }
    }

    #[test]
    fn image_urls_must_be_http() {
        let mut f = form();
        f.images = vec!["ftp://x/y.png".to_string()];
        assert!(matches!(
            f.validate(),
            Err(ValidationError::InvalidImageUrl(_))
        ));
    }

    #[test]
    fn insert_binds_every_value() {
        let stmt = form().validate().unwrap().insert_statement();
        assert_eq!(stmt.params.len(), 7);
        assert!(stmt.sql.contains("'pending_content_generation'"));
        assert_eq!(stmt.params[1], SqlParam::Text("PROD-1".to_string()));
        assert_eq!(stmt.params[4], SqlParam::Float(9.99));
        assert_eq!(stmt.params[6], SqlParam::Json(serde_json::json!([])));
    }
}
