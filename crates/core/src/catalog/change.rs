use serde::Deserialize;

use super::product::ProductStatus;
use crate::sql::Statement;

/// Body of a product status change.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusChange {
    pub status: ProductStatus,
}

impl StatusChange {
    pub fn statement(&self, product_id: &str) -> Statement {
        Statement::new("UPDATE products SET status = $1 WHERE product_id = $2")
            .bind(self.status.as_str())
            .bind(product_id)
    }
}

/// Remove the product with this `product_id`; the column is unique.
pub fn delete_statement(product_id: &str) -> Statement {
    Statement::new("DELETE FROM products WHERE product_id = $1").bind(product_id)
}
