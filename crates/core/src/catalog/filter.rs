use serde::Deserialize;

use super::product::{ProductSource, ProductStatus, PRODUCT_COLUMNS};
use crate::sql::Statement;
use crate::validate::{is_all, ValidationError};

/// Rows returned by one product listing.
pub const PRODUCT_LIST_LIMIT: i64 = 50;

/// Raw product-list filter selections, as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilterParams {
    pub source: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Product-list filter. `None` means the selection was `All` or absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub source: Option<ProductSource>,
    pub status: Option<ProductStatus>,
    pub search: Option<String>,
}

impl TryFrom<ProductFilterParams> for ProductFilter {
    type Error = ValidationError;

    fn try_from(params: ProductFilterParams) -> Result<Self, Self::Error> {
        let selected = |v: Option<String>| v.filter(|s| !s.trim().is_empty() && !is_all(s));

        Ok(Self {
            source: selected(params.source)
                .map(|s| s.parse())
                .transpose()?,
            status: selected(params.status)
                .map(|s| s.parse())
                .transpose()?,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

impl ProductFilter {
    /// Compose the listing query. Every selection becomes a bound parameter.
    pub fn to_statement(&self) -> Statement {
        let mut stmt = Statement::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1"));
        let mut clauses = Vec::new();

        if let Some(source) = self.source {
            clauses.push(format!("source = {}", stmt.push_param(source.as_str())));
        }
        if let Some(status) = self.status {
            clauses.push(format!("status = {}", stmt.push_param(status.as_str())));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            clauses.push(format!("title ILIKE {}", stmt.push_param(pattern)));
        }

        for clause in clauses {
            stmt.sql.push_str(" AND ");
            stmt.sql.push_str(&clause);
        }
        stmt.sql.push_str(&format!(
            " ORDER BY created_at DESC LIMIT {PRODUCT_LIST_LIMIT}"
        ));
        stmt
    }
}

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
