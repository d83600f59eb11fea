//! Products: the rows operators add, list, re-status and delete.

pub mod change;
pub mod filter;
pub mod form;
pub mod product;

pub use change::{delete_statement, StatusChange};
pub use filter::{ProductFilter, ProductFilterParams};
pub use form::{NewProduct, ProductForm};
pub use product::{ProductCategory, ProductRow, ProductSource, ProductStatus, PRODUCT_COLUMNS};
