//! Domain types of the content-ops dashboard: entities, operator input and
//! its validation, statement composition, and the posting-API model.
//!
//! Nothing in this crate performs I/O; statements are composed here and
//! executed by the gateway in `content-ops-api`.

pub mod catalog;
pub mod platform;
pub mod publishing;
pub mod review;
pub mod sql;
pub mod stats;
pub mod validate;

pub use sql::{SqlParam, Statement};
pub use validate::ValidationError;
