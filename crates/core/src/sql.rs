use chrono::{DateTime, Utc};
use serde_json::Value;

/// A positional statement parameter, bound as `$1`, `$2`, ... in order.
///
/// Statement text never carries caller-supplied values; anything that
/// varies per request travels as one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    Json(Value),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Float(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(value: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(value)
    }
}

impl From<Vec<String>> for SqlParam {
    fn from(value: Vec<String>) -> Self {
        SqlParam::TextList(value)
    }
}

/// A statement together with the parameters its placeholders refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a bound parameter and return its placeholder (`$n`).
    pub fn push_param(&mut self, param: impl Into<SqlParam>) -> String {
        self.params.push(param.into());
        format!("${}", self.params.len())
    }

    pub fn bind(mut self, param: impl Into<SqlParam>) -> Self {
        self.params.push(param.into());
        self
    }
}
