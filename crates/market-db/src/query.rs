//! # Named-Parameter Binder
//!
//! Turns `:name` templates into PostgreSQL positional queries.
//!
//! ## How Binding Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Template → Positional Query                          │
//! │                                                                         │
//! │  UPDATE product SET name = :name, price = :price WHERE id = :id        │
//! │       │                                                                 │
//! │       │  Params { id: "p-1", name: "Milk", price: 9900 }               │
//! │       ▼                                                                 │
//! │  UPDATE product SET name = $1, price = $2 WHERE id = $3                │
//! │  args: ["Milk", 9900, "p-1"]                                           │
//! │                                                                         │
//! │  Rules:                                                                 │
//! │  • positions follow FIRST occurrence in the template                   │
//! │  • a repeated :name reuses its $N, the value is listed once            │
//! │  • "::" casts and text inside '...' literals are copied verbatim       │
//! │  • a :name with no value is a hard BindError                           │
//! │  • params the template never mentions are ignored                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use market_core::Money;
use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Failures while turning a template into a positional query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The template references `:name` but no value was supplied.
    #[error("no value bound for query parameter :{0}")]
    MissingParameter(String),

    /// A JSON value cannot be sent as a single SQL scalar.
    #[error("parameter :{name} has an unsupported value: {reason}")]
    UnsupportedValue { name: String, reason: String },
}

// =============================================================================
// Values
// =============================================================================

/// A scalar that can be bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SqlValue {
    /// Converts a JSON scalar; arrays, objects and out-of-range integers are rejected.
    pub fn from_json(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(b)),
            Value::String(s) => Ok(SqlValue::Text(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if n.is_u64() {
                    Err(BindError::UnsupportedValue {
                        name: name.to_string(),
                        reason: format!("{n} does not fit in a 64-bit signed integer"),
                    })
                } else {
                    n.as_f64()
                        .map(SqlValue::Float)
                        .ok_or_else(|| BindError::UnsupportedValue {
                            name: name.to_string(),
                            reason: format!("{n} is not a finite number"),
                        })
                }
            }
            Value::Array(_) | Value::Object(_) => Err(BindError::UnsupportedValue {
                name: name.to_string(),
                reason: "arrays and objects cannot be bound".to_string(),
            }),
        }
    }

    /// True for [`SqlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<Money> for SqlValue {
    fn from(value: Money) -> Self {
        SqlValue::Int(value.minor())
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Text)
    }
}

// =============================================================================
// Params
// =============================================================================

/// Name → value mapping consumed by [`bind_named`].
///
/// ## Example
/// ```rust
/// use market_db::query::{bind_named, Params};
///
/// let params = Params::new().with("id", "b-1").with("name", "Yunusobod");
/// let bound = bind_named("UPDATE branch SET name = :name WHERE id = :id", &params).unwrap();
/// assert_eq!(bound.sql, "UPDATE branch SET name = $1 WHERE id = $2");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(HashMap<String, SqlValue>);

impl Params {
    pub fn new() -> Self {
        Params(HashMap::new())
    }

    /// Adds or replaces a value (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Binding
// =============================================================================

/// A positional query plus its arguments, `args[i]` bound to `$(i + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

impl BoundQuery {
    /// Builds an executable sqlx query borrowing this SQL and its arguments.
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        self.args
            .iter()
            .fold(sqlx::query(&self.sql), |query, arg| match arg {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Text(s) => query.bind(s.as_str()),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Bool(b) => query.bind(*b),
            })
    }
}

/// Rewrites `:name` placeholders to `$N` and collects the values in order.
pub fn bind_named(template: &str, params: &Params) -> Result<BoundQuery, BindError> {
    let bytes = template.as_bytes();
    let mut sql = String::with_capacity(template.len() + 8);
    let mut names: Vec<&str> = Vec::new();
    let mut args = Vec::new();

    let mut copied = 0;
    let mut in_literal = false;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if in_literal {
            // '' inside a literal closes and reopens it, which nets out the same
            if c == b'\'' {
                in_literal = false;
            }
            i += 1;
            continue;
        }

        match c {
            b'\'' => {
                in_literal = true;
                i += 1;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b':' if bytes.get(i + 1).is_some_and(|&b| is_ident_start(b)) => {
                let start = i + 1;
                let end = start
                    + bytes[start..]
                        .iter()
                        .take_while(|&&b| is_ident_continue(b))
                        .count();
                let name = &template[start..end];

                let position = match names.iter().position(|&seen| seen == name) {
                    Some(index) => index + 1,
                    None => {
                        let value = params
                            .get(name)
                            .ok_or_else(|| BindError::MissingParameter(name.to_string()))?;
                        names.push(name);
                        args.push(value.clone());
                        names.len()
                    }
                };

                sql.push_str(&template[copied..i]);
                sql.push('$');
                sql.push_str(&position.to_string());
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    sql.push_str(&template[copied..]);

    Ok(BoundQuery { sql, args })
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// =============================================================================
// Unit Tests
// =============================================================================
