//! SQL values, typed value mapping and expression type tags.
//!
//! [`SqlValue`] is what travels to and from the connection: bindings going
//! out, raw column values coming back. [`Value`] maps a Rust type onto that
//! domain and names its declared SQL type. [`SqlType`] is implemented by the
//! tags an [`Expression`](super::Expression) can carry: a value type `V` for
//! non-null expressions and `Option<V>` for nullable ones.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::error::QueryError;

/// A SQL value that can be bound as a parameter or read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex = b.iter().fold(String::new(), |mut hex, byte| {
                    let _ = write!(hex, "{byte:02X}");
                    hex
                });
                format!("X'{hex}'")
            }
        }
    }

    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the parameter placeholder.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }
}

/// A Rust type with a SQL representation.
pub trait Value: Sized {
    /// The declared SQL type name, used by `CAST`.
    const DECLARED_TYPE: &'static str;

    /// Converts the value to a binding.
    fn to_sql_value(self) -> SqlValue;

    /// Converts a raw value back, or `None` when the raw value is NULL or of
    /// an incompatible storage class.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

/// Values that support arithmetic (`+ - * /`, negation, `avg`, `sum`).
pub trait Numeric: Value {}

/// Values that support `%` and the bitwise operators.
pub trait Integer: Numeric {}

/// Values `!` applies to, with the SQL prefix it compiles to.
pub trait Invertible: Value {
    /// Prefix wrapped around the operand: `NOT ` or `~`.
    const PREFIX: &'static str;
}

impl Value for i64 {
    const DECLARED_TYPE: &'static str = "INTEGER";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl Value for i32 {
    const DECLARED_TYPE: &'static str = "INTEGER";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(n) => Self::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl Value for f64 {
    const DECLARED_TYPE: &'static str = "REAL";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl Value for bool {
    const DECLARED_TYPE: &'static str = "INTEGER";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(n) => Some(*n != 0),
            _ => None,
        }
    }
}

impl Value for String {
    const DECLARED_TYPE: &'static str = "TEXT";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl Value for Vec<u8> {
    const DECLARED_TYPE: &'static str = "BLOB";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Blob(b) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Text layout used for timestamps, millisecond precision.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

impl Value for NaiveDateTime {
    const DECLARED_TYPE: &'static str = "TEXT";

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format(DATE_TIME_FORMAT).to_string())
    }

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Self::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok(),
            _ => None,
        }
    }
}

impl Numeric for i64 {}
impl Numeric for i32 {}
impl Numeric for f64 {}
impl Integer for i64 {}
impl Integer for i32 {}

impl Invertible for bool {
    const PREFIX: &'static str = "NOT ";
}

impl Invertible for i64 {
    const PREFIX: &'static str = "~";
}

impl Invertible for i32 {
    const PREFIX: &'static str = "~";
}

/// The type tag carried by an expression.
///
/// Implemented for every [`Value`] type `V` (a non-null expression) and for
/// `Option<V>` (a nullable one).
pub trait SqlType: Sized {
    /// The underlying value type.
    type Value: Value;

    /// The nullable form of this tag.
    type Optional: SqlType<Value = Self::Value>;

    /// The tag of a comparison involving this type: `bool` or `Option<bool>`.
    type Predicate: SqlType<Value = bool>;

    /// Builds the tagged value from a decoded one.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnexpectedNullValue`] when a non-null tag gets
    /// `None`.
    fn from_optional(value: Option<Self::Value>, name: &str) -> Result<Self, QueryError>;
}

macro_rules! impl_sql_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SqlType for $ty {
                type Value = $ty;
                type Optional = Option<$ty>;
                type Predicate = bool;

                fn from_optional(value: Option<$ty>, name: &str) -> Result<Self, QueryError> {
                    value.ok_or_else(|| QueryError::UnexpectedNullValue {
                        name: String::from(name),
                    })
                }
            }

            impl SqlType for Option<$ty> {
                type Value = $ty;
                type Optional = Option<$ty>;
                type Predicate = Option<bool>;

                fn from_optional(value: Option<$ty>, _name: &str) -> Result<Self, QueryError> {
                    Ok(value)
                }
            }
        )+
    };
}

impl_sql_type!(i64, i32, f64, bool, String, Vec<u8>, NaiveDateTime);
