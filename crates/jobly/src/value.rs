//! Scalar values carried by update payloads.
//!
//! [`SqlValue`] is a closed set of the scalar kinds the driver can bind. It is
//! built from JSON scalars and binds to whatever parameter type Postgres infers
//! for its placeholder.

use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

/// A single scalar bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// JSON-ish name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<'de> Deserialize<'de> for SqlValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SqlValueVisitor;

        impl Visitor<'_> for SqlValueVisitor {
            type Value = SqlValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, boolean or null")
            }

            fn visit_unit<E>(self) -> Result<SqlValue, E> {
                Ok(SqlValue::Null)
            }

            fn visit_none<E>(self) -> Result<SqlValue, E> {
                Ok(SqlValue::Null)
            }

            fn visit_bool<E>(self, v: bool) -> Result<SqlValue, E> {
                Ok(SqlValue::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<SqlValue, E> {
                Ok(SqlValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SqlValue, E> {
                i64::try_from(v)
                    .map(SqlValue::Int)
                    .map_err(|_| E::custom(format!("integer {v} is out of range")))
            }

            fn visit_f64<E>(self, v: f64) -> Result<SqlValue, E> {
                Ok(SqlValue::Float(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<SqlValue, E> {
                Ok(SqlValue::Text(v.to_string()))
            }

            fn visit_string<E>(self, v: String) -> Result<SqlValue, E> {
                Ok(SqlValue::Text(v))
            }
        }

        deserializer.deserialize_any(SqlValueVisitor)
    }
}

/// 2^63. Large `i64`s round up to it as floats, and it is not an `i64` itself.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn int_as_f64(v: i64) -> Result<f64, BoxError> {
    let f = v as f64;
    if f == I64_LIMIT || f as i64 != v {
        return Err(format!("integer {v} is not exactly representable as float8").into());
    }
    Ok(f)
}

fn int_as_f32(v: i64) -> Result<f32, BoxError> {
    let f = v as f32;
    if f64::from(f) == I64_LIMIT || f as i64 != v {
        return Err(format!("integer {v} is not exactly representable as float4").into());
    }
    Ok(f)
}

fn float_as_f32(v: f64) -> Result<f32, BoxError> {
    let f = v as f32;
    if v.is_finite() && !f.is_finite() {
        return Err(format!("number {v} is out of range for float4").into());
    }
    if v != 0.0 && f == 0.0 {
        return Err(format!("number {v} underflows float4").into());
    }
    Ok(f)
}

/// `v` as a `NUMERIC`, refusing conversions that change the value beyond
/// the last decimal digits.
fn float_as_decimal(v: f64) -> Result<Decimal, BoxError> {
    let d = Decimal::try_from(v)?;
    let back = d.to_f64().ok_or_else(|| format!("number {v} cannot be stored as numeric"))?;
    if (back - v).abs() > v.abs() * 1e-12 {
        return Err(format!("number {v} cannot be stored as numeric without rounding to {d}").into());
    }
    Ok(d)
}

fn bind_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT4 {
        int_as_f32(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT8 {
        int_as_f64(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(v).to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

fn bind_float(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::FLOAT4 {
        float_as_f32(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::NUMERIC {
        float_as_decimal(v)?.to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(b) => b.to_sql_checked(ty, out),
            Self::Int(i) => bind_int(*i, ty, out),
            Self::Float(f) => bind_float(*f, ty, out),
            Self::Text(s) => s.to_sql_checked(ty, out),
        }
    }

    // Type checking happens per variant inside `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
