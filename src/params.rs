//! Request parameters and their URL-encoded serialization.
//!
//! Values form a closed set (strings, numbers, booleans, null, arrays and
//! nested objects). Nested structures are flattened with bracket notation
//! before form encoding:
//!
//! | value                          | encoded                    |
//! |--------------------------------|----------------------------|
//! | `{a: 1, b: "x"}`               | `a=1&b=x`                  |
//! | `{f: {k: "v"}}`                | `f%5Bk%5D=v` (`f[k]=v`)    |
//! | `{ids: [1, 2]}`                | `ids%5B0%5D=1&ids%5B1%5D=2`|
//! | `{n: null}`                    | `n=`                       |
//!
//! Empty arrays and empty objects produce no pairs.
//!
//! Keys and values are then percent-encoded as
//! `application/x-www-form-urlencoded`, not RFC 3986: a space becomes `+`,
//! `~` becomes `%7E` and `*` is left as is.

use crate::{Error, ErrorContext, Result};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(Params),
}

/// Ordered key/value parameters. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `(key, value)` string pairs using bracket notation.
    pub fn flatten(&self) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            flatten_into(key.clone(), value, &mut pairs)?;
        }
        Ok(pairs)
    }

    /// Flatten and form-encode, e.g. `a=1&b=x`.
    pub fn to_query_string(&self) -> Result<String> {
        let pairs = self.flatten()?;
        serde_urlencoded::to_string(&pairs).map_err(|e| {
            Error::serialization_with_context(
                e.to_string(),
                ErrorContext::new().with_source("param_encoder"),
            )
        })
    }
}

/// Encode optional params; absent params encode to an empty string.
pub fn encode(params: Option<&Params>) -> Result<String> {
    match params {
        Some(p) => p.to_query_string(),
        None => Ok(String::new()),
    }
}

fn flatten_into(prefix: String, value: &ParamValue, out: &mut Vec<(String, String)>) -> Result<()> {
    match value {
        ParamValue::Null => out.push((prefix, String::new())),
        ParamValue::Bool(b) => out.push((prefix, b.to_string())),
        ParamValue::Int(i) => out.push((prefix, i.to_string())),
        ParamValue::UInt(u) => out.push((prefix, u.to_string())),
        ParamValue::Float(f) => {
            if !f.is_finite() {
                return Err(Error::serialization_with_context(
                    "non-finite number cannot be encoded",
                    ErrorContext::new()
                        .with_field_path(prefix)
                        .with_details(f.to_string())
                        .with_source("param_encoder"),
                ));
            }
            out.push((prefix, f.to_string()));
        }
        ParamValue::String(s) => out.push((prefix, s.clone())),
        ParamValue::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", prefix, idx), item, out)?;
            }
        }
        ParamValue::Object(nested) => {
            for (key, item) in &nested.entries {
                flatten_into(format!("{}[{}]", prefix, key), item, out)?;
            }
        }
    }
    Ok(())
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                ParamValue::Int(i64::from(v))
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::UInt(v as u64)
    }
}

impl From<isize> for ParamValue {
    fn from(v: isize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(f64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<Params> for ParamValue {
    fn from(v: Params) -> Self {
        ParamValue::Object(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ParamValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ParamValue::UInt(u)
                } else {
                    n.as_f64()
                        .map(ParamValue::Float)
                        .unwrap_or_else(|| ParamValue::String(n.to_string()))
                }
            }
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => ParamValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => ParamValue::Object(map.into_iter().collect()),
        }
    }
}

impl TryFrom<serde_json::Value> for Params {
    type Error = Error;

    fn try_from(v: serde_json::Value) -> Result<Self> {
        match v {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::serialization_with_context(
                "parameters must be a JSON object",
                ErrorContext::new()
                    .with_details(other.to_string())
                    .with_source("param_encoder"),
            )),
        }
    }
}
