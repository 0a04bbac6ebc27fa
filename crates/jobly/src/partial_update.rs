//! Partial-update `SET` clause builder.
//!
//! Turns an ordered set of field/value pairs into the assignment list of an
//! `UPDATE ... SET` statement with `$1, $2, ...` placeholders, plus the values
//! to bind in the same order.
//!
//! ```ignore
//! use jobly::{Payload, build_set_clause};
//!
//! let mut p = Payload::new();
//! p.insert("firstName", "Aliya");
//! p.insert("age", 32);
//!
//! let set = build_set_clause(&p, &[("firstName", "first_name")])?;
//! assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
//!
//! let sql = format!("UPDATE users SET {} WHERE id = ${}", set.clause, set.next_placeholder());
//! ```
//!
//! Column names are emitted verbatim inside double quotes. Only pass keys that
//! went through a static translation table or an allow-list.

use crate::error::{JoblyError, JoblyResult};
use crate::value::SqlValue;
use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Write};

/// Application field name → storage column name.
///
/// Fields missing from the table are used as column names unchanged.
pub type FieldMap<'a> = [(&'a str, &'a str)];

/// An ordered field → value mapping describing a partial update.
///
/// Iteration follows insertion order, which fixes placeholder numbering.
/// Two payloads are equal only if their fields appear in the same order.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    entries: IndexMap<String, SqlValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    ///
    /// An existing field keeps its position and gets the new value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.entries.insert(field.into(), value.into());
        self
    }

    /// Chainable form of [`Payload::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = Payload;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of field names to scalar values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Payload, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut payload = Payload::new();
                while let Some((key, value)) = map.next_entry::<String, SqlValue>()? {
                    payload.insert(key, value);
                }
                Ok(payload)
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(&self.entries)
    }
}

/// Output of [`build_set_clause`]: the assignment list and its bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// `"col_a"=$1, "col_b"=$2, ...`
    pub clause: String,
    /// Values for `$1..=$n`, in placeholder order.
    pub values: Vec<SqlValue>,
}

impl SetClause {
    /// Number of assignments (and bound values).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First placeholder index not used by the clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.clause, self.values)
    }
}

fn resolve_column<'a>(field: &'a str, translations: &'a FieldMap<'a>) -> &'a str {
    translations
        .iter()
        .find(|(from, _)| *from == field)
        .map_or(field, |&(_, to)| to)
}

/// Build the `SET` assignment list for a partial update.
///
/// Each payload field becomes `"<column>"=$<i>` where `<column>` comes from
/// `translations` (or is the field itself) and `<i>` is the field's 1-based
/// position in the payload. Values are returned untouched, in the same order.
///
/// Returns [`JoblyError::InvalidInput`] if `payload` is empty.
pub fn build_set_clause(payload: &Payload, translations: &FieldMap<'_>) -> JoblyResult<SetClause> {
    if payload.is_empty() {
        return Err(JoblyError::invalid_input("No data"));
    }

    let mut clause = String::new();
    let mut values = Vec::with_capacity(payload.len());

    for (idx, (field, value)) in payload.iter().enumerate() {
        if idx > 0 {
            clause.push_str(", ");
        }
        let column = resolve_column(field, translations);
        let _ = write!(&mut clause, "\"{}\"=${}", column, idx + 1);
        values.push(value.clone());
    }

    Ok(SetClause { clause, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn translates_and_numbers_fields() {
        let p = Payload::new().with("firstName", "Aliya").with("age", 32);
        let set = build_set_clause(&p, &[("firstName", "first_name"), ("age", "age")]).unwrap();

        assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(
            set.values,
            vec![SqlValue::Text("Aliya".into()), SqlValue::Int(32)]
        );
        assert_eq!(set.next_placeholder(), 3);
    }

    #[test]
    fn numeric_values_pass_through() {
        let p = Payload::new().with("salary", 95000).with("equity", 0.05);
        let set = build_set_clause(&p, &[("salary", "salary"), ("equity", "equity")]).unwrap();

        assert_eq!(set.clause, r#""salary"=$1, "equity"=$2"#);
        assert_eq!(set.values, vec![SqlValue::Int(95000), SqlValue::Float(0.05)]);
    }

    #[test]
    fn untranslated_field_is_used_verbatim() {
        let p = Payload::new().with("nickname", "Al");
        let set = build_set_clause(&p, &[]).unwrap();

        assert_eq!(set.clause, r#""nickname"=$1"#);
        assert_eq!(set.values, vec![SqlValue::Text("Al".into())]);
    }

    #[test]
    fn partial_table_mixes_translated_and_verbatim() {
        let p = Payload::new()
            .with("name", "Acme")
            .with("numEmployees", 10)
            .with("logoUrl", SqlValue::Null);
        let set = build_set_clause(&p, &[("numEmployees", "num_employees")]).unwrap();

        assert_eq!(set.clause, r#""name"=$1, "num_employees"=$2, "logoUrl"=$3"#);
        assert_eq!(set.values[2], SqlValue::Null);
    }

    #[test]
    fn empty_payload_is_invalid_input() {
        let err = build_set_clause(&Payload::new(), &[("a", "b")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, JoblyError::InvalidInput(_)));

        let err = build_set_clause(&Payload::new(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn order_follows_insertion_not_name() {
        let p = Payload::new().with("zeta", 1).with("alpha", 2).with("mid", 3);
        let set = build_set_clause(&p, &[]).unwrap();
        assert_eq!(set.clause, r#""zeta"=$1, "alpha"=$2, "mid"=$3"#);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut p = Payload::new();
        p.insert("a", 1).insert("b", 2).insert("a", 3);
        assert_eq!(p.len(), 2);
        let set = build_set_clause(&p, &[]).unwrap();
        assert_eq!(set.clause, r#""a"=$1, "b"=$2"#);
        assert_eq!(set.values, vec![SqlValue::Int(3), SqlValue::Int(2)]);
    }

    #[test]
    fn same_inputs_same_output() {
        let p = Payload::new().with("title", "Engineer").with("salary", 100);
        let t = [("title", "title")];
        assert_eq!(build_set_clause(&p, &t).unwrap(), build_set_clause(&p, &t).unwrap());
    }

    #[test]
    fn deserialize_keeps_document_order() {
        let p: Payload = serde_json::from_str(r#"{"z": 1, "a": "x", "m": null}"#).unwrap();
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(p.get("m"), Some(&SqlValue::Null));
    }

    #[test]
    fn deserialize_duplicate_key_last_wins() {
        let p: Payload = serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(p.get("a"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn deserialize_rejects_nested_values() {
        assert!(serde_json::from_str::<Payload>(r#"{"a": [1]}"#).is_err());
        assert!(serde_json::from_str::<Payload>("[1, 2]").is_err());
    }

    #[test]
    fn placeholders_stay_contiguous_past_nine() {
        for n in 1..=12 {
            let p: Payload = (0..n).map(|i| (format!("f{i}"), i as i64)).collect();
            let set = build_set_clause(&p, &[("f0", "first")]).unwrap();

            let fragments: Vec<&str> = set.clause.split(", ").collect();
            assert_eq!(fragments.len(), n);
            assert_eq!(set.len(), n);
            for (i, fragment) in fragments.iter().enumerate() {
                let column = if i == 0 { "first".to_string() } else { format!("f{i}") };
                assert_eq!(*fragment, format!("\"{column}\"=${}", i + 1));
                assert_eq!(set.values[i], SqlValue::Int(i as i64));
            }
            assert_eq!(set.next_placeholder(), n + 1);
        }
    }

    #[test]
    fn large_body_parses_in_order() {
        let n = 50_000;
        let body = format!(
            "{{{}}}",
            (0..n).map(|i| format!("\"k{i}\":{i}")).collect::<Vec<_>>().join(",")
        );

        let started = std::time::Instant::now();
        let p: Payload = serde_json::from_str(&body).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(p.len(), n);
        assert_eq!(p.keys().next(), Some("k0"));
        assert_eq!(p.keys().last(), Some("k49999"));
        assert_eq!(p.get("k25000"), Some(&SqlValue::Int(25000)));
        // A linear scan per key takes seconds here even in release builds.
        assert!(elapsed < std::time::Duration::from_secs(2), "parse took {elapsed:?}");
    }

    #[test]
    fn equality_depends_on_order() {
        let a = Payload::new().with("a", 1).with("b", 2);
        let b = Payload::new().with("b", 2).with("a", 1);
        assert_ne!(a, b);
        assert_eq!(a, Payload::new().with("a", 1).with("b", 2));
    }

    #[test]
    fn serialize_round_trips_order() {
        let p = Payload::new().with("b", 1).with("a", true);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"b":1,"a":true}"#);
    }
}
