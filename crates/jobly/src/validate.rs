//! Validation helpers for request fields.

use crate::changeset::{ValidationCode, ValidationErrors};
use crate::partial_update::Payload;
use crate::value::SqlValue;
use std::sync::OnceLock;

/// Maximum length of a company handle (matches the `VARCHAR(25)` column).
pub const MAX_HANDLE_LEN: usize = 25;

/// Lowercase slug: letters, digits, `-` and `_`.
pub fn is_handle(s: &str) -> bool {
    static HANDLE_RE: OnceLock<regex::Regex> = OnceLock::new();
    !s.is_empty()
        && s.len() <= MAX_HANDLE_LEN
        && HANDLE_RE
            .get_or_init(|| {
                regex::Regex::new(r"^[a-z0-9_-]+$").expect("invalid built-in handle regex")
            })
            .is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// A check for one field of an update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    NonEmptyText,
    Text,
    NonNegativeIntOrNull,
    FractionOrNull,
    UrlOrNull,
}

/// Validate every field of `payload` against its rule in `rules`.
///
/// Fields without a rule are rejected, so only allow-listed names can reach
/// the `SET` clause builder.
pub fn check_payload(payload: &Payload, rules: &[(&str, Rule)]) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();
    for (field, value) in payload.iter() {
        match rules.iter().find(|(name, _)| *name == field) {
            Some(&(_, rule)) => {
                FieldCheck::new(field, value, &mut errs).apply(rule);
            }
            None => errs.add(field, ValidationCode::UnknownField, "is not an updatable field"),
        }
    }
    errs.into_result()
}

/// Per-field checks applied to one value of an update payload.
///
/// Each method records a failure in `errs` and returns whether the value passed.
pub struct FieldCheck<'a> {
    field: &'a str,
    value: &'a SqlValue,
    errs: &'a mut ValidationErrors,
}

impl<'a> FieldCheck<'a> {
    pub fn new(field: &'a str, value: &'a SqlValue, errs: &'a mut ValidationErrors) -> Self {
        Self { field, value, errs }
    }

    pub fn apply(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::NonEmptyText => self.non_empty_text(),
            Rule::Text => self.text(),
            Rule::NonNegativeIntOrNull => self.non_negative_int_or_null(),
            Rule::FractionOrNull => self.fraction_or_null(),
            Rule::UrlOrNull => self.url_or_null(),
        }
    }

    fn fail(&mut self, code: ValidationCode, message: impl Into<String>) -> bool {
        self.errs.add(self.field, code, message);
        false
    }

    fn wrong_type(&mut self, expected: &str) -> bool {
        let got = self.value.type_name();
        self.fail(ValidationCode::Type, format!("expected {expected}, got {got}"))
    }

    /// Non-empty string.
    pub fn non_empty_text(&mut self) -> bool {
        match self.value {
            SqlValue::Text(s) if !s.trim().is_empty() => true,
            SqlValue::Text(_) => self.fail(ValidationCode::Len, "must not be empty"),
            _ => self.wrong_type("string"),
        }
    }

    /// Any string, including empty.
    pub fn text(&mut self) -> bool {
        match self.value {
            SqlValue::Text(_) => true,
            _ => self.wrong_type("string"),
        }
    }

    /// Integer `>= 0` that fits in a Postgres `INTEGER`, or null.
    pub fn non_negative_int_or_null(&mut self) -> bool {
        match self.value {
            SqlValue::Null => true,
            SqlValue::Int(i) if (0..=i64::from(i32::MAX)).contains(i) => true,
            SqlValue::Int(_) => self.fail(ValidationCode::Range, "must be between 0 and 2147483647"),
            _ => self.wrong_type("integer"),
        }
    }

    /// Number in `[0, 1]`, or null.
    pub fn fraction_or_null(&mut self) -> bool {
        match self.value {
            SqlValue::Null => true,
            v => match v.as_f64() {
                Some(f) if (0.0..=1.0).contains(&f) => true,
                Some(_) => self.fail(ValidationCode::Range, "must be between 0 and 1"),
                None => self.wrong_type("number"),
            },
        }
    }

    /// Valid URL, or null.
    pub fn url_or_null(&mut self) -> bool {
        match self.value {
            SqlValue::Null => true,
            SqlValue::Text(s) if is_url(s) => true,
            SqlValue::Text(_) => self.fail(ValidationCode::Url, "must be a valid URL"),
            _ => self.wrong_type("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_rules() {
        assert!(is_handle("acme-co_2"));
        assert!(!is_handle(""));
        assert!(!is_handle("Acme"));
        assert!(!is_handle("acme co"));
        assert!(!is_handle(&"a".repeat(26)));
    }

    #[test]
    fn url_rules() {
        assert!(is_url("https://example.com/logo.png"));
        assert!(!is_url("not a url"));
    }

    #[test]
    fn field_checks_record_failures() {
        let mut errs = ValidationErrors::new();

        assert!(FieldCheck::new("salary", &SqlValue::Int(10), &mut errs).non_negative_int_or_null());
        assert!(FieldCheck::new("salary", &SqlValue::Null, &mut errs).non_negative_int_or_null());
        assert!(!FieldCheck::new("salary", &SqlValue::Int(-1), &mut errs).non_negative_int_or_null());
        assert!(!FieldCheck::new("salary", &SqlValue::Float(1.5), &mut errs).non_negative_int_or_null());

        assert!(FieldCheck::new("equity", &SqlValue::Int(1), &mut errs).fraction_or_null());
        assert!(FieldCheck::new("equity", &SqlValue::Float(0.05), &mut errs).fraction_or_null());
        assert!(!FieldCheck::new("equity", &SqlValue::Float(1.5), &mut errs).fraction_or_null());
        assert!(!FieldCheck::new("equity", &SqlValue::Bool(true), &mut errs).fraction_or_null());

        assert!(!FieldCheck::new("name", &SqlValue::Text(" ".into()), &mut errs).non_empty_text());
        assert!(!FieldCheck::new("logoUrl", &SqlValue::Text("x".into()), &mut errs).url_or_null());

        assert_eq!(errs.len(), 6);
        assert_eq!(
            errs.iter().map(|e| e.code.as_str()).collect::<Vec<_>>(),
            vec!["range", "type", "range", "type", "len", "url"]
        );
    }

    #[test]
    fn check_payload_rejects_unknown_fields() {
        let rules = [("salary", Rule::NonNegativeIntOrNull), ("title", Rule::NonEmptyText)];
        let ok = Payload::new().with("salary", 100).with("title", "Dev");
        assert!(check_payload(&ok, &rules).is_ok());

        let bad = Payload::new()
            .with("salary", -5)
            .with("company_handle", "acme");
        let errs = check_payload(&bad, &rules).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().any(|e| e.field == "salary" && e.code.as_str() == "range"));
        assert!(
            errs.iter()
                .any(|e| e.field == "company_handle" && e.code.as_str() == "unknown_field")
        );
    }
}
