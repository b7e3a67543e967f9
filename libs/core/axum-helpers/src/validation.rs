//! Ordered rule pipeline for raw request input.
//!
//! A [`RuleSet`] lists fields in evaluation order, each with its own ordered
//! rules. Evaluation never stops early: every field is checked and every rule
//! of a field runs, so a field can collect several messages. The only skip is
//! for empty values, which are seen by implicit rules (such as [`required`])
//! alone.
//!
//! Input strings are trimmed first, except for fields added with
//! [`RuleSet::raw_field`] (passwords), whose rules see the value as sent.
//! Absent keys, `null`, whitespace-only strings and empty arrays/objects are
//! all "empty" either way.
//!
//! ```rust
//! use axum_helpers::validation::{RuleSet, email, min_length, required};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let rules = RuleSet::new()
//!     .field("email", [required(), email()])
//!     .field("password", [required(), min_length(6)]);
//!
//! let input = json!({ "email": "someone@", "password": "" });
//! let errors = rules.validate(input.as_object().unwrap()).await.unwrap_err();
//!
//! assert!(errors.contains("email"));
//! assert_eq!(errors.get("password").unwrap(), ["The password field is required."]);
//! # });
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateLength};

use crate::envelope::FieldErrors;

/// Raw request input keyed by field name.
pub type Input = Map<String, Value>;

/// A single check applied to one field.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Returns the violation message, or `None` when `value` passes.
    ///
    /// `value` is trimmed unless the field is raw. Only implicit rules are ever called with an
    /// empty string.
    async fn check(&self, field: &str, value: &str) -> Option<String>;

    /// Implicit rules run even when the field is empty.
    fn implicit(&self) -> bool {
        false
    }
}

/// Human-readable form of a field name used in messages.
pub fn display_name(field: &str) -> String {
    field.replace('_', " ")
}

/// Normalizes one input value to the string rules see.
///
/// Blank strings are always empty; `trim` decides whether a non-blank string
/// reaches the rules trimmed or untouched.
pub fn input_value(input: &Input, field: &str, trim: bool) -> Option<String> {
    let value = match input.get(field)? {
        Value::Null => return None,
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) if trim => s.trim().to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => return None,
        Value::Object(map) if map.is_empty() => return None,
        other => other.to_string(),
    };
    Some(value)
}

pub struct Required;

#[async_trait]
impl Rule for Required {
    async fn check(&self, field: &str, value: &str) -> Option<String> {
        value
            .is_empty()
            .then(|| format!("The {} field is required.", display_name(field)))
    }

    fn implicit(&self) -> bool {
        true
    }
}

pub struct Email;

#[async_trait]
impl Rule for Email {
    async fn check(&self, field: &str, value: &str) -> Option<String> {
        (!value.validate_email()).then(|| {
            format!(
                "The {} field must be a valid email address.",
                display_name(field)
            )
        })
    }
}

/// Minimum length in characters, not bytes.
pub struct MinLength(pub u64);

#[async_trait]
impl Rule for MinLength {
    async fn check(&self, field: &str, value: &str) -> Option<String> {
        (!value.validate_length(Some(self.0), None, None)).then(|| {
            format!(
                "The {} field must be at least {} characters.",
                display_name(field),
                self.0
            )
        })
    }
}

pub fn required() -> Box<dyn Rule> {
    Box::new(Required)
}

pub fn email() -> Box<dyn Rule> {
    Box::new(Email)
}

pub fn min_length(min: u64) -> Box<dyn Rule> {
    Box::new(MinLength(min))
}

struct FieldRules {
    name: String,
    trim: bool,
    rules: Vec<Box<dyn Rule>>,
}

/// Ordered fields, each with ordered rules.
#[derive(Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field and its rules.
    pub fn field<I>(self, name: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        self.push(name.into(), true, rules)
    }

    /// Appends a field whose value is checked without trimming.
    pub fn raw_field<I>(self, name: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        self.push(name.into(), false, rules)
    }

    fn push<I>(mut self, name: String, trim: bool, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        self.fields.push(FieldRules {
            name,
            trim,
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Evaluates every rule and returns all violations.
    pub async fn validate(&self, input: &Input) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for FieldRules { name: field, trim, rules } in &self.fields {
            let value = input_value(input, field, *trim);
            for rule in rules {
                let message = match value.as_deref() {
                    Some(value) => rule.check(field, value).await,
                    None if rule.implicit() => rule.check(field, "").await,
                    None => None,
                };
                if let Some(message) = message {
                    errors.add(field.as_str(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
