//! Field validation schemas
//!
//! A schema maps each field to an ordered list of constraint checks. Checks
//! run in declaration order and every failing check contributes its message,
//! except [`Rule::NotNull`]: a missing value reports only the not-null message
//! and skips the remaining checks for that field.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// A single constraint on a string field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be present
    NotNull(&'static str),
    /// Value must contain something other than whitespace
    NotEmpty(&'static str),
    /// Value must look like an email address
    Email(&'static str),
}

/// Constraints attached to one named field
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl Rule {
    /// The message reported when this rule fails
    pub fn message(&self) -> &'static str {
        match self {
            Rule::NotNull(msg) | Rule::NotEmpty(msg) | Rule::Email(msg) => *msg,
        }
    }

    fn passes(&self, value: &str) -> bool {
        match self {
            Rule::NotNull(_) => true,
            Rule::NotEmpty(_) => !value.trim().is_empty(),
            Rule::Email(_) => email_pattern().is_match(value),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .expect("Invalid regex pattern - this is a bug in the codebase")
    })
}

/// Run the rules of a single field, appending failures to `errors`
pub fn check_field(value: Option<&str>, rules: &[Rule], errors: &mut Vec<String>) {
    let Some(value) = value else {
        if let Some(rule) = rules.iter().find(|r| matches!(r, Rule::NotNull(_))) {
            errors.push(rule.message().to_string());
        }
        return;
    };

    errors.extend(
        rules
            .iter()
            .filter(|rule| !rule.passes(value))
            .map(|rule| rule.message().to_string()),
    );
}

/// Collects field failures across a whole record
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `value` against the rules declared for `field` in `schema`.
    /// Fields absent from the schema are unconstrained.
    pub fn field(mut self, schema: &[FieldRules], field: &str, value: Option<&str>) -> Self {
        if let Some(declared) = schema.iter().find(|f| f.field == field) {
            check_field(value, declared.rules, &mut self.errors);
        }
        self
    }

    /// Check only when the field was supplied, as partial updates do
    pub fn supplied(self, schema: &[FieldRules], field: &str, value: Option<Option<&str>>) -> Self {
        match value {
            Some(inner) => self.field(schema, field, inner),
            None => self,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// `Ok(())` when nothing failed, otherwise [`Error::Validation`]
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

/// Deserialize helper that keeps "field present but null" distinct from
/// "field absent" when paired with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
