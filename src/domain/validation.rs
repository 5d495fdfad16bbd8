//! Field-scoped validation errors.
//!
//! Validation failures are data, not errors: they travel inside [`Outcome::Rejected`]
//! and are safe to show to the end user verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{MAX_PASSWORD_BYTES, MSG_PASSWORD_TOO_LONG};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

/// All messages reported against a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrors {
    /// Field the messages refer to
    #[schema(example = "email")]
    pub field: String,
    /// Messages in the order they were raised
    #[schema(example = json!(["Email is already in use."]))]
    pub errors: Vec<String>,
}

/// Ordered collection of field errors.
///
/// Fields keep the order in which they first failed; a second failure on the same
/// field appends to that field's messages instead of adding a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldErrors>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection holding one message for one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|entry| entry.field == field) {
            Some(entry) => entry.errors.push(message),
            None => self.0.push(FieldErrors {
                field: field.to_string(),
                errors: vec![message],
            }),
        }
    }

    /// Fail `field` when `value` is empty.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.add(field, format!("{} is required", field));
        }
    }

    /// Fail `field` when `value` is longer than bcrypt can consume.
    pub fn require_password_length(&mut self, field: &str, value: &str) {
        if value.len() > MAX_PASSWORD_BYTES {
            self.add(field, MSG_PASSWORD_TOO_LONG);
        }
    }

    /// Fail `field` when `value` is empty or not shaped like an email address.
    pub fn require_email(&mut self, field: &str, value: &str) {
        self.require(field, value);
        if !EMAIL_REGEX.is_match(value) {
            self.add(field, "Invalid email");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.errors.as_slice())
    }

    /// Field names in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|entry| entry.field.as_str()).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|entry| format!("{}: {}", entry.field, entry.errors.join(", ")))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Result of an operation that may be rejected by validation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected(ValidationErrors),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Accepted(value) => Outcome::Accepted(f(value)),
            Outcome::Rejected(errors) => Outcome::Rejected(errors),
        }
    }

    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match self {
            Outcome::Accepted(value) => Ok(value),
            Outcome::Rejected(errors) => Err(errors),
        }
    }
}
