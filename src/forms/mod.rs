//! Form payloads, sanitization, and field-level validation.
//!
//! Every form converts into a domain payload or a [`FormErrors`] set keyed by
//! the HTML field name, so a rejected submission can be re-rendered next to
//! the values the user typed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::ValidationErrors;

pub mod categories;
pub mod products;
pub mod tags;

pub const REQUIRED_MESSAGE: &str = "Este campo es obligatorio.";
pub const INVALID_NUMBER_MESSAGE: &str = "Introduzca un número.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Escoja una opción válida. Esa opción no está entre las disponibles.";

/// Result type returned by the form conversion helpers.
pub type FormResult<T> = Result<T, FormErrors>;

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Move every message of `other` into `self`.
    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any message is recorded for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// `Ok(value)` when no errors were recorded, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> FormResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = FormErrors::new();
        for (field, field_errors) in value.field_errors() {
            for error in field_errors.iter() {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                };
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trim, collapse whitespace runs to one space, and drop control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize each line, trim blank edges, and keep at most one blank line in a row.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty && previous_empty {
            continue;
        }
        previous_empty = is_empty;
        result.push(line);
    }

    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(max = 3, message = "too long"))]
        nombre: String,
    }

    #[test]
    fn sanitize_inline_text_collapses_whitespace() {
        assert_eq!(sanitize_inline_text("  Mesa \t de\n roble "), "Mesa de roble");
        assert_eq!(sanitize_inline_text("   "), "");
    }

    #[test]
    fn sanitize_multiline_text_keeps_single_blank_lines() {
        assert_eq!(
            sanitize_multiline_text("\n  Primera  \n\n\n Segunda \n\n"),
            "Primera\n\nSegunda"
        );
        assert_eq!(sanitize_multiline_text(" \n \n"), "");
    }

    #[test]
    fn form_errors_collect_validator_messages() {
        let sample = Sample {
            nombre: "abcd".to_string(),
        };
        let errors = FormErrors::from(sample.validate().expect_err("expected failure"));

        assert_eq!(errors.messages("nombre"), ["too long".to_string()]);
        assert!(errors.messages("precio").is_empty());
    }

    #[test]
    fn form_errors_into_result() {
        assert_eq!(FormErrors::new().into_result(5), Ok(5));

        let mut errors = FormErrors::new();
        errors.add("nombre", REQUIRED_MESSAGE);
        errors.add("nombre", "otro");
        let err = errors.into_result(5).expect_err("expected errors");

        assert!(err.has("nombre"));
        assert_eq!(err.to_string(), format!("nombre: {REQUIRED_MESSAGE}; nombre: otro"));
    }
}
