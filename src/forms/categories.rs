use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::category::{Category, NewCategory, UpdateCategory};
use crate::forms::{
    FormErrors, FormResult, REQUIRED_MESSAGE, sanitize_inline_text, sanitize_multiline_text,
};

/// Maximum length allowed for a category name.
const NAME_MAX_LEN: usize = 100;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Form payload shared by the "Create category" and "Edit category" screens.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CategoryForm {
    /// Name entered by the user.
    #[validate(length(
        max = NAME_MAX_LEN_VALIDATOR,
        message = "Asegúrese de que este valor tenga como máximo 100 caracteres."
    ))]
    #[serde(default)]
    pub nombre: String,
    /// Optional free-form description.
    #[serde(default)]
    pub descripcion: Option<String>,
}

impl CategoryForm {
    /// Pre-populate the form with the stored values of `category`.
    pub fn from_category(category: &Category) -> Self {
        Self {
            nombre: category.name.clone(),
            descripcion: category.description.clone(),
        }
    }

    /// Validates and sanitizes the payload into a domain `NewCategory`.
    pub fn to_new_category(&self) -> FormResult<NewCategory> {
        let (name, description) = self.clean()?;

        let mut new_category = NewCategory::new(name);
        if let Some(description) = description {
            new_category = new_category.with_description(description);
        }

        Ok(new_category)
    }

    /// Validates and sanitizes the payload into a domain `UpdateCategory`.
    pub fn to_update_category(&self) -> FormResult<UpdateCategory> {
        let (name, description) = self.clean()?;
        Ok(UpdateCategory::new(name, description))
    }

    /// Sanitizes first so length limits apply to the stored values.
    fn clean(&self) -> FormResult<(String, Option<String>)> {
        let sanitized = Self {
            nombre: sanitize_inline_text(&self.nombre),
            descripcion: self
                .descripcion
                .as_deref()
                .map(sanitize_multiline_text)
                .filter(|value| !value.is_empty()),
        };

        let mut errors = match sanitized.validate() {
            Ok(()) => FormErrors::new(),
            Err(err) => FormErrors::from(err),
        };

        if sanitized.nombre.is_empty() {
            errors.add("nombre", REQUIRED_MESSAGE);
        }

        errors.into_result((sanitized.nombre, sanitized.descripcion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_form_sanitizes_and_converts() {
        let form = CategoryForm {
            nombre: "  Muebles   de jardín ".to_string(),
            descripcion: Some("  Sillas\n\n\n Mesas  ".to_string()),
        };

        let new_category = form.to_new_category().expect("expected conversion to succeed");

        assert_eq!(new_category.name, "Muebles de jardín");
        assert_eq!(new_category.description.as_deref(), Some("Sillas\n\nMesas"));
    }

    #[test]
    fn category_form_rejects_empty_name() {
        let form = CategoryForm {
            nombre: "   ".to_string(),
            descripcion: None,
        };

        let errors = form.to_new_category().expect_err("expected validation failure");

        assert_eq!(errors.messages("nombre"), [REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn category_form_rejects_long_name() {
        let form = CategoryForm {
            nombre: "ñ".repeat(NAME_MAX_LEN + 1),
            descripcion: None,
        };

        let errors = form.to_update_category().expect_err("expected validation failure");

        assert!(errors.has("nombre"));
        assert_eq!(errors.messages("nombre").len(), 1);
    }

    #[test]
    fn category_form_accepts_name_at_limit_in_characters() {
        let form = CategoryForm {
            nombre: "ñ".repeat(NAME_MAX_LEN),
            descripcion: None,
        };

        assert!(form.to_new_category().is_ok());
    }

    #[test]
    fn category_form_limits_sanitized_name_length() {
        let padded = CategoryForm {
            nombre: format!("  {}  ", "a".repeat(NAME_MAX_LEN)),
            descripcion: None,
        };
        let new_category = padded.to_new_category().expect("expected conversion to succeed");
        assert_eq!(new_category.name.chars().count(), NAME_MAX_LEN);

        let too_long = CategoryForm {
            nombre: format!("  {}  ", "a".repeat(NAME_MAX_LEN + 1)),
            descripcion: None,
        };
        let errors = too_long.to_new_category().expect_err("expected validation failure");
        assert!(errors.has("nombre"));
    }

    #[test]
    fn category_form_clears_blank_description_on_update() {
        let form = CategoryForm {
            nombre: "Cocina".to_string(),
            descripcion: Some(" \n ".to_string()),
        };

        let update = form.to_update_category().expect("expected conversion to succeed");

        assert_eq!(update.name, "Cocina");
        assert!(update.description.is_none());
    }
}
