use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::tag::{NewTag, Tag, UpdateTag};
use crate::forms::{FormErrors, FormResult, REQUIRED_MESSAGE, sanitize_inline_text};

/// Maximum allowed length for a tag name.
const NAME_MAX_LEN: usize = 50;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Form payload shared by the "Create tag" and "Edit tag" screens.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct TagForm {
    #[validate(length(
        max = NAME_MAX_LEN_VALIDATOR,
        message = "Asegúrese de que este valor tenga como máximo 50 caracteres."
    ))]
    #[serde(default)]
    pub nombre: String,
}

impl TagForm {
    pub fn from_tag(tag: &Tag) -> Self {
        Self {
            nombre: tag.name.clone(),
        }
    }

    /// Validates and sanitizes the payload into a domain `NewTag`.
    pub fn to_new_tag(&self) -> FormResult<NewTag> {
        self.clean_name().map(NewTag::new)
    }

    /// Validates and sanitizes the payload into a domain `UpdateTag`.
    pub fn to_update_tag(&self) -> FormResult<UpdateTag> {
        self.clean_name().map(UpdateTag::new)
    }

    fn clean_name(&self) -> FormResult<String> {
        let sanitized = Self {
            nombre: sanitize_inline_text(&self.nombre),
        };

        let mut errors = match sanitized.validate() {
            Ok(()) => FormErrors::new(),
            Err(err) => FormErrors::from(err),
        };

        if sanitized.nombre.is_empty() {
            errors.add("nombre", REQUIRED_MESSAGE);
        }

        errors.into_result(sanitized.nombre)
    }
}
