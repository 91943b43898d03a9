use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::category::Category;
use crate::domain::product::{NewProduct, Product, UpdateProduct};
use crate::domain::product_detail::{ProductDetail, ProductDetailFields};
use crate::domain::tag::Tag;
use crate::forms::{
    FormErrors, FormResult, INVALID_CHOICE_MESSAGE, INVALID_NUMBER_MESSAGE, REQUIRED_MESSAGE,
    sanitize_inline_text, sanitize_multiline_text,
};

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Maximum allowed length for the free-form dimensions text.
const DIMENSIONS_MAX_LEN: usize = 100;
const DIMENSIONS_MAX_LEN_VALIDATOR: u64 = DIMENSIONS_MAX_LEN as u64;

/// Prices carry at most ten digits, two of them after the decimal point.
const PRICE_MAX_DIGITS: usize = 10;
const PRICE_DECIMAL_PLACES: usize = 2;

/// Form payload shared by the "Create product" and "Edit product" screens.
///
/// Values are kept as submitted so a rejected form can be rendered back
/// unchanged, including the tag checkboxes.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProductForm {
    #[validate(length(
        max = NAME_MAX_LEN_VALIDATOR,
        message = "Asegúrese de que este valor tenga como máximo 200 caracteres."
    ))]
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    /// Decimal price such as `12.50`.
    #[serde(default)]
    pub precio: String,
    /// Identifier of the selected category.
    #[serde(default)]
    pub categoria: String,
    /// Identifiers of the checked tags; the field repeats once per tag.
    #[serde(default)]
    pub etiquetas: Vec<String>,
}

/// Values shared by product inserts and updates once the form is clean.
struct CleanedProduct {
    name: String,
    description: String,
    price_cents: i64,
    category_id: i32,
    tag_ids: Vec<i32>,
}

impl ProductForm {
    /// Pre-populate the form with the stored values of `product`.
    pub fn from_product(product: &Product) -> Self {
        Self {
            nombre: product.name.clone(),
            descripcion: product.description.clone(),
            precio: product.price(),
            categoria: product.category_id.to_string(),
            etiquetas: product.tags.iter().map(|tag| tag.id.to_string()).collect(),
        }
    }

    /// Tag identifiers currently selected, ignoring values that are not numbers.
    pub fn selected_tag_ids(&self) -> Vec<i32> {
        self.etiquetas
            .iter()
            .filter_map(|value| value.trim().parse::<i32>().ok())
            .collect()
    }

    /// Validates the payload against the available choices into a `NewProduct`.
    pub fn to_new_product(&self, categories: &[Category], tags: &[Tag]) -> FormResult<NewProduct> {
        let cleaned = self.clean(categories, tags)?;

        Ok(NewProduct::new(
            cleaned.name,
            cleaned.description,
            cleaned.price_cents,
            cleaned.category_id,
        )
        .with_tags(cleaned.tag_ids))
    }

    /// Validates the payload against the available choices into an `UpdateProduct`.
    pub fn to_update_product(
        &self,
        categories: &[Category],
        tags: &[Tag],
    ) -> FormResult<UpdateProduct> {
        let cleaned = self.clean(categories, tags)?;

        Ok(UpdateProduct::new(
            cleaned.name,
            cleaned.description,
            cleaned.price_cents,
            cleaned.category_id,
        )
        .tags(cleaned.tag_ids))
    }

    fn clean(&self, categories: &[Category], tags: &[Tag]) -> FormResult<CleanedProduct> {
        let name = sanitize_inline_text(&self.nombre);
        let description = sanitize_multiline_text(&self.descripcion);

        // Length limits apply to the values that get stored.
        let sanitized = ProductForm {
            nombre: name,
            descripcion: description,
            precio: String::new(),
            categoria: String::new(),
            etiquetas: Vec::new(),
        };
        let mut errors = match sanitized.validate() {
            Ok(()) => FormErrors::new(),
            Err(err) => FormErrors::from(err),
        };
        let ProductForm {
            nombre: name,
            descripcion: description,
            ..
        } = sanitized;

        if name.is_empty() {
            errors.add("nombre", REQUIRED_MESSAGE);
        }

        if description.is_empty() {
            errors.add("descripcion", REQUIRED_MESSAGE);
        }

        let price_cents = match parse_price_cents(&self.precio) {
            Ok(cents) => cents,
            Err(message) => {
                errors.add("precio", message);
                0
            }
        };

        let category_id = match clean_category(&self.categoria, categories) {
            Ok(category_id) => category_id,
            Err(message) => {
                errors.add("categoria", message);
                0
            }
        };

        let mut tag_ids = Vec::with_capacity(self.etiquetas.len());
        for value in &self.etiquetas {
            let trimmed = value.trim();
            match trimmed.parse::<i32>() {
                Ok(tag_id) if tags.iter().any(|tag| tag.id == tag_id) => {
                    if !tag_ids.contains(&tag_id) {
                        tag_ids.push(tag_id);
                    }
                }
                _ => errors.add(
                    "etiquetas",
                    format!(
                        "Escoja una opción válida. {trimmed} no es una de las opciones disponibles."
                    ),
                ),
            }
        }

        errors.into_result(CleanedProduct {
            name,
            description,
            price_cents,
            category_id,
            tag_ids,
        })
    }
}

/// Optional detail values submitted alongside the product form.
///
/// Parsed from the same request body but independently of [`ProductForm`].
/// The raw `dimensions`/`weight` keys are read too; when both spellings are
/// sent, the non-blank Spanish one wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProductDetailForm {
    #[validate(length(
        max = DIMENSIONS_MAX_LEN_VALIDATOR,
        message = "Asegúrese de que este valor tenga como máximo 100 caracteres."
    ))]
    #[serde(default)]
    pub dimensiones: String,
    #[serde(default)]
    pub peso: String,
    #[serde(default, skip_serializing)]
    pub dimensions: String,
    #[serde(default, skip_serializing)]
    pub weight: String,
}

impl ProductDetailForm {
    /// Pre-populate the form from an existing detail row, if any.
    pub fn from_detail(detail: Option<&ProductDetail>) -> Self {
        match detail {
            Some(detail) => Self {
                dimensiones: detail.dimensions.clone().unwrap_or_default(),
                peso: detail.weight.map(|weight| weight.to_string()).unwrap_or_default(),
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Validates the payload into detail values; blank inputs become `None`.
    pub fn to_fields(&self) -> FormResult<ProductDetailFields> {
        let sanitized = Self {
            dimensiones: sanitize_inline_text(prefer_non_blank(&self.dimensiones, &self.dimensions)),
            peso: prefer_non_blank(&self.peso, &self.weight).trim().to_string(),
            ..Self::default()
        };

        let mut errors = match sanitized.validate() {
            Ok(()) => FormErrors::new(),
            Err(err) => FormErrors::from(err),
        };

        let Self {
            dimensiones, peso, ..
        } = sanitized;
        let dimensions = Some(dimensiones).filter(|value| !value.is_empty());

        let weight_raw = peso.as_str();
        let weight = if weight_raw.is_empty() {
            None
        } else {
            match weight_raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    errors.add("peso", INVALID_NUMBER_MESSAGE);
                    None
                }
            }
        };

        errors.into_result(ProductDetailFields::new(dimensions, weight))
    }
}

fn prefer_non_blank<'a>(primary: &'a str, fallback: &'a str) -> &'a str {
    if primary.trim().is_empty() {
        fallback
    } else {
        primary
    }
}

fn clean_category(raw: &str, categories: &[Category]) -> Result<i32, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }

    match trimmed.parse::<i32>() {
        Ok(category_id) if categories.iter().any(|category| category.id == category_id) => {
            Ok(category_id)
        }
        _ => Err(INVALID_CHOICE_MESSAGE),
    }
}

/// Parse a decimal price into cents.
///
/// Accepts an optional sign, at most eight integer digits (leading zeros
/// excluded), and at most two fraction digits.
pub fn parse_price_cents(input: &str) -> Result<i64, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(INVALID_NUMBER_MESSAGE);
    }

    if fraction.len() > PRICE_DECIMAL_PLACES {
        return Err("Asegúrese de que no haya más de 2 decimales.");
    }

    let whole_digits = whole.trim_start_matches('0');
    if whole_digits.len() > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err("Asegúrese de que no haya más de 8 dígitos antes del punto decimal.");
    }

    let whole_value = if whole_digits.is_empty() {
        0
    } else {
        whole_digits
            .parse::<i64>()
            .map_err(|_| INVALID_NUMBER_MESSAGE)?
    };

    let fraction_value = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| INVALID_NUMBER_MESSAGE)? * 10,
        _ => fraction.parse::<i64>().map_err(|_| INVALID_NUMBER_MESSAGE)?,
    };

    let cents = whole_value * 100 + fraction_value;
    Ok(if negative { -cents } else { cents })
}
