use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Optional physical attributes stored one-to-one with a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    /// Unique identifier of the detail record.
    pub id: i32,
    /// Identifier of the owning product.
    pub product_id: i32,
    /// Free-form dimensions, for example `20x30x5 cm`.
    pub dimensions: Option<String>,
    /// Weight of the product.
    pub weight: Option<f64>,
    /// Timestamp for when the detail record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the detail record.
    pub updated_at: NaiveDateTime,
}

/// Values written onto a detail row, both on insert and on overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDetailFields {
    pub dimensions: Option<String>,
    pub weight: Option<f64>,
}

impl ProductDetailFields {
    pub fn new(dimensions: Option<String>, weight: Option<f64>) -> Self {
        Self { dimensions, weight }
    }

    /// Whether neither dimensions nor weight were supplied.
    pub fn is_blank(&self) -> bool {
        self.dimensions.is_none() && self.weight.is_none()
    }
}
