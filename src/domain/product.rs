use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::product_detail::{ProductDetail, ProductDetailFields};
use crate::domain::tag::Tag;

/// Domain representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Longer description shown to users.
    pub description: String,
    /// Price represented in cents.
    pub price_cents: i64,
    /// Identifier of the category the product belongs to.
    pub category_id: i32,
    /// Tags attached to the product, ordered by name.
    pub tags: Vec<Tag>,
    /// Optional one-to-one detail record.
    pub detail: Option<ProductDetail>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Identifiers of the tags attached to the product.
    pub fn tag_ids(&self) -> Vec<i32> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    /// Price rendered as a decimal string with two fraction digits.
    pub fn price(&self) -> String {
        format_price_cents(self.price_cents)
    }
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: i32,
    /// Tags to link to the product once it is inserted.
    pub tag_ids: Vec<i32>,
    /// Detail row to insert alongside the product. `None` inserts no row.
    pub detail: Option<ProductDetailFields>,
}

impl NewProduct {
    /// Build a new product payload with the required fields.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
        category_id: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price_cents,
            category_id,
            tag_ids: Vec::new(),
            detail: None,
        }
    }

    /// Attach the given tags to the product payload.
    pub fn with_tags(mut self, tag_ids: impl Into<Vec<i32>>) -> Self {
        self.tag_ids = tag_ids.into();
        self
    }

    /// Insert a detail row with the supplied values.
    pub fn with_detail(mut self, detail: ProductDetailFields) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Full replacement data applied when editing a product.
///
/// Every field is overwritten. The tag set is replaced and the detail row is
/// fetched or created, then overwritten with `detail`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: i32,
    pub tag_ids: Vec<i32>,
    pub detail: ProductDetailFields,
    /// Timestamp captured when the update was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
        category_id: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price_cents,
            category_id,
            tag_ids: Vec::new(),
            detail: ProductDetailFields::default(),
            updated_at: Local::now().naive_utc(),
        }
    }

    /// Replace the product's tag set with the given tags.
    pub fn tags(mut self, tag_ids: impl Into<Vec<i32>>) -> Self {
        self.tag_ids = tag_ids.into();
        self
    }

    /// Overwrite the detail row with the supplied values.
    pub fn detail(mut self, detail: ProductDetailFields) -> Self {
        self.detail = detail;
        self
    }
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListQuery {
    /// Optional case-insensitive substring matched against the product name.
    pub name: Option<String>,
    /// Optional exact category filter.
    pub category_id: Option<i32>,
}

impl ProductListQuery {
    /// Construct a query that returns every product.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the results to names containing `term`.
    pub fn name(mut self, term: impl Into<String>) -> Self {
        self.name = Some(term.into());
        self
    }

    /// Filter the results to products of the given category.
    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Format an amount of cents as a decimal string, e.g. `1250` as `12.50`.
pub fn format_price_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
