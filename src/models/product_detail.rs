use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_detail::{
    ProductDetail as DomainProductDetail, ProductDetailFields as DomainProductDetailFields,
};

#[derive(Debug, Clone, Identifiable, Queryable, Associations, Selectable)]
#[diesel(
    table_name = crate::schema::product_details,
    belongs_to(super::product::Product, foreign_key = product_id)
)]
pub struct ProductDetail {
    pub id: i32,
    pub product_id: i32,
    pub dimensions: Option<String>,
    pub weight: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_details)]
pub struct NewProductDetail<'a> {
    pub product_id: i32,
    pub dimensions: Option<&'a str>,
    pub weight: Option<f64>,
}

impl<'a> NewProductDetail<'a> {
    pub fn new(product_id: i32, fields: &'a DomainProductDetailFields) -> Self {
        Self {
            product_id,
            dimensions: fields.dimensions.as_deref(),
            weight: fields.weight,
        }
    }
}

/// Overwrites both detail columns; `None` clears a column.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_details)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProductDetail<'a> {
    pub dimensions: Option<&'a str>,
    pub weight: Option<f64>,
    pub updated_at: NaiveDateTime,
}

impl<'a> UpdateProductDetail<'a> {
    pub fn new(fields: &'a DomainProductDetailFields, updated_at: NaiveDateTime) -> Self {
        Self {
            dimensions: fields.dimensions.as_deref(),
            weight: fields.weight,
            updated_at,
        }
    }
}

impl From<ProductDetail> for DomainProductDetail {
    fn from(value: ProductDetail) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            dimensions: value.dimensions,
            weight: value.weight,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
