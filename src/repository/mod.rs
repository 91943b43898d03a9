use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory, UpdateCategory};
use crate::domain::product::{NewProduct, Product, ProductListQuery, UpdateProduct};
use crate::domain::product_detail::{ProductDetail, ProductDetailFields};
use crate::domain::tag::{NewTag, Tag, UpdateTag};

pub mod category;
pub mod errors;
pub mod product;
pub mod product_detail;
pub mod tag;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over category records.
pub trait CategoryReader {
    /// All categories ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, category_id: i32) -> RepositoryResult<Option<Category>>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    /// Deletes the category together with every product that references it.
    fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over tag records.
pub trait TagReader {
    /// All tags ordered by name.
    fn list_tags(&self) -> RepositoryResult<Vec<Tag>>;
    fn get_tag_by_id(&self, tag_id: i32) -> RepositoryResult<Option<Tag>>;
}

/// Write operations over tag records.
pub trait TagWriter {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag>;
    /// Deletes the tag and detaches it from every product.
    fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over products. Products come back with tags and detail loaded.
pub trait ProductReader {
    fn get_product_by_id(&self, product_id: i32) -> RepositoryResult<Option<Product>>;
    /// Products matching `query`, newest first.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over products, their tag links and their detail row.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(&self, product_id: i32, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over product detail records.
pub trait ProductDetailReader {
    fn list_product_details(&self) -> RepositoryResult<Vec<ProductDetail>>;
    fn get_product_detail(&self, product_id: i32) -> RepositoryResult<Option<ProductDetail>>;
}

/// Write operations over product detail records, keyed by the owning product.
pub trait ProductDetailWriter {
    fn create_product_detail(
        &self,
        product_id: i32,
        fields: &ProductDetailFields,
    ) -> RepositoryResult<ProductDetail>;
    /// Returns the product's detail row, inserting an empty one first when absent.
    fn get_or_create_product_detail(&self, product_id: i32) -> RepositoryResult<ProductDetail>;
    fn update_product_detail(
        &self,
        product_id: i32,
        fields: &ProductDetailFields,
    ) -> RepositoryResult<ProductDetail>;
    fn delete_product_detail(&self, product_id: i32) -> RepositoryResult<()>;
}
