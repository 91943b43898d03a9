use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    category::Category,
    product::{Product, ProductListQuery},
    tag::Tag,
};
use crate::forms::FormErrors;
use crate::forms::products::{ProductDetailForm, ProductForm};
use crate::repository::{CategoryReader, ProductReader, ProductWriter, TagReader};
use crate::services::{ServiceError, ServiceResult};

const DISPLAY_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Query parameters accepted by the products index page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Substring searched in product names.
    pub nombre: Option<String>,
    /// Identifier of the category to restrict the list to.
    pub categoria: Option<String>,
}

/// Data required to render the products index template.
pub struct ProductsPageData {
    pub products: Vec<ProductView>,
    /// Every category, used by the filter drop-down.
    pub categories: Vec<Category>,
    /// Search query echoed back to the view when present.
    pub search: Option<String>,
    /// Category filter echoed back to the view when it was a valid id.
    pub selected_category: Option<i32>,
}

/// Loads the products overview page.
///
/// A `categoria` value that is not an integer matches no product.
pub fn load_products_page<R>(repo: &R, query: ProductsQuery) -> ServiceResult<ProductsPageData>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    let ProductsQuery { nombre, categoria } = query;

    // The search term is used as typed; only an empty one is ignored.
    let search = nombre.filter(|term| !term.is_empty());
    let category_filter = categoria
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let categories = repo.list_categories().map_err(ServiceError::from)?;

    let mut list_query = ProductListQuery::new();
    if let Some(term) = search.as_ref() {
        list_query = list_query.name(term);
    }

    let mut selected_category = None;
    let products = match category_filter.map(|value| value.parse::<i32>()) {
        Some(Err(_)) => Vec::new(),
        Some(Ok(category_id)) => {
            selected_category = Some(category_id);
            repo.list_products(list_query.category(category_id))
                .map_err(ServiceError::from)?
        }
        None => repo.list_products(list_query).map_err(ServiceError::from)?,
    };

    let lookup: HashMap<i32, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let products = products
        .into_iter()
        .map(|product| ProductView::from_product(product, &lookup))
        .collect();

    Ok(ProductsPageData {
        products,
        categories,
        search,
        selected_category,
    })
}

/// Fetches a product or fails with [`ServiceError::NotFound`].
pub fn load_product<R>(repo: &R, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Loads a product with its category name resolved for the detail page.
pub fn load_product_view<R>(repo: &R, product_id: i32) -> ServiceResult<ProductView>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    let product = load_product(repo, product_id)?;
    let category = repo
        .get_category_by_id(product.category_id)
        .map_err(ServiceError::from)?;

    let lookup: HashMap<i32, &Category> = category
        .iter()
        .map(|category| (category.id, category))
        .collect();

    Ok(ProductView::from_product(product, &lookup))
}

/// Data required to render the product create/edit template.
#[derive(Debug)]
pub struct ProductFormPage {
    pub form: ProductForm,
    pub detail: ProductDetailForm,
    pub errors: FormErrors,
    /// Tag ids rendered as checked.
    pub selected_tags: Vec<i32>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    /// Product being edited; `None` on the create screen.
    pub product: Option<Product>,
}

fn build_form_page<R>(
    repo: &R,
    form: ProductForm,
    detail: ProductDetailForm,
    errors: FormErrors,
    product: Option<Product>,
) -> ServiceResult<ProductFormPage>
where
    R: CategoryReader + TagReader + ?Sized,
{
    let categories = repo.list_categories().map_err(ServiceError::from)?;
    let tags = repo.list_tags().map_err(ServiceError::from)?;
    let selected_tags = form.selected_tag_ids();

    Ok(ProductFormPage {
        form,
        detail,
        errors,
        selected_tags,
        categories,
        tags,
        product,
    })
}

/// Blank form for the create screen.
pub fn load_new_product_form<R>(repo: &R) -> ServiceResult<ProductFormPage>
where
    R: CategoryReader + TagReader + ?Sized,
{
    build_form_page(
        repo,
        ProductForm::default(),
        ProductDetailForm::default(),
        FormErrors::new(),
        None,
    )
}

/// Form pre-populated with the stored product, its tags and its detail values.
pub fn load_edit_product_form<R>(repo: &R, product_id: i32) -> ServiceResult<ProductFormPage>
where
    R: ProductReader + CategoryReader + TagReader + ?Sized,
{
    let product = load_product(repo, product_id)?;
    let form = ProductForm::from_product(&product);
    let detail = ProductDetailForm::from_detail(product.detail.as_ref());

    build_form_page(repo, form, detail, FormErrors::new(), Some(product))
}

/// Form page echoing a rejected submission together with its errors.
///
/// `product_id` identifies the product being edited, if any.
pub fn rejected_product_form<R>(
    repo: &R,
    product_id: Option<i32>,
    form: ProductForm,
    detail: ProductDetailForm,
    errors: FormErrors,
) -> ServiceResult<ProductFormPage>
where
    R: ProductReader + CategoryReader + TagReader + ?Sized,
{
    let product = match product_id {
        Some(product_id) => Some(load_product(repo, product_id)?),
        None => None,
    };

    build_form_page(repo, form, detail, errors, product)
}

/// Validates both forms and creates the product with its tags.
///
/// A detail row is only inserted when dimensions or weight were supplied.
pub fn create_product<R>(
    repo: &R,
    form: &ProductForm,
    detail: &ProductDetailForm,
) -> ServiceResult<Product>
where
    R: CategoryReader + TagReader + ProductWriter + ?Sized,
{
    let categories = repo.list_categories().map_err(ServiceError::from)?;
    let tags = repo.list_tags().map_err(ServiceError::from)?;

    let mut errors = FormErrors::new();
    let new_product = form
        .to_new_product(&categories, &tags)
        .map_err(|err| errors.merge(err))
        .ok();
    let fields = detail.to_fields().map_err(|err| errors.merge(err)).ok();

    let (Some(mut new_product), Some(fields)) = (new_product, fields) else {
        return Err(ServiceError::Form(errors));
    };

    if !fields.is_blank() {
        new_product = new_product.with_detail(fields);
    }

    repo.create_product(&new_product)
        .map_err(ServiceError::from)
}

/// Validates both forms and overwrites the product, its tags and its detail.
///
/// The detail row is created when missing and both of its fields are
/// replaced, so a blank weight clears the stored one.
pub fn modify_product<R>(
    repo: &R,
    product_id: i32,
    form: &ProductForm,
    detail: &ProductDetailForm,
) -> ServiceResult<Product>
where
    R: ProductReader + CategoryReader + TagReader + ProductWriter + ?Sized,
{
    load_product(repo, product_id)?;

    let categories = repo.list_categories().map_err(ServiceError::from)?;
    let tags = repo.list_tags().map_err(ServiceError::from)?;

    let mut errors = FormErrors::new();
    let update = form
        .to_update_product(&categories, &tags)
        .map_err(|err| errors.merge(err))
        .ok();
    let fields = detail.to_fields().map_err(|err| errors.merge(err)).ok();

    let (Some(update), Some(fields)) = (update, fields) else {
        return Err(ServiceError::Form(errors));
    };

    repo.update_product(product_id, &update.detail(fields))
        .map_err(ServiceError::from)
}

/// Deletes a product together with its tag links and detail row.
pub fn remove_product<R>(repo: &R, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    repo.delete_product(product_id).map_err(ServiceError::from)
}

/// View model exposed to the product list and detail templates.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Price formatted with two decimals.
    pub price: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub tags: Vec<Tag>,
    pub dimensions: Option<String>,
    pub weight: Option<f64>,
    /// Creation time formatted for display.
    pub created_at: String,
    pub updated_at: String,
}

impl ProductView {
    fn from_product(product: Product, lookup: &HashMap<i32, &Category>) -> Self {
        let price = product.price();
        let Product {
            id,
            name,
            description,
            category_id,
            tags,
            detail,
            created_at,
            updated_at,
            ..
        } = product;

        let (dimensions, weight) = match detail {
            Some(detail) => (detail.dimensions, detail.weight),
            None => (None, None),
        };

        Self {
            id,
            name,
            description,
            price,
            category_id,
            category_name: lookup.get(&category_id).map(|category| category.name.clone()),
            tags,
            dimensions,
            weight,
            created_at: created_at.format(DISPLAY_DATETIME_FORMAT).to_string(),
            updated_at: updated_at.format(DISPLAY_DATETIME_FORMAT).to_string(),
        }
    }
}
