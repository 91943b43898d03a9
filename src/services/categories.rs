use crate::domain::category::Category;
use crate::domain::product::ProductListQuery;
use crate::forms::FormErrors;
use crate::forms::categories::CategoryForm;
use crate::repository::{CategoryReader, CategoryWriter, ProductReader};
use crate::services::{ServiceError, ServiceResult};

/// Data required to render the category create/edit template.
pub struct CategoryFormPage {
    /// Values shown in the inputs.
    pub form: CategoryForm,
    /// Field-level errors from a rejected submission.
    pub errors: FormErrors,
    /// Category being edited; `None` on the create screen.
    pub category: Option<Category>,
}

impl CategoryFormPage {
    /// Page for a rejected submission, echoing the submitted values.
    pub fn rejected(form: CategoryForm, errors: FormErrors, category: Option<Category>) -> Self {
        Self {
            form,
            errors,
            category,
        }
    }
}

/// Data required to render the category delete confirmation.
pub struct CategoryDeletePage {
    pub category: Category,
    /// Products removed together with the category.
    pub product_count: usize,
}

/// Lists every category.
pub fn load_categories<R>(repo: &R) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader + ?Sized,
{
    repo.list_categories().map_err(ServiceError::from)
}

/// Fetches a category or fails with [`ServiceError::NotFound`].
pub fn load_category<R>(repo: &R, category_id: i32) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    repo.get_category_by_id(category_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Blank form for the create screen.
pub fn new_category_form() -> CategoryFormPage {
    CategoryFormPage {
        form: CategoryForm::default(),
        errors: FormErrors::new(),
        category: None,
    }
}

/// Form pre-populated with the stored values of a category.
pub fn load_edit_category_form<R>(repo: &R, category_id: i32) -> ServiceResult<CategoryFormPage>
where
    R: CategoryReader + ?Sized,
{
    let category = load_category(repo, category_id)?;

    Ok(CategoryFormPage {
        form: CategoryForm::from_category(&category),
        errors: FormErrors::new(),
        category: Some(category),
    })
}

/// Loads the confirmation data shown before a category is deleted.
pub fn load_category_deletion<R>(repo: &R, category_id: i32) -> ServiceResult<CategoryDeletePage>
where
    R: CategoryReader + ProductReader + ?Sized,
{
    let category = load_category(repo, category_id)?;
    let products = repo
        .list_products(ProductListQuery::new().category(category_id))
        .map_err(ServiceError::from)?;

    Ok(CategoryDeletePage {
        category,
        product_count: products.len(),
    })
}

/// Validates the form and creates a new category.
pub fn create_category<R>(repo: &R, form: &CategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let new_category = form.to_new_category().map_err(ServiceError::Form)?;

    repo.create_category(&new_category)
        .map_err(ServiceError::from)
}

/// Validates the form and overwrites an existing category.
pub fn modify_category<R>(repo: &R, category_id: i32, form: &CategoryForm) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    load_category(repo, category_id)?;

    let update = form.to_update_category().map_err(ServiceError::Form)?;

    repo.update_category(category_id, &update)
        .map_err(ServiceError::from)
}

/// Deletes a category and, with it, every product in that category.
pub fn remove_category<R>(repo: &R, category_id: i32) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    repo.delete_category(category_id)
        .map_err(ServiceError::from)
}
