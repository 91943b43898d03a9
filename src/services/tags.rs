use crate::domain::tag::Tag;
use crate::forms::FormErrors;
use crate::forms::tags::TagForm;
use crate::repository::{TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult};

/// Data required to render the tag create/edit template.
pub struct TagFormPage {
    pub form: TagForm,
    pub errors: FormErrors,
    /// Tag being edited; `None` on the create screen.
    pub tag: Option<Tag>,
}

impl TagFormPage {
    /// Page for a rejected submission, echoing the submitted values.
    pub fn rejected(form: TagForm, errors: FormErrors, tag: Option<Tag>) -> Self {
        Self { form, errors, tag }
    }
}

/// Lists every tag.
pub fn load_tags<R>(repo: &R) -> ServiceResult<Vec<Tag>>
where
    R: TagReader + ?Sized,
{
    repo.list_tags().map_err(ServiceError::from)
}

/// Fetches a tag or fails with [`ServiceError::NotFound`].
pub fn load_tag<R>(repo: &R, tag_id: i32) -> ServiceResult<Tag>
where
    R: TagReader + ?Sized,
{
    repo.get_tag_by_id(tag_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn new_tag_form() -> TagFormPage {
    TagFormPage {
        form: TagForm::default(),
        errors: FormErrors::new(),
        tag: None,
    }
}

/// Form pre-populated with the stored values of a tag.
pub fn load_edit_tag_form<R>(repo: &R, tag_id: i32) -> ServiceResult<TagFormPage>
where
    R: TagReader + ?Sized,
{
    let tag = load_tag(repo, tag_id)?;

    Ok(TagFormPage {
        form: TagForm::from_tag(&tag),
        errors: FormErrors::new(),
        tag: Some(tag),
    })
}

/// Validates the form and creates a new tag.
pub fn create_tag<R>(repo: &R, form: &TagForm) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    let new_tag = form.to_new_tag().map_err(ServiceError::Form)?;

    repo.create_tag(&new_tag).map_err(ServiceError::from)
}

/// Validates the form and overwrites an existing tag.
pub fn modify_tag<R>(repo: &R, tag_id: i32, form: &TagForm) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    load_tag(repo, tag_id)?;

    let update = form.to_update_tag().map_err(ServiceError::Form)?;

    repo.update_tag(tag_id, &update).map_err(ServiceError::from)
}

/// Deletes a tag, detaching it from every product.
pub fn remove_tag<R>(repo: &R, tag_id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    repo.delete_tag(tag_id).map_err(ServiceError::from)
}
