use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::categories::CategoryForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_found, redirect, render_template};
use crate::services::ServiceError;
use crate::services::categories::{
    CategoryFormPage, create_category, load_categories, load_category, load_category_deletion,
    load_edit_category_form, modify_category, new_category_form, remove_category,
};

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    page: &CategoryFormPage,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "categorias");
    context.insert("form", &page.form);
    context.insert("errors", &page.errors);
    context.insert("category", &page.category);
    context.insert(
        "accion",
        if page.category.is_some() {
            "Editar"
        } else {
            "Crear"
        },
    );
    render_template(tera, "categorias/formulario.html", &context)
}

#[get("/categorias")]
pub async fn show_categories(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_categories(repo.get_ref()) {
        Ok(categories) => {
            let mut context = base_context(&flash_messages, "categorias");
            context.insert("categories", &categories);
            render_template(&tera, "categorias/lista.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list categories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/categorias/crear")]
pub async fn new_category(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_form(&tera, &flash_messages, &new_category_form())
}

#[post("/categorias/crear")]
pub async fn add_category(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    match create_category(repo.get_ref(), &form) {
        Ok(category) => {
            FlashMessage::success(format!("Categoría «{}» creada.", category.name)).send();
            redirect("/categorias")
        }
        Err(ServiceError::Form(errors)) => render_form(
            &tera,
            &flash_messages,
            &CategoryFormPage::rejected(form, errors, None),
        ),
        Err(err) => {
            log::error!("Failed to create category: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/categorias/{category_id:\\d+}/editar")]
pub async fn edit_category_form(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category_id = path.into_inner();

    match load_edit_category_form(repo.get_ref(), category_id) {
        Ok(page) => render_form(&tera, &flash_messages, &page),
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load category {category_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/categorias/{category_id:\\d+}/editar")]
pub async fn edit_category(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    let category_id = path.into_inner();

    match modify_category(repo.get_ref(), category_id, &form) {
        Ok(category) => {
            FlashMessage::success(format!("Categoría «{}» actualizada.", category.name)).send();
            redirect("/categorias")
        }
        Err(ServiceError::Form(errors)) => match load_category(repo.get_ref(), category_id) {
            Ok(category) => render_form(
                &tera,
                &flash_messages,
                &CategoryFormPage::rejected(form, errors, Some(category)),
            ),
            Err(ServiceError::NotFound) => not_found(&tera),
            Err(err) => {
                log::error!("Failed to reload category {category_id}: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to modify category {category_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/categorias/{category_id:\\d+}/eliminar")]
pub async fn delete_category_confirmation(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category_id = path.into_inner();

    match load_category_deletion(repo.get_ref(), category_id) {
        Ok(page) => {
            let mut context = base_context(&flash_messages, "categorias");
            context.insert("category", &page.category);
            context.insert("product_count", &page.product_count);
            render_template(&tera, "categorias/eliminar.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load category {category_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/categorias/{category_id:\\d+}/eliminar")]
pub async fn delete_category(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category_id = path.into_inner();

    match remove_category(repo.get_ref(), category_id) {
        Ok(()) => {
            FlashMessage::success("Categoría eliminada.").send();
            redirect("/categorias")
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to delete category {category_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
