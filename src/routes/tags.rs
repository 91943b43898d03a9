use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::tags::TagForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_found, redirect, render_template};
use crate::services::ServiceError;
use crate::services::tags::{
    TagFormPage, create_tag, load_edit_tag_form, load_tag, load_tags, modify_tag, new_tag_form,
    remove_tag,
};

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    page: &TagFormPage,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "etiquetas");
    context.insert("form", &page.form);
    context.insert("errors", &page.errors);
    context.insert("tag", &page.tag);
    context.insert(
        "accion",
        if page.tag.is_some() { "Editar" } else { "Crear" },
    );
    render_template(tera, "etiquetas/formulario.html", &context)
}

#[get("/etiquetas")]
pub async fn show_tags(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_tags(repo.get_ref()) {
        Ok(tags) => {
            let mut context = base_context(&flash_messages, "etiquetas");
            context.insert("tags", &tags);
            render_template(&tera, "etiquetas/lista.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list tags: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/etiquetas/crear")]
pub async fn new_tag(flash_messages: IncomingFlashMessages, tera: web::Data<Tera>) -> impl Responder {
    render_form(&tera, &flash_messages, &new_tag_form())
}

#[post("/etiquetas/crear")]
pub async fn add_tag(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    match create_tag(repo.get_ref(), &form) {
        Ok(tag) => {
            FlashMessage::success(format!("Etiqueta «{}» creada.", tag.name)).send();
            redirect("/etiquetas")
        }
        Err(ServiceError::Form(errors)) => render_form(
            &tera,
            &flash_messages,
            &TagFormPage::rejected(form, errors, None),
        ),
        Err(err) => {
            log::error!("Failed to create tag: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/etiquetas/{tag_id:\\d+}/editar")]
pub async fn edit_tag_form(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tag_id = path.into_inner();

    match load_edit_tag_form(repo.get_ref(), tag_id) {
        Ok(page) => render_form(&tera, &flash_messages, &page),
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load tag {tag_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/etiquetas/{tag_id:\\d+}/editar")]
pub async fn edit_tag(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    let tag_id = path.into_inner();

    match modify_tag(repo.get_ref(), tag_id, &form) {
        Ok(tag) => {
            FlashMessage::success(format!("Etiqueta «{}» actualizada.", tag.name)).send();
            redirect("/etiquetas")
        }
        Err(ServiceError::Form(errors)) => match load_tag(repo.get_ref(), tag_id) {
            Ok(tag) => render_form(
                &tera,
                &flash_messages,
                &TagFormPage::rejected(form, errors, Some(tag)),
            ),
            Err(ServiceError::NotFound) => not_found(&tera),
            Err(err) => {
                log::error!("Failed to reload tag {tag_id}: {err}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to modify tag {tag_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/etiquetas/{tag_id:\\d+}/eliminar")]
pub async fn delete_tag_confirmation(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tag_id = path.into_inner();

    match load_tag(repo.get_ref(), tag_id) {
        Ok(tag) => {
            let mut context = base_context(&flash_messages, "etiquetas");
            context.insert("tag", &tag);
            render_template(&tera, "etiquetas/eliminar.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load tag {tag_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/etiquetas/{tag_id:\\d+}/eliminar")]
pub async fn delete_tag(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tag_id = path.into_inner();

    match remove_tag(repo.get_ref(), tag_id) {
        Ok(()) => {
            FlashMessage::success("Etiqueta eliminada.").send();
            redirect("/etiquetas")
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to delete tag {tag_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
