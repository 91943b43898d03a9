use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::products::{ProductDetailForm, ProductForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_found, redirect, render_template};
use crate::services::ServiceError;
use crate::services::products::{
    ProductFormPage, ProductsQuery, create_product, load_edit_product_form,
    load_new_product_form, load_product_view, load_products_page, modify_product,
    rejected_product_form, remove_product,
};

/// Parses the urlencoded body into the product form and, independently, the detail form.
///
/// `etiquetas` repeats once per checked tag, which `web::Form` cannot collect.
fn parse_body(body: &[u8]) -> Result<(ProductForm, ProductDetailForm), HttpResponse> {
    let form = serde_html_form::from_bytes::<ProductForm>(body);
    let detail = serde_html_form::from_bytes::<ProductDetailForm>(body);

    match (form, detail) {
        (Ok(form), Ok(detail)) => Ok((form, detail)),
        (Err(err), _) | (_, Err(err)) => {
            log::warn!("Rejected malformed product form: {err}");
            Err(HttpResponse::BadRequest().finish())
        }
    }
}

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    page: &ProductFormPage,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "productos");
    context.insert("form", &page.form);
    context.insert("detail", &page.detail);
    context.insert("errors", &page.errors);
    context.insert("selected_tags", &page.selected_tags);
    context.insert("categories", &page.categories);
    context.insert("tags", &page.tags);
    context.insert("product", &page.product);
    context.insert(
        "accion",
        if page.product.is_some() {
            "Editar"
        } else {
            "Crear"
        },
    );
    render_template(tera, "productos/formulario.html", &context)
}

fn render_rejected(
    repo: &DieselRepository,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    product_id: Option<i32>,
    submitted: (ProductForm, ProductDetailForm),
    errors: crate::forms::FormErrors,
) -> HttpResponse {
    let (form, detail) = submitted;
    match rejected_product_form(repo, product_id, form, detail, errors) {
        Ok(page) => render_form(tera, flash_messages, &page),
        Err(ServiceError::NotFound) => not_found(tera),
        Err(err) => {
            log::error!("Failed to reload product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/productos")]
pub async fn show_products(
    params: web::Query<ProductsQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_products_page(repo.get_ref(), params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "productos");
            context.insert("products", &data.products);
            context.insert("categories", &data.categories);
            context.insert("search", &data.search);
            context.insert("selected_category", &data.selected_category);
            render_template(&tera, "productos/lista.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/productos/crear")]
pub async fn new_product(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_new_product_form(repo.get_ref()) {
        Ok(page) => render_form(&tera, &flash_messages, &page),
        Err(err) => {
            log::error!("Failed to load product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/productos/crear")]
pub async fn add_product(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let (form, detail) = match parse_body(&body) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match create_product(repo.get_ref(), &form, &detail) {
        Ok(product) => {
            FlashMessage::success(format!("Producto «{}» creado.", product.name)).send();
            redirect("/productos")
        }
        Err(ServiceError::Form(errors)) => render_rejected(
            repo.get_ref(),
            &tera,
            &flash_messages,
            None,
            (form, detail),
            errors,
        ),
        Err(err) => {
            log::error!("Failed to create product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/productos/{product_id:\\d+}")]
pub async fn show_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();

    match load_product_view(repo.get_ref(), product_id) {
        Ok(product) => {
            let mut context = base_context(&flash_messages, "productos");
            context.insert("product", &product);
            render_template(&tera, "productos/detalle.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/productos/{product_id:\\d+}/editar")]
pub async fn edit_product_form(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();

    match load_edit_product_form(repo.get_ref(), product_id) {
        Ok(page) => render_form(&tera, &flash_messages, &page),
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/productos/{product_id:\\d+}/editar")]
pub async fn edit_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let product_id = path.into_inner();
    let (form, detail) = match parse_body(&body) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match modify_product(repo.get_ref(), product_id, &form, &detail) {
        Ok(product) => {
            FlashMessage::success(format!("Producto «{}» actualizado.", product.name)).send();
            redirect(&format!("/productos/{}", product.id))
        }
        Err(ServiceError::Form(errors)) => render_rejected(
            repo.get_ref(),
            &tera,
            &flash_messages,
            Some(product_id),
            (form, detail),
            errors,
        ),
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to modify product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/productos/{product_id:\\d+}/eliminar")]
pub async fn delete_product_confirmation(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();

    match load_product_view(repo.get_ref(), product_id) {
        Ok(product) => {
            let mut context = base_context(&flash_messages, "productos");
            context.insert("product", &product);
            render_template(&tera, "productos/eliminar.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to load product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/productos/{product_id:\\d+}/eliminar")]
pub async fn delete_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();

    match remove_product(repo.get_ref(), product_id) {
        Ok(()) => {
            FlashMessage::success("Producto eliminado.").send();
            redirect("/productos")
        }
        Err(ServiceError::NotFound) => not_found(&tera),
        Err(err) => {
            log::error!("Failed to delete product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
