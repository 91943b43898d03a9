//! HTTP handlers and the helpers they share for rendering and redirects.

use actix_web::http::header;
use actix_web::{HttpResponse, http::StatusCode, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

pub mod categories;
pub mod main;
pub mod products;
pub mod tags;

/// Flash message prepared for the `base.html` alert area.
#[derive(Debug, Serialize)]
struct Alert {
    level: &'static str,
    content: String,
}

fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info => "info",
        Level::Debug => "secondary",
    }
}

/// Context shared by every page: pending flash messages and the active menu entry.
pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts: Vec<Alert> = flash_messages
        .iter()
        .map(|message| Alert {
            level: alert_level_to_str(&message.level()),
            content: message.content().to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

/// Render `template` with status 200.
pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    render_with_status(tera, template, context, StatusCode::OK)
}

fn render_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::warn!("Failed to render template '{template}': {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The "page not found" screen with status 404.
pub fn not_found(tera: &Tera) -> HttpResponse {
    let mut context = Context::new();
    context.insert("alerts", &Vec::<Alert>::new());
    context.insert("current_page", "");
    render_with_status(tera, "not_found.html", &context, StatusCode::NOT_FOUND)
}

/// `303 See Other` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Fallback for unmatched paths.
pub async fn default_not_found(tera: web::Data<Tera>) -> HttpResponse {
    not_found(&tera)
}

/// Register every catalog route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::show_index)
        .service(products::show_products)
        .service(products::new_product)
        .service(products::add_product)
        .service(products::show_product)
        .service(products::edit_product_form)
        .service(products::edit_product)
        .service(products::delete_product_confirmation)
        .service(products::delete_product)
        .service(categories::show_categories)
        .service(categories::new_category)
        .service(categories::add_category)
        .service(categories::edit_category_form)
        .service(categories::edit_category)
        .service(categories::delete_category_confirmation)
        .service(categories::delete_category)
        .service(tags::show_tags)
        .service(tags::new_tag)
        .service(tags::add_tag)
        .service(tags::edit_tag_form)
        .service(tags::edit_tag)
        .service(tags::delete_tag_confirmation)
        .service(tags::delete_tag);
}
