use actix_web::cookie::Key;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use catalogo::domain::product::{NewProduct, ProductListQuery};
use catalogo::domain::product_detail::ProductDetailFields;
use catalogo::forms::REQUIRED_MESSAGE;
use catalogo::repository::{
    CategoryReader, ProductDetailReader, ProductReader, ProductWriter, TagReader,
};
use catalogo::routes::{configure, default_not_found};

mod common;

macro_rules! init_app {
    ($repo:expr) => {{
        let tera = Tera::new("templates/**/*").expect("templates should parse");
        let store = CookieMessageStore::builder(Key::generate()).build();
        let flash = FlashMessagesFramework::builder(store).build();
        test::init_service(
            App::new()
                .wrap(flash)
                .configure(configure)
                .default_service(web::to(default_not_found))
                .app_data(web::Data::new(tera))
                .app_data(web::Data::new($repo)),
        )
        .await
    }};
}

fn form_post(uri: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body.to_string())
}

fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[actix_web::test]
async fn test_index_and_lists_render() {
    let test_db = common::TestDb::new("test_index_and_lists_render.db");
    let app = init_app!(test_db.repo());

    for uri in ["/", "/productos", "/categorias", "/etiquetas", "/productos/crear"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/no-existe").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_category_with_empty_name_rerenders_form() {
    let test_db = common::TestDb::new("test_create_category_empty_name.db");
    let repo = test_db.repo();
    let app = init_app!(test_db.repo());

    let resp = test::call_service(
        &app,
        form_post("/categorias/crear", "nombre=&descripcion=Algo").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(REQUIRED_MESSAGE));
    assert!(body.contains("Algo"));
    assert!(repo.list_categories().unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_and_edit_category_redirect_to_list() {
    let test_db = common::TestDb::new("test_create_edit_category.db");
    let repo = test_db.repo();
    let app = init_app!(test_db.repo());

    let resp = test::call_service(
        &app,
        form_post("/categorias/crear", "nombre=Hogar&descripcion=").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/categorias"));

    let categories = repo.list_categories().unwrap();
    assert_eq!(categories.len(), 1);
    assert!(categories[0].description.is_none());

    let uri = format!("/categorias/{}/editar", categories[0].id);
    let resp = test::call_service(&app, form_post(&uri, "nombre=Casa").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        repo.get_category_by_id(categories[0].id).unwrap().unwrap().name,
        "Casa"
    );
}

#[actix_web::test]
async fn test_missing_product_returns_not_found() {
    let test_db = common::TestDb::new("test_missing_product_404.db");
    let category = common::create_category(&test_db.repo(), "Muebles");
    let app = init_app!(test_db.repo());

    for uri in [
        "/productos/999",
        "/productos/999/editar",
        "/productos/999/eliminar",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }

    let body = format!(
        "nombre=Silla&descripcion=Roble&precio=10&categoria={}",
        category.id
    );
    for uri in ["/productos/999/editar", "/productos/999/eliminar"] {
        let resp = test::call_service(&app, form_post(uri, &body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "POST {uri}");
    }
}

#[actix_web::test]
async fn test_missing_category_and_tag_return_not_found() {
    let test_db = common::TestDb::new("test_missing_category_tag_404.db");
    let app = init_app!(test_db.repo());

    for uri in [
        "/categorias/5/editar",
        "/categorias/5/eliminar",
        "/etiquetas/5/editar",
        "/etiquetas/5/eliminar",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");

        let resp = test::call_service(&app, form_post(uri, "nombre=X").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "POST {uri}");
    }
}

#[actix_web::test]
async fn test_product_delete_confirmation_then_delete() {
    let test_db = common::TestDb::new("test_product_delete_flow.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Cocina");
    let product = repo
        .create_product(&NewProduct::new("Olla", "Acero", 3000, category.id))
        .unwrap();
    let app = init_app!(test_db.repo());

    let uri = format!("/productos/{}/eliminar", product.id);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(repo.get_product_by_id(product.id).unwrap().is_some());

    let resp = test::call_service(&app, form_post(&uri, "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/productos"));

    let detail_uri = format!("/productos/{}", product.id);
    let resp =
        test::call_service(&app, test::TestRequest::get().uri(&detail_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_category_delete_removes_its_products() {
    let test_db = common::TestDb::new("test_category_delete_route.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Temporada");
    for name in ["Gorro", "Bufanda"] {
        repo.create_product(&NewProduct::new(name, "Lana", 1000, category.id))
            .unwrap();
    }
    let app = init_app!(test_db.repo());

    let uri = format!("/categorias/{}/eliminar", category.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("2 productos"));
    assert_eq!(repo.list_products(ProductListQuery::new()).unwrap().len(), 2);

    let resp = test::call_service(&app, form_post(&uri, "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(repo.list_products(ProductListQuery::new()).unwrap().is_empty());

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_tag_delete_keeps_products() {
    let test_db = common::TestDb::new("test_tag_delete_route.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Libros");
    let tag = common::create_tag(&repo, "Oferta");
    let product = repo
        .create_product(
            &NewProduct::new("Quijote", "Novela", 2000, category.id).with_tags(vec![tag.id]),
        )
        .unwrap();
    let app = init_app!(test_db.repo());

    let uri = format!("/etiquetas/{}/eliminar", tag.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(repo.get_tag_by_id(tag.id).unwrap().is_some());
    let untouched = repo.get_product_by_id(product.id).unwrap().unwrap();
    assert_eq!(untouched.tag_ids(), vec![tag.id]);

    let resp = test::call_service(&app, form_post(&uri, "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert!(repo.list_tags().unwrap().is_empty());
    let fetched = repo.get_product_by_id(product.id).unwrap().unwrap();
    assert!(fetched.tags.is_empty());
}

#[actix_web::test]
async fn test_create_product_with_both_detail_spellings() {
    let test_db = common::TestDb::new("test_create_product_both_spellings.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Jardín");
    let app = init_app!(test_db.repo());

    let body = format!(
        "nombre=Maceta&descripcion=Barro&precio=5&categoria={}&dimensiones=20x20&dimensions=10x10&peso=&weight=1.5",
        category.id
    );
    let resp = test::call_service(&app, form_post("/productos/crear", &body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let products = repo.list_products(ProductListQuery::new()).unwrap();
    assert_eq!(products.len(), 1);
    let detail = products[0].detail.as_ref().expect("detail row expected");
    assert_eq!(detail.dimensions.as_deref(), Some("20x20"));
    assert_eq!(detail.weight, Some(1.5));
}

#[actix_web::test]
async fn test_create_product_with_tags_and_detail() {
    let test_db = common::TestDb::new("test_create_product_route.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Muebles");
    let nuevo = common::create_tag(&repo, "Nuevo");
    let oferta = common::create_tag(&repo, "Oferta");
    let app = init_app!(test_db.repo());

    let body = format!(
        "nombre=Silla&descripcion=Roble&precio=49.90&categoria={}&etiquetas={}&etiquetas={}&dimensiones=&peso=5",
        category.id, nuevo.id, oferta.id
    );
    let resp = test::call_service(&app, form_post("/productos/crear", &body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/productos"));

    let products = repo.list_products(ProductListQuery::new()).unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.price_cents, 4990);
    assert_eq!(product.tag_ids(), vec![nuevo.id, oferta.id]);
    let detail = product.detail.as_ref().expect("detail row expected");
    assert!(detail.dimensions.is_none());
    assert_eq!(detail.weight, Some(5.0));
}

#[actix_web::test]
async fn test_create_product_without_detail_values() {
    let test_db = common::TestDb::new("test_create_product_no_detail.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Cocina");
    let app = init_app!(test_db.repo());

    let body = format!(
        "nombre=Taza&descripcion=Cer%C3%A1mica&precio=3.5&categoria={}&dimensiones=&peso=",
        category.id
    );
    let resp = test::call_service(&app, form_post("/productos/crear", &body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert!(repo.list_product_details().unwrap().is_empty());
}

#[actix_web::test]
async fn test_rejected_product_form_keeps_selected_tags() {
    let test_db = common::TestDb::new("test_rejected_product_form.db");
    let repo = test_db.repo();
    common::create_category(&repo, "Cocina");
    let tag = common::create_tag(&repo, "Oferta");
    let app = init_app!(test_db.repo());

    let body = format!(
        "nombre=Taza&descripcion=Blanca&precio=3&categoria=&etiquetas={}",
        tag.id
    );
    let resp = test::call_service(&app, form_post("/productos/crear", &body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(REQUIRED_MESSAGE));
    assert!(body.contains("checked"));
    assert!(body.contains("value=\"Taza\""));
    assert!(repo.list_products(ProductListQuery::new()).unwrap().is_empty());
}

#[actix_web::test]
async fn test_edit_product_clears_weight_and_redirects_to_detail() {
    let test_db = common::TestDb::new("test_edit_product_route.db");
    let repo = test_db.repo();
    let category = common::create_category(&repo, "Jardín");
    let product = repo
        .create_product(
            &NewProduct::new("Maceta", "Barro", 1200, category.id)
                .with_detail(ProductDetailFields::new(None, Some(5.0))),
        )
        .unwrap();
    let app = init_app!(test_db.repo());

    let uri = format!("/productos/{}/editar", product.id);
    let body = format!(
        "nombre=Maceta+grande&descripcion=Barro&precio=15&categoria={}",
        category.id
    );
    let resp = test::call_service(&app, form_post(&uri, &body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        Some(format!("/productos/{}", product.id))
    );

    let updated = repo.get_product_by_id(product.id).unwrap().unwrap();
    assert_eq!(updated.name, "Maceta grande");
    assert_eq!(updated.price_cents, 1500);
    let detail = updated.detail.expect("detail row is kept");
    assert!(detail.weight.is_none());
}

#[actix_web::test]
async fn test_product_list_filters() {
    let test_db = common::TestDb::new("test_product_list_filters_route.db");
    let repo = test_db.repo();
    let cocina = common::create_category(&repo, "Cocina");
    let salon = common::create_category(&repo, "Salón");
    repo.create_product(&NewProduct::new("Tabla ABC", "Madera", 100, cocina.id))
        .unwrap();
    repo.create_product(&NewProduct::new("Lámpara abc", "Pie", 100, salon.id))
        .unwrap();
    repo.create_product(&NewProduct::new("Cuchillo", "Acero", 100, cocina.id))
        .unwrap();
    let app = init_app!(test_db.repo());

    let uri = format!("/productos?nombre=abc&categoria={}", cocina.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Tabla ABC"));
    assert!(!body.contains("Lámpara abc"));
    assert!(!body.contains("Cuchillo"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/productos?categoria=cocina")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!body.contains("Tabla ABC"));
}
