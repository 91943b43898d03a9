use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::{
    db::fold_case,
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
        UpdateProduct as DomainUpdateProduct,
    },
    domain::product_detail::ProductDetail as DomainProductDetail,
    domain::tag::Tag as DomainTag,
    models::product::{
        NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
    },
    models::product_detail::{NewProductDetail, ProductDetail as DbProductDetail},
    models::product_tag::NewProductTag,
    models::tag::Tag as DbTag,
    repository::product_detail::{get_or_create_detail, overwrite_detail},
    repository::{DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult},
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, product_id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::id.eq(product_id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match product {
            Some(db_product) => Ok(Some(load_product(&mut conn, db_product)?)),
            None => Ok(None),
        }
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(term) = query.name.as_ref() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            items = items.filter(fold_case(products::name).like(pattern).escape('\\'));
        }

        if let Some(category_id) = query.category_id {
            items = items.filter(products::category_id.eq(category_id));
        }

        items = items.order(products::id.desc());

        let db_products = items.load::<DbProduct>(&mut conn)?;

        load_products(&mut conn, db_products)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_details, products};

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(products::table)
                .values(&DbNewProduct::from(new_product))
                .get_result::<DbProduct>(conn)?;

            replace_product_tags(conn, created.id, &new_product.tag_ids)?;

            if let Some(detail) = new_product.detail.as_ref() {
                diesel::insert_into(product_details::table)
                    .values(&NewProductDetail::new(created.id, detail))
                    .execute(conn)?;
            }

            load_product(conn, created)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(&DbUpdateProduct::from(updates))
                .get_result::<DbProduct>(conn)?;

            replace_product_tags(conn, product_id, &updates.tag_ids)?;

            let detail = get_or_create_detail(conn, product_id)?;
            overwrite_detail(conn, detail.id, &updates.detail, updates.updated_at)?;

            load_product(conn, updated)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            delete_product_children(conn, &[product_id])?;

            let deleted = diesel::delete(products::table.filter(products::id.eq(product_id)))
                .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

/// Removes tag links and detail rows owned by the given products.
pub(crate) fn delete_product_children(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<()> {
    use crate::schema::{product_details, product_tags};

    diesel::delete(product_tags::table.filter(product_tags::product_id.eq_any(product_ids)))
        .execute(conn)?;
    diesel::delete(product_details::table.filter(product_details::product_id.eq_any(product_ids)))
        .execute(conn)?;

    Ok(())
}

fn replace_product_tags(
    conn: &mut SqliteConnection,
    product_id: i32,
    tag_ids: &[i32],
) -> RepositoryResult<()> {
    use crate::schema::product_tags;

    diesel::delete(product_tags::table.filter(product_tags::product_id.eq(product_id)))
        .execute(conn)?;

    let mut rows: Vec<NewProductTag> = Vec::with_capacity(tag_ids.len());
    for tag_id in tag_ids {
        if rows.iter().all(|row| row.tag_id != *tag_id) {
            rows.push(NewProductTag::new(product_id, *tag_id));
        }
    }

    if !rows.is_empty() {
        diesel::insert_into(product_tags::table)
            .values(&rows)
            .execute(conn)?;
    }

    Ok(())
}

fn load_product(
    conn: &mut SqliteConnection,
    db_product: DbProduct,
) -> RepositoryResult<DomainProduct> {
    load_products(conn, vec![db_product])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

fn load_products(
    conn: &mut SqliteConnection,
    db_products: Vec<DbProduct>,
) -> RepositoryResult<Vec<DomainProduct>> {
    if db_products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
    let mut tag_map = load_tags_for_products(conn, &product_ids)?;
    let mut detail_map = load_details_for_products(conn, &product_ids)?;

    let mut domain_products = Vec::with_capacity(db_products.len());
    for db_product in db_products {
        let mut domain: DomainProduct = db_product.into();
        domain.tags = tag_map.remove(&domain.id).unwrap_or_default();
        domain.detail = detail_map.remove(&domain.id);
        domain_products.push(domain);
    }

    Ok(domain_products)
}

fn load_tags_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainTag>>> {
    use crate::schema::{product_tags, tags};

    let rows = product_tags::table
        .inner_join(tags::table)
        .filter(product_tags::product_id.eq_any(product_ids))
        .order((tags::name.asc(), tags::id.asc()))
        .select((product_tags::product_id, DbTag::as_select()))
        .load::<(i32, DbTag)>(conn)?;

    let mut map: HashMap<i32, Vec<DomainTag>> = HashMap::new();
    for (product_id, tag) in rows {
        map.entry(product_id).or_default().push(tag.into());
    }

    Ok(map)
}

fn load_details_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, DomainProductDetail>> {
    use crate::schema::product_details;

    let rows = product_details::table
        .filter(product_details::product_id.eq_any(product_ids))
        .load::<DbProductDetail>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.product_id, DomainProductDetail::from(row)))
        .collect())
}

/// Escapes `LIKE` wildcards so the term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
