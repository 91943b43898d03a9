use chrono::{Local, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product_detail::{
    ProductDetail as DomainProductDetail, ProductDetailFields as DomainProductDetailFields,
};
use crate::models::product_detail::{
    NewProductDetail, ProductDetail as DbProductDetail, UpdateProductDetail,
};
use crate::repository::{
    DieselRepository, ProductDetailReader, ProductDetailWriter, RepositoryError, RepositoryResult,
};

impl ProductDetailReader for DieselRepository {
    fn list_product_details(&self) -> RepositoryResult<Vec<DomainProductDetail>> {
        use crate::schema::product_details;

        let mut conn = self.conn()?;

        let rows = product_details::table
            .order(product_details::product_id.desc())
            .load::<DbProductDetail>(&mut conn)?;

        Ok(rows.into_iter().map(DomainProductDetail::from).collect())
    }

    fn get_product_detail(&self, product_id: i32) -> RepositoryResult<Option<DomainProductDetail>> {
        let mut conn = self.conn()?;
        let detail = find_detail(&mut conn, product_id)?;
        Ok(detail.map(DomainProductDetail::from))
    }
}

impl ProductDetailWriter for DieselRepository {
    fn create_product_detail(
        &self,
        product_id: i32,
        fields: &DomainProductDetailFields,
    ) -> RepositoryResult<DomainProductDetail> {
        use crate::schema::product_details;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(product_details::table)
            .values(&NewProductDetail::new(product_id, fields))
            .get_result::<DbProductDetail>(&mut conn)?;

        Ok(created.into())
    }

    fn get_or_create_product_detail(
        &self,
        product_id: i32,
    ) -> RepositoryResult<DomainProductDetail> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProductDetail, RepositoryError, _>(|conn| {
            get_or_create_detail(conn, product_id).map(DomainProductDetail::from)
        })
    }

    fn update_product_detail(
        &self,
        product_id: i32,
        fields: &DomainProductDetailFields,
    ) -> RepositoryResult<DomainProductDetail> {
        let mut conn = self.conn()?;

        let detail = find_detail(&mut conn, product_id)?.ok_or(RepositoryError::NotFound)?;
        let updated = overwrite_detail(&mut conn, detail.id, fields, Local::now().naive_utc())?;

        Ok(updated.into())
    }

    fn delete_product_detail(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_details;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            product_details::table.filter(product_details::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn find_detail(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<Option<DbProductDetail>> {
    use crate::schema::product_details;

    Ok(product_details::table
        .filter(product_details::product_id.eq(product_id))
        .first::<DbProductDetail>(conn)
        .optional()?)
}

/// Fetches the product's detail row, inserting an empty one when absent.
///
/// Must run inside a transaction so the lookup and insert are not interleaved.
pub(crate) fn get_or_create_detail(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<DbProductDetail> {
    use crate::schema::product_details;

    if let Some(existing) = find_detail(conn, product_id)? {
        return Ok(existing);
    }

    let empty = DomainProductDetailFields::default();
    let created = diesel::insert_into(product_details::table)
        .values(&NewProductDetail::new(product_id, &empty))
        .get_result::<DbProductDetail>(conn)?;

    Ok(created)
}

/// Writes both detail columns; absent values become NULL.
pub(crate) fn overwrite_detail(
    conn: &mut SqliteConnection,
    detail_id: i32,
    fields: &DomainProductDetailFields,
    updated_at: NaiveDateTime,
) -> RepositoryResult<DbProductDetail> {
    use crate::schema::product_details;

    let updated = diesel::update(product_details::table.filter(product_details::id.eq(detail_id)))
        .set(&UpdateProductDetail::new(fields, updated_at))
        .get_result::<DbProductDetail>(conn)?;

    Ok(updated)
}
