pub mod cast_member;
pub mod category;
pub mod files;
pub mod genre;
pub mod video;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;

use crate::error::AppError;
use crate::models::shared::{ListQuery, Pagination};

/// Narrow `select` to rows whose `column` contains the search term.
fn search<E: EntityTrait>(select: Select<E>, column: E::Column, query: &ListQuery) -> Select<E> {
    match query.search_pattern() {
        Some(pattern) => select.filter(
            Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\')),
        ),
        None => select,
    }
}

/// Resolve `sort_by` against the sortable columns; defaults to `created_at`.
fn sort_column<C: Copy>(query: &ListQuery, allowed: &[(&str, C)]) -> Result<C, AppError> {
    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    allowed
        .iter()
        .find(|(name, _)| *name == sort_by)
        .map(|(_, column)| *column)
        .ok_or_else(|| AppError::field("sort_by", "The selected sort_by is invalid."))
}

/// Count and fetch one page of `select`.
async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    query: &ListQuery,
    sort: E::Column,
) -> Result<(Vec<E::Model>, Pagination), AppError>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let (page, per_page) = query.page_and_size();
    let total = select.clone().paginate(db, per_page).num_items().await?;
    let order = if query.ascending() { Order::Asc } else { Order::Desc };

    let items = select
        .order_by(sort, order)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(db)
        .await?;

    Ok((items, Pagination::new(page, per_page, total)))
}
