use std::collections::BTreeSet;

use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{cast_member, category, genre, video};
use crate::error::FieldErrors;

/// An entity removed by stamping `deleted_at` rather than deleting the row.
pub trait SoftDelete: EntityTrait {
    fn id_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;

    /// Rows of this entity that have not been soft-deleted.
    fn find_live() -> Select<Self> {
        Self::find().filter(Self::deleted_at_column().is_null())
    }
}

macro_rules! soft_delete {
    ($($module:ident),*) => {
        $(
            impl SoftDelete for $module::Entity {
                fn id_column() -> Self::Column {
                    $module::Column::Id
                }
                fn deleted_at_column() -> Self::Column {
                    $module::Column::DeletedAt
                }
            }
        )*
    };
}

soft_delete!(category, genre, cast_member, video);

/// Stamp `deleted_at` on a live row.
///
/// Returns `false` when no live row has this id.
pub async fn soft_delete<E, C>(db: &C, id: Uuid) -> Result<bool, DbErr>
where
    E: SoftDelete,
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let result = E::update_many()
        .col_expr(E::deleted_at_column(), Expr::value(now))
        .filter(E::id_column().eq(id))
        .filter(E::deleted_at_column().is_null())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Add `The selected {field} is invalid.` unless every id names a live row.
pub async fn check_exists<E, C>(
    db: &C,
    errors: &mut FieldErrors,
    field: &str,
    ids: &[Uuid],
) -> Result<(), DbErr>
where
    E: SoftDelete,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let unique: Vec<Uuid> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if unique.is_empty() {
        return Ok(());
    }
    let expected = unique.len() as u64;
    let found = E::find_live()
        .filter(E::id_column().is_in(unique))
        .count(db)
        .await?;
    if found != expected {
        errors.add(field, format!("The selected {field} is invalid."));
    }
    Ok(())
}
