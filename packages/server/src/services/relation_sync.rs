use std::collections::{BTreeSet, HashMap};

use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use crate::entity::{category_genre, category_video, genre_video};

/// A pure join table keyed by (owner, related).
pub trait PivotEntity: EntityTrait {
    fn owner_column() -> Self::Column;
    fn related_column() -> Self::Column;
    /// Build the join row linking `owner` to `related`.
    fn link(owner: Uuid, related: Uuid) -> Self::ActiveModel;
}

impl PivotEntity for category_video::Entity {
    fn owner_column() -> Self::Column {
        category_video::Column::VideoId
    }
    fn related_column() -> Self::Column {
        category_video::Column::CategoryId
    }
    fn link(owner: Uuid, related: Uuid) -> Self::ActiveModel {
        category_video::ActiveModel {
            video_id: Set(owner),
            category_id: Set(related),
            ..Default::default()
        }
    }
}

impl PivotEntity for genre_video::Entity {
    fn owner_column() -> Self::Column {
        genre_video::Column::VideoId
    }
    fn related_column() -> Self::Column {
        genre_video::Column::GenreId
    }
    fn link(owner: Uuid, related: Uuid) -> Self::ActiveModel {
        genre_video::ActiveModel {
            video_id: Set(owner),
            genre_id: Set(related),
            ..Default::default()
        }
    }
}

impl PivotEntity for category_genre::Entity {
    fn owner_column() -> Self::Column {
        category_genre::Column::GenreId
    }
    fn related_column() -> Self::Column {
        category_genre::Column::CategoryId
    }
    fn link(owner: Uuid, related: Uuid) -> Self::ActiveModel {
        category_genre::ActiveModel {
            genre_id: Set(owner),
            category_id: Set(related),
            ..Default::default()
        }
    }
}

/// Rows inserted and removed by one [`sync`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncChanges {
    pub attached: Vec<Uuid>,
    pub detached: Vec<Uuid>,
}

impl SyncChanges {
    /// Rows written in either direction.
    pub fn len(&self) -> usize {
        self.attached.len() + self.detached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Related IDs currently linked to `owner`, sorted.
pub async fn related_ids<P, C>(db: &C, owner: Uuid) -> Result<Vec<Uuid>, DbErr>
where
    P: PivotEntity,
    C: ConnectionTrait,
{
    P::find()
        .select_only()
        .column(P::related_column())
        .filter(P::owner_column().eq(owner))
        .order_by_asc(P::related_column())
        .into_tuple::<Uuid>()
        .all(db)
        .await
}

/// `(owner, related)` pairs for every owner in `owners`.
pub async fn links<P, C>(db: &C, owners: &[Uuid]) -> Result<Vec<(Uuid, Uuid)>, DbErr>
where
    P: PivotEntity,
    C: ConnectionTrait,
{
    if owners.is_empty() {
        return Ok(Vec::new());
    }
    let owners: Vec<Uuid> = owners.to_vec();
    P::find()
        .select_only()
        .column(P::owner_column())
        .column(P::related_column())
        .filter(P::owner_column().is_in(owners))
        .into_tuple()
        .all(db)
        .await
}

/// Distinct related IDs found in `links`.
pub fn related_of(links: &[(Uuid, Uuid)]) -> Vec<Uuid> {
    let related: BTreeSet<Uuid> = links.iter().map(|(_, related)| *related).collect();
    related.into_iter().collect()
}

/// Distribute `related` rows to their owners following `links`.
///
/// The order of `related` is kept within each owner.
pub fn group_by_owner<M: Clone>(
    links: &[(Uuid, Uuid)],
    related: Vec<M>,
    id_of: impl Fn(&M) -> Uuid,
) -> HashMap<Uuid, Vec<M>> {
    let mut grouped: HashMap<Uuid, Vec<M>> = HashMap::new();
    for model in &related {
        let id = id_of(model);
        for (owner, _) in links.iter().filter(|(_, r)| *r == id) {
            grouped.entry(*owner).or_default().push(model.clone());
        }
    }
    grouped
}

/// Make the join rows of `owner` equal `desired` exactly.
///
/// Only the difference is written: rows already present are left alone, so
/// repeating a call with the same set touches nothing.
pub async fn sync<P, C>(db: &C, owner: Uuid, desired: &[Uuid]) -> Result<SyncChanges, DbErr>
where
    P: PivotEntity,
    C: ConnectionTrait,
{
    let current: BTreeSet<Uuid> = related_ids::<P, C>(db, owner).await?.into_iter().collect();
    let desired: BTreeSet<Uuid> = desired.iter().copied().collect();

    let detached: Vec<Uuid> = current.difference(&desired).copied().collect();
    let attached: Vec<Uuid> = desired.difference(&current).copied().collect();

    if !detached.is_empty() {
        P::delete_many()
            .filter(P::owner_column().eq(owner))
            .filter(P::related_column().is_in(detached.clone()))
            .exec(db)
            .await?;
    }

    for related in attached.clone() {
        P::insert(P::link(owner, related))
            .exec_without_returning(db)
            .await?;
    }

    debug!(
        table = P::default().table_name(),
        %owner,
        attached = attached.len(),
        detached = detached.len(),
        "Synced relation"
    );

    Ok(SyncChanges { attached, detached })
}
