use std::collections::{BTreeMap, BTreeSet};

use sea_orm::*;
use uuid::Uuid;

use crate::entity::category_genre;

/// Checks that requested genres and categories belong together.
///
/// Every requested genre must be linked to at least one requested category,
/// and every requested category must be linked to at least one requested
/// genre. A genre does not need all of its categories in the request.
#[derive(Debug, Clone)]
pub struct GenresHasCategories {
    categories: BTreeSet<Uuid>,
}

impl GenresHasCategories {
    pub const MESSAGE: &'static str = "A genre ID must be related at least a category ID.";

    pub fn new(categories: &[Uuid]) -> Self {
        Self {
            categories: categories.iter().copied().collect(),
        }
    }

    /// Evaluate the rule for `genres` against the stored genre/category links.
    pub async fn passes<C: ConnectionTrait>(&self, db: &C, genres: &[Uuid]) -> Result<bool, DbErr> {
        let genres: BTreeSet<Uuid> = genres.iter().copied().collect();
        if genres.is_empty() || self.categories.is_empty() {
            return Ok(false);
        }

        let genre_ids: Vec<Uuid> = genres.iter().copied().collect();
        let links: Vec<(Uuid, Uuid)> = category_genre::Entity::find()
            .select_only()
            .column(category_genre::Column::GenreId)
            .column(category_genre::Column::CategoryId)
            .filter(category_genre::Column::GenreId.is_in(genre_ids))
            .into_tuple()
            .all(db)
            .await?;

        Ok(self.check(&genres, &links))
    }

    /// Pure evaluation over already-fetched `(genre_id, category_id)` links.
    pub fn check(&self, genres: &BTreeSet<Uuid>, links: &[(Uuid, Uuid)]) -> bool {
        if genres.is_empty() || self.categories.is_empty() {
            return false;
        }

        let mut matched: BTreeMap<Uuid, usize> = BTreeMap::new();
        let mut found = BTreeSet::new();
        for (genre, category) in links {
            if genres.contains(genre) && self.categories.contains(category) {
                *matched.entry(*genre).or_default() += 1;
                found.insert(*category);
            }
        }

        genres.iter().all(|g| matched.contains_key(g)) && found == self.categories
    }
}
